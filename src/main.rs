use std::io::Write;
use std::num::NonZeroU32;
use std::path::Path;
use std::rc::Rc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use grid_raycaster::canvas::FrameBuffer;
use grid_raycaster::renderer;
use grid_raycaster::scaler::Upscaler;
use grid_raycaster::{Command, Config, EngineError, Player, Result, Scene};

const DEFAULT_CONFIG_PATH: &str = "grid-raycaster.toml";

/// Frame-loop state. Owns the scene and player and hands them to the
/// renderer by reference on every redraw.
struct App {
    config: Config,
    scene: Scene,
    player: Player,

    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,

    // Rendered at the configured size, stretched to the window
    frame: FrameBuffer,
    upscaler: Upscaler,
}

impl App {
    fn new(config: Config, scene: Scene) -> Self {
        let player = Player::spawn(
            &scene,
            config.player.start_fraction,
            config.player.start_dir_deg.to_radians(),
        );
        let frame = FrameBuffer::new(config.window.width as usize, config.window.height as usize);
        Self {
            config,
            scene,
            player,
            window: None,
            surface: None,
            frame,
            upscaler: Upscaler::default(),
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width as f64,
                self.config.window.height as f64,
            ));
        let window = Rc::new(event_loop.create_window(attributes)?);
        let context = softbuffer::Context::new(window.clone())?;
        let surface = softbuffer::Surface::new(&context, window.clone())?;

        window.request_redraw();
        self.surface = Some(surface);
        self.window = Some(window);
        Ok(())
    }

    /// Applies the command bound to `code`. Returns true if the player moved.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        let Some(command) = Command::from_key(code) else {
            return false;
        };
        command.apply(&mut self.player, &self.config.movement);
        log::debug!(
            "player at ({:.2}, {:.2}) heading {:.1} deg",
            self.player.pos.x,
            self.player.pos.y,
            self.player.dir.to_degrees()
        );
        true
    }

    fn redraw(&mut self, id: WindowId) -> Result<()> {
        let (window, surface) = match (&self.window, &mut self.surface) {
            (Some(w), Some(s)) if w.id() == id => (w, s),
            _ => return Ok(()),
        };

        let size = window.inner_size();
        let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) else {
            // Minimized
            return Ok(());
        };
        surface.resize(w, h)?;

        let started = Instant::now();
        renderer::render_frame(&mut self.frame, &self.scene, &self.player, &self.config);

        let (dw, dh) = (size.width as usize, size.height as usize);
        if !self.upscaler.matches(dw, dh, &self.frame) {
            log::debug!("rebuilding scale tables for {}x{}", dw, dh);
            self.upscaler = Upscaler::new(dw, dh, self.frame.width, self.frame.height);
        }

        let mut buffer = surface.buffer_mut()?;
        self.upscaler.blit(&mut buffer, &self.frame);
        buffer.present()?;

        log::trace!("frame rendered in {:?}", started.elapsed());
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create_window(event_loop) {
            log::error!("Failed to create window: {}", e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape {
                    event_loop.exit();
                } else if self.handle_key(code) {
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }

            WindowEvent::Resized(size) => {
                log::debug!("window resized to {}x{}", size.width, size.height);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw(id) {
                    log::error!("Redraw failed: {}", e);
                    event_loop.exit();
                }
            }

            _ => (),
        }
    }
}

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Debug, PartialEq)]
struct Args {
    config_path: Option<String>,
}

#[derive(Debug, PartialEq)]
enum Cli {
    Run(Args),
    Help,
}

/// Parses everything after the program name.
fn parse_cli(args: &[String]) -> std::result::Result<Cli, String> {
    let mut result = Args { config_path: None };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => match args.get(i + 1) {
                Some(path) => {
                    result.config_path = Some(path.clone());
                    i += 1;
                }
                None => return Err(format!("Missing value for {}", args[i])),
            },
            "--help" | "-h" => return Ok(Cli::Help),
            other => return Err(format!("Unknown argument: {other}")),
        }
        i += 1;
    }

    Ok(Cli::Run(result))
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match parse_cli(&args) {
        Ok(Cli::Run(args)) => args,
        Ok(Cli::Help) => {
            print_help();
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("{e}");
            print_help();
            std::process::exit(1);
        }
    }
}

fn print_help() {
    println!("grid-raycaster - first-person grid raycaster with an overhead map");
    println!();
    println!("USAGE:");
    println!("    grid-raycaster [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <FILE>     Configuration file (default: {DEFAULT_CONFIG_PATH})");
    println!("    -h, --help              Print help information");
    println!();
    println!("CONTROLS:");
    println!("    W / S       Step forward / backward");
    println!("    A / D       Turn left / right");
    println!("    Esc         Quit");
}

fn load_config(args: &Args) -> Result<Config> {
    match &args.config_path {
        Some(path) => {
            let config = Config::load(path)?;
            log::info!("Loaded config from {}", path);
            Ok(config)
        }
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => match Config::load(DEFAULT_CONFIG_PATH) {
            Ok(config) => {
                log::info!("Loaded config from {}", DEFAULT_CONFIG_PATH);
                Ok(config)
            }
            Err(e) => {
                log::warn!("Failed to load {}: {}; using defaults", DEFAULT_CONFIG_PATH, e);
                Ok(Config::default())
            }
        },
        None => {
            log::info!("No config file, using defaults");
            Ok(Config::default())
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    let scene = config.scene.load()?;

    log::info!("grid-raycaster starting");
    log::info!(
        "  View: {} columns, fov {} deg, far plane {}",
        config.view.columns,
        config.view.fov_deg,
        config.view.far_clipping_plane
    );
    log::info!("  Scene: {}x{}", scene.width(), scene.height());

    let event_loop = EventLoop::new()?;
    // Redraw only in response to input
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config, scene);
    event_loop.run_app(&mut app).map_err(EngineError::from)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    if let Err(e) = run(parse_args()) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
