//! TOML configuration.
//!
//! Every field has a default, so an empty file is a valid configuration.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{EngineError, Result};
use crate::scene::{BLUE_BLOCK, Palette, Rgba, Scene};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub view: ViewConfig,
    pub movement: MovementConfig,
    pub window: WindowConfig,
    pub minimap: MinimapConfig,
    pub player: PlayerConfig,
    pub scene: SceneConfig,
}

/// Projection parameters for the first-person view.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Horizontal field of view in degrees (default: 90)
    pub fov_deg: f64,
    /// Distance to the projection plane in cells (default: 1)
    pub near_clipping_plane: f64,
    /// Distance at which walls fade to black (default: 8)
    pub far_clipping_plane: f64,
    /// Number of rays cast per frame (default: 300)
    pub columns: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            fov_deg: 90.0,
            near_clipping_plane: 1.0,
            far_clipping_plane: 8.0,
            columns: 300,
        }
    }
}

impl ViewConfig {
    #[inline]
    pub fn fov(&self) -> f64 {
        self.fov_deg.to_radians()
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Distance moved per key press in cells (default: 0.15)
    pub step_len: f64,
    /// Rotation per key press in degrees (default: 18)
    pub turn_step_deg: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            step_len: 0.15,
            turn_step_deg: 18.0,
        }
    }
}

impl MovementConfig {
    #[inline]
    pub fn turn_step(&self) -> f64 {
        self.turn_step_deg.to_radians()
    }
}

/// Window and internal frame buffer size.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Grid Raycaster".to_string(),
            width: 1200,
            height: 675,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MinimapConfig {
    /// Offset from the top-left corner as a fraction of the canvas size
    pub margin: f64,
    /// Minimap width as a fraction of the canvas width
    pub width_fraction: f64,
}

impl Default for MinimapConfig {
    fn default() -> Self {
        Self {
            margin: 0.05,
            width_fraction: 0.21,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Spawn position as a fraction of the scene size
    pub start_fraction: f64,
    /// Initial heading in degrees
    pub start_dir_deg: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            start_fraction: 0.73,
            start_dir_deg: 225.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Text map to load; the built-in level is used when absent
    pub path: Option<PathBuf>,
    pub palette: HashMap<String, Rgba>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            path: None,
            palette: HashMap::from([("#".to_string(), BLUE_BLOCK)]),
        }
    }
}

impl SceneConfig {
    /// Palette keyed by glyph. Keys must be a single character.
    pub fn palette(&self) -> Result<Palette> {
        self.palette
            .iter()
            .map(|(key, color)| {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(glyph), None) if glyph != '.' && glyph != ' ' => Ok((glyph, *color)),
                    _ => Err(EngineError::Config(format!(
                        "palette key {key:?} must be a single non-empty glyph"
                    ))),
                }
            })
            .collect()
    }

    /// Loads the configured map, or the built-in level.
    pub fn load(&self) -> Result<Scene> {
        match &self.path {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                let scene = Scene::parse(&text, &self.palette()?)?;
                log::info!(
                    "Loaded scene {} ({}x{})",
                    path.display(),
                    scene.width(),
                    scene.height()
                );
                Ok(scene)
            }
            None => {
                log::info!("Using built-in scene");
                Ok(Scene::builtin())
            }
        }
    }
}

impl FromStr for Config {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

impl Config {
    /// Reads a config file. A relative `scene.path` is taken relative to the
    /// directory holding the file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut config: Config = text.parse()?;
        if let (Some(scene_path), Some(dir)) = (&config.scene.path, path.parent())
            && scene_path.is_relative()
        {
            config.scene.path = Some(dir.join(scene_path));
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let view = &self.view;
        for (name, value) in [
            ("view.fov_deg", view.fov_deg),
            ("view.near_clipping_plane", view.near_clipping_plane),
            ("view.far_clipping_plane", view.far_clipping_plane),
            ("movement.step_len", self.movement.step_len),
            ("movement.turn_step_deg", self.movement.turn_step_deg),
            ("minimap.margin", self.minimap.margin),
            ("minimap.width_fraction", self.minimap.width_fraction),
            ("player.start_fraction", self.player.start_fraction),
            ("player.start_dir_deg", self.player.start_dir_deg),
        ] {
            if !value.is_finite() {
                return Err(EngineError::Config(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        if view.columns == 0 {
            return Err(EngineError::Config("view.columns must be > 0".into()));
        }
        if !(view.fov_deg > 0.0 && view.fov_deg < 180.0) {
            return Err(EngineError::Config(format!(
                "view.fov_deg must be in (0, 180), got {}",
                view.fov_deg
            )));
        }
        if view.near_clipping_plane <= 0.0 || view.far_clipping_plane <= 0.0 {
            return Err(EngineError::Config(
                "view clipping planes must be positive".into(),
            ));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(EngineError::Config("window size must be non-zero".into()));
        }
        Ok(())
    }
}
