//! Error types for loading and running the raycaster.
//!
//! The ray-marching core is infallible; these errors only come from
//! configuration, scene parsing and the window/surface layer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("unknown scene glyph {glyph:?} at line {line}, column {column}")]
    UnknownGlyph {
        glyph: char,
        line: usize,
        column: usize,
    },

    #[error("scene has no rows")]
    EmptyScene,

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("surface error: {0}")]
    Surface(#[from] softbuffer::SoftBufferError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
