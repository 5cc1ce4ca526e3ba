use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while setting up or driving the animation
#[derive(Debug, Error)]
pub enum Error {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to load sprite {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("sprite has no pixels ({width}x{height})")]
    EmptySprite { width: u32, height: u32 },
    #[error("sprite buffer holds {actual} bytes, expected {expected}")]
    SpriteBuffer { expected: usize, actual: usize },
    #[error("invalid color {0:?}, expected six hex digits")]
    InvalidColor(String),
    #[error("failed to open {url}: {source}")]
    Launch {
        url: String,
        #[source]
        source: std::io::Error,
    },
}
