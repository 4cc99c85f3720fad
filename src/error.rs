use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong outside the per-pixel hot path.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("could not open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse model {}: {source}", path.display())]
    Obj {
        path: PathBuf,
        #[source]
        source: obj::ObjError,
    },

    #[error("could not load texture {}: {source}", path.display())]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("model {} is malformed: {reason}", path.display())]
    InvalidMesh { path: PathBuf, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("display error: {0}")]
    Window(String),

    #[error("tile grid is {grid_width}x{grid_height} but the frame is {frame_width}x{frame_height}")]
    GridMismatch { grid_width: u32, grid_height: u32, frame_width: u32, frame_height: u32 },

    #[error("{0} render worker(s) panicked")]
    WorkerPanic(usize),
}
