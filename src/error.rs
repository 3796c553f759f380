use thiserror::Error;

/// Failures at the edges of the crate. Stepping the simulation never fails.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),

    #[error("metadata serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame data size mismatch: expected {expected} bytes, got {actual}")]
    FrameSize { expected: usize, actual: usize },

    #[error("no frames recorded")]
    NoFrames,
}

pub type Result<T> = std::result::Result<T, Error>;
