use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MotionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("snapshot read failed: {path}")]
    SnapshotRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("notification failed: {0}")]
    Notify(String),
}

pub type Result<T> = std::result::Result<T, MotionError>;
