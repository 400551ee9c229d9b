use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid row count '{0}' - expected a positive integer or '/'")]
    InvalidRowCount(String),

    #[error("slot {0} is out of range (plan has {1} slots)")]
    SlotOutOfRange(u32, u32),

    #[error("meal record '{0}' not found")]
    RecordNotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported clipboard image data: {0}")]
    ClipboardImage(#[from] image::ImageError),

    #[error("catalog serialization error: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Attaches the offending path to an io error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
