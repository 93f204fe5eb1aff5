use otspec::{DeserializationError, SerializationError};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FontSwapError {
    #[error("{msg}")]
    Environment { msg: String },

    #[error("Could not download {url}: {msg}")]
    Download { url: String, msg: String },

    #[error("Error parsing font: {msg}")]
    FontFormat { msg: String },

    #[error("No backup found{}", .id.as_ref().map(|i| format!(" named {}", i)).unwrap_or_default())]
    NoBackup { id: Option<String> },

    #[error("Backup {} is damaged: {msg}", path.display())]
    CorruptBackup { path: PathBuf, msg: String },

    #[error("Could not install {}: {msg}", path.display())]
    InstallPermission { path: PathBuf, msg: String },

    #[error("Invalid argument: {msg}")]
    InvalidArgument { msg: String },

    #[error("IO Error for file {}: '{source}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FontSwapError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> FontSwapError {
        let path = path.into();
        move |source| FontSwapError::Io { path, source }
    }
}

impl From<DeserializationError> for FontSwapError {
    fn from(e: DeserializationError) -> Self {
        FontSwapError::FontFormat { msg: e.0 }
    }
}

impl From<SerializationError> for FontSwapError {
    fn from(e: SerializationError) -> Self {
        FontSwapError::FontFormat { msg: e.0 }
    }
}

pub type Result<T, E = FontSwapError> = std::result::Result<T, E>;
