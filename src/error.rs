use std::path::PathBuf;

use thiserror::Error;

/// A folder that could not contribute to a scan. The scan itself keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("Folder not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Error reading '{name}': {message}")]
    Unreadable { name: String, message: String },
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to develop RAW file {}: {message}", .path.display())]
    Raw { path: PathBuf, message: String },
}

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("Output directory not set or does not exist.")]
    MissingOutputDir,

    #[error("{} has no file name", .0.display())]
    NoFileName(PathBuf),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

/// A `window_geometry` string that is not `WxH+X+Y`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid window geometry {0:?}")]
pub struct ParseGeometryError(pub String);
