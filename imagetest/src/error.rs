use std::any::TypeId;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Image backend '{0}' is not registered")]
    BackendNotFound(String),

    #[error("Image file '{}' does not exist", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read '{}': {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("Failed to decode '{}': {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("Unsupported image format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Unsupported color type: {0}")]
    UnsupportedColorType(String),

    #[error(
        "Cannot register backend '{name}': backend '{existing}' already handles native type {native_type}"
    )]
    Conflict {
        name: String,
        existing: String,
        native_type: &'static str,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("No registered backend handles images of type {type_id:?}")]
    UnknownBackend { type_id: TypeId },

    #[error("Backend for {expected} cannot export an image of a different type ({actual:?})")]
    TypeMismatch {
        expected: &'static str,
        actual: TypeId,
    },

    #[error("Invalid image shape: {0}")]
    InvalidShape(String),

    #[error("Image shapes differ: {left:?} vs {right:?}")]
    ShapeMismatch {
        left: Vec<usize>,
        right: Vec<usize>,
    },

    #[error(
        "Images are not almost equal: mean absolute difference {mean_abs} exceeds tolerance {tolerance} (max difference {max_abs})"
    )]
    NotAlmostEqual {
        mean_abs: f64,
        tolerance: f64,
        max_abs: f32,
    },

    #[error("Backend '{backend}' is unavailable: feature '{feature}' is not enabled")]
    BackendUnavailable {
        backend: &'static str,
        feature: &'static str,
    },
}

impl Error {
    /// True for an unknown backend name or a missing image file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::BackendNotFound(_) | Error::FileNotFound(_))
    }

    /// True when the underlying decoder could not make sense of the file.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            Error::Decode { .. } | Error::UnsupportedFormat(_) | Error::UnsupportedColorType(_)
        )
    }
}

impl From<ndarray::ShapeError> for Error {
    fn from(e: ndarray::ShapeError) -> Self {
        Error::InvalidShape(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
