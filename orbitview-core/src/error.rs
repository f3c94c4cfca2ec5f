//! Error types for orbitview

use thiserror::Error;

/// Main error type for orbitview operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid option `{name}`: {reason}")]
    InvalidOption { name: String, reason: String },

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Visualization error: {0}")]
    Visualization(String),
}

/// Result type alias for orbitview operations
pub type Result<T> = std::result::Result<T, Error>;
