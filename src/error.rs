// src/error.rs
//! Error types for the GNSS sky viewer

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SkyviewError>;

/// Notice shown when the positioning source refuses access
pub const PERMISSION_NOTICE: &str = "No permission to access the positioning system";

#[derive(Debug, Error)]
pub enum SkyviewError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serial error: {0}")]
    Serial(#[from] tokio_serial::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("No permission to access the positioning system: {0}")]
    PermissionDenied(String),
    #[cfg(feature = "gui")]
    #[error("GUI error: {0}")]
    Gui(#[from] eframe::Error),
    #[error("Error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for SkyviewError {
    fn from(error: anyhow::Error) -> Self {
        SkyviewError::Other(error.to_string())
    }
}
