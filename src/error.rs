//! Error types for calltree export

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a profile or exporting it
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unsupported measurement mode: {0}")]
    UnsupportedMeasureMode(String),

    #[error("Failed to query host {quantity}: {reason}")]
    HostQuery {
        quantity: &'static str,
        reason: String,
    },

    #[error("Cannot resolve source path {} for {method}: {source}", path.display())]
    PathResolution {
        method: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid printer options: {0}")]
    InvalidOptions(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid profile JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid printer configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ExportError {
    /// Whether the error only affects a single block and export may continue
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ExportError::PathResolution { .. })
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
