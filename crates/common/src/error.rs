//! Error types shared across quadcam crates.

use std::path::PathBuf;

/// Top-level error type for quadcam operations.
#[derive(Debug, thiserror::Error)]
pub enum QuadcamError {
    /// Input rejected before any state changed.
    #[error("Validation error{}: {message}", field_suffix(.field))]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Project not found: {id}")]
    NotFound { id: i64 },

    #[error("Telemetry extraction error: {message}")]
    Extraction { message: String },

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Playback error: {message}")]
    Playback { message: String },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn field_suffix(field: &Option<String>) -> String {
    field.as_ref().map(|f| format!(" ({f})")).unwrap_or_default()
}

/// Result type alias using QuadcamError.
pub type QuadcamResult<T> = Result<T, QuadcamError>;

impl QuadcamError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    pub fn validation_field(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    pub fn not_found(id: i64) -> Self {
        Self::NotFound { id }
    }

    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction {
            message: msg.into(),
        }
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
        }
    }

    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback {
            message: msg.into(),
        }
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this is a "no such record" rejection.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this is a structured input rejection.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
