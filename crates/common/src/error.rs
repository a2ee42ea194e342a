//! Error types shared across Ollim crates.

use std::path::PathBuf;

/// Top-level error type for Ollim operations.
#[derive(Debug, thiserror::Error)]
pub enum OllimError {
    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("An export is already in progress")]
    ExportInProgress,

    #[error("Clipboard error: {message}")]
    Clipboard { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias using OllimError.
pub type OllimResult<T> = Result<T, OllimError>;

impl OllimError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
        }
    }

    pub fn clipboard(msg: impl Into<String>) -> Self {
        Self::Clipboard {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Whether the session can simply try the same operation again.
    ///
    /// Configuration and unsupported-operation errors need the caller to
    /// change something first; everything else is transient.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Config { .. } | Self::Unsupported { .. })
    }
}
