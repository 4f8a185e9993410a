//! Error types shared across Rigpad crates.

use std::path::PathBuf;

/// Top-level error type for Rigpad operations.
#[derive(Debug, thiserror::Error)]
pub enum RigpadError {
    #[error("Tracker error: {message}")]
    Tracker { message: String },

    #[error("Remote control error: {message}")]
    Remote { message: String },

    #[error("Blend error: {message}")]
    Blend { message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Host error: {message}")]
    Host { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using RigpadError.
pub type RigpadResult<T> = Result<T, RigpadError>;

impl RigpadError {
    pub fn tracker(msg: impl Into<String>) -> Self {
        Self::Tracker {
            message: msg.into(),
        }
    }

    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote {
            message: msg.into(),
        }
    }

    pub fn blend(msg: impl Into<String>) -> Self {
        Self::Blend {
            message: msg.into(),
        }
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    pub fn host(msg: impl Into<String>) -> Self {
        Self::Host {
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
}
