//! Error types for companion-core

use thiserror::Error;

/// Main error type for the companion-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Blank or otherwise unusable user text
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Network error, non-success status, or a reply sequence that failed mid-stream
    #[error("transport failure: {0}")]
    Transport(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Chat surface name that is not in the catalogue
    #[error("unknown chat surface: {0}")]
    UnknownSurface(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Check if this error should be recovered into a fallback message
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Check if this error rejects the input before any turn starts
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Transport(format!("request timed out: {}", err))
        } else if err.is_connect() {
            Error::Transport(format!("connection failed: {}", err))
        } else {
            Error::Transport(format!("request failed: {}", err))
        }
    }
}

/// Result type alias for companion-core
pub type Result<T> = std::result::Result<T, Error>;
