use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Shown when the backend fails without saying why.
pub const GENERIC_FAILURE: &str = "Failed to search";

pub const EMPTY_QUERY: &str = "Please enter a search query";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    Request { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response from server: {0}")]
    Decode(#[from] SerdeJsonError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Unsupported file type: {0} (expected a JPEG or PNG image)")]
    UnsupportedFile(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl AppError {
    /// Builds a request error from a non-success response body.
    pub fn from_failure_body(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<crate::models::ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());
        AppError::Request { status, message }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}
