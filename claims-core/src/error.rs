use serde::Serialize;
use thiserror::Error;

/// Errors produced while loading, presenting or submitting claims
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ClaimsError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Server responded with {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Claim {0} is already being processed")]
    SubmissionInFlight(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ClaimsError {
    /// The validation raised when processing is requested without a selection
    pub fn no_claim_selected() -> Self {
        ClaimsError::Validation("no claim selected".to_string())
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for ClaimsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClaimsError::Decode(err.to_string())
        } else {
            ClaimsError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClaimsError {
    fn from(err: serde_json::Error) -> Self {
        ClaimsError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClaimsError>;
