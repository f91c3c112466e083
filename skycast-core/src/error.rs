use thiserror::Error;

use crate::model::{ErrorInfo, ErrorKind};

/// Failure of a single provider request, classified by cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Provider answered 404 for the requested city.
    #[error("no weather data found for '{city}'")]
    NotFound { city: String },

    /// Provider answered 401; the API key is missing or invalid.
    #[error("provider rejected the API key")]
    Auth,

    /// Any other non-success status.
    #[error("provider returned status {status}")]
    Provider { status: u16 },

    /// The request went out but no response came back.
    #[error("network failure: {0}")]
    Network(String),

    /// The request could not be built or sent at all.
    #[error("request setup failed: {0}")]
    RequestSetup(String),

    /// Success status, but the body did not have the expected shape.
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::NotFound { .. } => ErrorKind::NotFound,
            FetchError::Auth => ErrorKind::Auth,
            FetchError::Provider { .. } => ErrorKind::Provider,
            FetchError::Network(_) => ErrorKind::Network,
            FetchError::RequestSetup(_) => ErrorKind::RequestSetup,
            FetchError::Malformed(_) => ErrorKind::Malformed,
        }
    }

    /// Message and suggestion shown to the user. `requested` is the city as
    /// the user typed it, which may differ from the one the provider echoes.
    pub fn to_error_info(&self, requested: &str) -> ErrorInfo {
        let (message, suggestion) = match self {
            FetchError::NotFound { .. } => (
                format!("We couldn't find weather data for \"{requested}\""),
                "Please check the spelling or try another city.",
            ),
            FetchError::Auth => (
                "API key error".to_string(),
                "There's an issue with the weather API authentication.",
            ),
            FetchError::Provider { .. } => (
                "Weather data unavailable".to_string(),
                "We're having trouble getting weather information right now.",
            ),
            FetchError::Network(_) => (
                "Network connection issue".to_string(),
                "Please check your internet connection and try again.",
            ),
            FetchError::RequestSetup(_) => (
                "Something went wrong".to_string(),
                "We couldn't process your request. Please try again.",
            ),
            FetchError::Malformed(_) => (
                "Unexpected error".to_string(),
                "Something went wrong. Please try again later.",
            ),
        };

        ErrorInfo {
            kind: self.kind(),
            message,
            suggestion: Some(suggestion.to_string()),
        }
    }
}
