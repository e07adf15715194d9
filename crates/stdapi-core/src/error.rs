//! Error types for stdapi

use http::StatusCode;

/// Result type alias using [`Error`]
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Main error type for stdapi
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// JSON serialization or deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A header name or value could not be represented
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The request body could not be read or parsed
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// The request body exceeded the configured limit
    #[error("Request body exceeds {0} bytes")]
    BodyTooLarge(usize),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status a client should see when a handler bails out with this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Error::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Serialization(_) | Error::InvalidHeader(_) | Error::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub(crate) fn invalid_header(err: impl std::fmt::Display) -> Self {
        Error::InvalidHeader(err.to_string())
    }
}
