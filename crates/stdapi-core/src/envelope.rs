//! Wire shapes of the standard JSON bodies
//!
//! Success bodies look like `{"status": 200, "data": ...}` and error bodies
//! like `{"status": 404, "error": "Not Found", "message": "..."}`. Optional
//! members are left out entirely rather than written as `null`.

use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body written for a successful request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessBody {
    /// HTTP status code, repeated from the response line
    pub status: u16,

    /// Payload, absent when the handler had nothing to return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl SuccessBody {
    /// Build a body, dropping a `null` payload
    pub fn new(status: u16, data: Option<Value>) -> Self {
        Self {
            status,
            data: data.filter(|value| !value.is_null()),
        }
    }
}

/// Body written for a failed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// HTTP status code, repeated from the response line
    pub status: u16,

    /// Short error label
    pub error: String,

    /// Longer human readable explanation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Build a body, dropping an empty message
    pub fn new(status: u16, error: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status,
            error: error.into(),
            message: (!message.is_empty()).then_some(message),
        }
    }
}

/// Either standard body, as read back by a client
///
/// The presence of an `error` member is what tells the two shapes apart.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Envelope {
    /// `{status, error, message?}`
    Error(ErrorBody),
    /// `{status, data?}`
    Success(SuccessBody),
}

impl Envelope {
    /// Parse a response body
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Status code carried in the body
    pub fn status(&self) -> u16 {
        match self {
            Envelope::Error(body) => body.status,
            Envelope::Success(body) => body.status,
        }
    }

    /// Whether this is an error body
    pub fn is_error(&self) -> bool {
        matches!(self, Envelope::Error(_))
    }
}
