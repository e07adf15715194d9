//! # stdapi core
//!
//! Standard JSON responses for axum handlers.
//!
//! Handlers return a success ([`Res`]) or a failure ([`Fault`]) instead of
//! building responses by hand, and a single dispatch adapter ([`handle`])
//! writes the result exactly once:
//! - `{"status": 200, "data": ...}` for successes
//! - `{"status": 404, "error": "Not Found", "message": ...}` for failures
//! - bodyless statuses, redirects and plain text where needed
//!
//! [`Success`] and [`Failure`] are open traits, so applications can add their
//! own response shapes.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod config;
pub mod context;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod response;
pub mod shorthand;

pub use config::{ConfigFormat, DispatchConfig};
pub use context::Context;
pub use dispatch::{handle, handle_with_inspection, Disposition, Dispatcher, Handler, Inspection};
pub use envelope::{Envelope, ErrorBody, SuccessBody};
pub use error::{Error, Result};
pub use response::{
    already_handled, data, error, error_message, error_status, raw_error_status, raw_status,
    reason_phrase, redirect, status, string, string_error, Failure, Fault, Outcome, Res, Success,
};
pub use shorthand::*;

// Re-export commonly used HTTP types
pub use http::{HeaderMap, Method, StatusCode};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::context::Context;
    pub use crate::dispatch::{handle, handle_with_inspection, Dispatcher, Inspection};
    pub use crate::response::*;
    pub use crate::shorthand::*;
    pub use http::StatusCode;
}
