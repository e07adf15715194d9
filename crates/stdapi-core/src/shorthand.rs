//! Shorthands for the error responses handlers reach for most

use crate::response::{error_status, Fault};
use http::StatusCode;

/// Shorthand for `error_status(StatusCode::BAD_REQUEST)`
pub fn bad_request() -> Fault {
    error_status(StatusCode::BAD_REQUEST)
}

/// Shorthand for `error_status(StatusCode::UNAUTHORIZED)`
pub fn unauthorized() -> Fault {
    error_status(StatusCode::UNAUTHORIZED)
}

/// Shorthand for `error_status(StatusCode::FORBIDDEN)`
pub fn forbidden() -> Fault {
    error_status(StatusCode::FORBIDDEN)
}

/// Shorthand for `error_status(StatusCode::NOT_FOUND)`
pub fn not_found() -> Fault {
    error_status(StatusCode::NOT_FOUND)
}

/// Shorthand for `error_status(StatusCode::CONFLICT)`
pub fn conflict() -> Fault {
    error_status(StatusCode::CONFLICT)
}

/// Shorthand for `error_status(StatusCode::GONE)`
pub fn gone() -> Fault {
    error_status(StatusCode::GONE)
}

/// Shorthand for `error_status(StatusCode::INTERNAL_SERVER_ERROR)`
pub fn internal_server_error() -> Fault {
    error_status(StatusCode::INTERNAL_SERVER_ERROR)
}
