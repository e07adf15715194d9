//! Handler results
//!
//! A handler finishes with a [`Res`] (success), a [`Fault`] (failure), or
//! neither. Both wrap an open capability trait, [`Success`] or [`Failure`],
//! so applications can add their own response shapes next to the built-in
//! envelopes in [`variants`].

pub mod variants;

use crate::Context;
use serde::Serialize;
use std::fmt;

pub use variants::{
    DataResponse, ErrorResponse, RawErrorStatus, RawStatus, RedirectResponse, TextResponse,
};

use http::StatusCode;

/// Something that knows how to write a successful response
pub trait Success: Send + Sync + fmt::Debug {
    /// Write status, headers and body into `ctx`
    ///
    /// Must not keep state between calls: writing the same value into two
    /// fresh contexts produces the same bytes.
    fn write_response(&self, ctx: &Context);
}

/// Something that knows how to write an error response
pub trait Failure: Send + Sync + fmt::Debug {
    /// Write status, headers and body into `ctx`
    fn write_error(&self, ctx: &Context);
}

/// A successful handler result
pub struct Res(ResKind);

enum ResKind {
    Write(Box<dyn Success>),
    AlreadyHandled,
}

impl Res {
    /// Marker telling the dispatcher the handler already wrote its response
    /// through the [`Context`] and nothing more should be written.
    ///
    /// No value built with [`Res::new`] ever compares as this marker.
    pub const ALREADY_HANDLED: Res = Res(ResKind::AlreadyHandled);

    /// Wrap a success value
    pub fn new<S: Success + 'static>(success: S) -> Self {
        Res(ResKind::Write(Box::new(success)))
    }

    /// Whether this is [`Res::ALREADY_HANDLED`]
    pub fn is_already_handled(&self) -> bool {
        matches!(self.0, ResKind::AlreadyHandled)
    }

    /// The wrapped value; `None` for the already-handled marker
    pub fn as_success(&self) -> Option<&dyn Success> {
        match &self.0 {
            ResKind::Write(success) => Some(success.as_ref()),
            ResKind::AlreadyHandled => None,
        }
    }
}

impl fmt::Debug for Res {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            ResKind::Write(success) => f.debug_tuple("Res").field(success).finish(),
            ResKind::AlreadyHandled => f.write_str("Res::ALREADY_HANDLED"),
        }
    }
}

impl<S: Success + 'static> From<S> for Res {
    fn from(success: S) -> Self {
        Res::new(success)
    }
}

/// A failed handler result
#[derive(Debug)]
pub struct Fault(Box<dyn Failure>);

impl Fault {
    /// Wrap a failure value
    pub fn new<F: Failure + 'static>(failure: F) -> Self {
        Fault(Box::new(failure))
    }

    /// The wrapped value
    pub fn as_failure(&self) -> &dyn Failure {
        self.0.as_ref()
    }
}

impl<F: Failure + 'static> From<F> for Fault {
    fn from(failure: F) -> Self {
        Fault::new(failure)
    }
}

impl From<crate::Error> for Fault {
    fn from(err: crate::Error) -> Self {
        let status = err.status_code();
        tracing::warn!(error = %err, status = status.as_u16(), "handler failed");
        error_status(status)
    }
}

/// What a handler hands back to the dispatcher: an optional success and an
/// optional failure
///
/// When both are present the failure is written and the success is dropped.
#[derive(Debug, Default)]
pub struct Outcome {
    res: Option<Res>,
    fault: Option<Fault>,
}

impl Outcome {
    /// Build from both halves
    pub fn new(res: Option<Res>, fault: Option<Fault>) -> Self {
        Self { res, fault }
    }

    /// Successful outcome
    pub fn success(res: impl Into<Res>) -> Self {
        Self::new(Some(res.into()), None)
    }

    /// Failed outcome
    pub fn failure(fault: impl Into<Fault>) -> Self {
        Self::new(None, Some(fault.into()))
    }

    /// The handler wrote the response itself
    pub fn already_handled() -> Self {
        Self::new(Some(Res::ALREADY_HANDLED), None)
    }

    /// Split into `(res, fault)`
    pub fn into_parts(self) -> (Option<Res>, Option<Fault>) {
        (self.res, self.fault)
    }
}

impl From<Res> for Outcome {
    fn from(res: Res) -> Self {
        Self::new(Some(res), None)
    }
}

impl From<Fault> for Outcome {
    fn from(fault: Fault) -> Self {
        Self::new(None, Some(fault))
    }
}

impl From<Result<Res, Fault>> for Outcome {
    fn from(result: Result<Res, Fault>) -> Self {
        match result {
            Ok(res) => res.into(),
            Err(fault) => fault.into(),
        }
    }
}

impl From<(Option<Res>, Option<Fault>)> for Outcome {
    fn from((res, fault): (Option<Res>, Option<Fault>)) -> Self {
        Self::new(res, fault)
    }
}

impl From<()> for Outcome {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

// ============================================================================
// Constructors
// ============================================================================

/// Standard reason phrase for `status`, or an empty string when there is none
pub fn reason_phrase(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("")
}

/// The already-handled marker, see [`Res::ALREADY_HANDLED`]
pub fn already_handled() -> Res {
    Res::ALREADY_HANDLED
}

/// Status with an empty body
pub fn raw_status(status: StatusCode) -> Res {
    Res::new(RawStatus(status))
}

/// Status with the standard body and no payload
///
/// ```text
/// 200 OK
///
/// {"status": 200}
/// ```
pub fn status(status: StatusCode) -> Res {
    Res::new(DataResponse::<serde_json::Value>::new(status, None))
}

/// Status with the standard body carrying `data`
///
/// ```text
/// 200 OK
///
/// {"status": 200, "data": {"hello": "world"}}
/// ```
pub fn data<T>(status: StatusCode, data: T) -> Res
where
    T: Serialize + Send + Sync + fmt::Debug + 'static,
{
    Res::new(DataResponse::new(status, Some(data)))
}

/// Status with a plain text body
pub fn string(status: StatusCode, text: impl Into<String>) -> Res {
    Res::new(TextResponse::new(status, text))
}

/// Status with a `Location` header
pub fn redirect(status: StatusCode, location: impl Into<String>) -> Res {
    Res::new(RedirectResponse::new(status, location))
}

/// Error status with an empty body
pub fn raw_error_status(status: StatusCode) -> Fault {
    Fault::new(RawErrorStatus(status))
}

/// Error status with the standard body, labelled with the reason phrase
///
/// ```text
/// 400 Bad Request
///
/// {"status": 400, "error": "Bad Request"}
/// ```
pub fn error_status(status: StatusCode) -> Fault {
    error(status, reason_phrase(status))
}

/// Error status with the standard body and a custom label
///
/// ```text
/// 403 Forbidden
///
/// {"status": 403, "error": "Sorry, you can't do that"}
/// ```
pub fn error(status: StatusCode, error: impl Into<String>) -> Fault {
    error_message(status, error, "")
}

/// Error status with the standard body, a label and a longer message
///
/// ```text
/// 404 Not Found
///
/// {
///   "status": 404,
///   "error": "User Not Found",
///   "message": "The user you requested does not exist or is permanently banned."
/// }
/// ```
pub fn error_message(
    status: StatusCode,
    error: impl Into<String>,
    message: impl Into<String>,
) -> Fault {
    Fault::new(ErrorResponse::new(status, error, message))
}

/// Error status with a plain text body
pub fn string_error(status: StatusCode, text: impl Into<String>) -> Fault {
    Fault::new(TextResponse::new(status, text))
}
