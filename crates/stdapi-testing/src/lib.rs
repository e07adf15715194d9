//! # stdapi testing
//!
//! Helpers for asserting on what stdapi handler results write.
//!
//! The free accessors ([`res_status`], [`err_body`], ...) write a single value
//! into a throwaway context. [`send`] and [`get`] run whole requests through
//! an axum router in-process.
//!
//! ```
//! use stdapi_core::{error_status, StatusCode};
//! use stdapi_testing::{err_body, err_status};
//!
//! let fault = error_status(StatusCode::BAD_REQUEST);
//! assert_eq!(err_status(&fault), StatusCode::BAD_REQUEST);
//! assert_eq!(err_body(&fault), r#"{"status":400,"error":"Bad Request"}"#);
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod client;
pub mod helpers;
pub mod recorder;

pub use client::{get, send, RequestBuilder};
pub use helpers::{
    err_body, err_headers, err_status, record_failure, record_fault, record_res, record_success,
    res_body, res_data, res_headers, res_status,
};
pub use recorder::{Recorded, Recorder};
