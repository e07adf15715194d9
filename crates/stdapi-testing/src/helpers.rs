//! Inspecting handler results without a server
//!
//! Each accessor writes its argument into a fresh [`Context`](stdapi_core::Context)
//! with the default [`DispatchConfig`](stdapi_core::DispatchConfig) and reads
//! one part of what came out. Calling two accessors on the same value writes
//! it twice.

use crate::recorder::{Recorded, Recorder};
use http::{HeaderMap, StatusCode};
use serde_json::Value;
use stdapi_core::{Envelope, Failure, Fault, Res, Success};

/// Everything a success value writes
pub fn record_success(success: &dyn Success) -> Recorded {
    Recorder::default().success(success)
}

/// Everything a failure value writes
pub fn record_failure(failure: &dyn Failure) -> Recorded {
    Recorder::default().failure(failure)
}

/// Everything a [`Res`] writes
pub fn record_res(res: &Res) -> Recorded {
    Recorder::default().res(res)
}

/// Everything a [`Fault`] writes
pub fn record_fault(fault: &Fault) -> Recorded {
    Recorder::default().fault(fault)
}

/// Status written by `res`
pub fn res_status(res: &Res) -> StatusCode {
    record_res(res).status
}

/// Headers written by `res`
pub fn res_headers(res: &Res) -> HeaderMap {
    record_res(res).headers
}

/// Body written by `res`, as text
pub fn res_body(res: &Res) -> String {
    record_res(res).text()
}

/// The `data` member of the success envelope written by `res`
///
/// `None` when the body is not a success envelope or carries no data.
pub fn res_data(res: &Res) -> Option<Value> {
    match record_res(res).envelope() {
        Ok(Envelope::Success(body)) => body.data,
        _ => None,
    }
}

/// Status written by `fault`
pub fn err_status(fault: &Fault) -> StatusCode {
    record_fault(fault).status
}

/// Headers written by `fault`
pub fn err_headers(fault: &Fault) -> HeaderMap {
    record_fault(fault).headers
}

/// Body written by `fault`, as text
pub fn err_body(fault: &Fault) -> String {
    record_fault(fault).text()
}
