//! Introspection accessors over response values

use http::{header, StatusCode};
use serde_json::json;
use stdapi_core::prelude::*;
use stdapi_core::{Fault, Res};
use stdapi_testing::{
    err_body, err_headers, err_status, record_failure, record_success, res_body, res_data,
    res_headers, res_status,
};

#[test]
fn test_get_status() {
    assert_eq!(res_status(&status(StatusCode::OK)), StatusCode::OK);
    assert_eq!(res_status(&raw_status(StatusCode::NO_CONTENT)), StatusCode::NO_CONTENT);
    assert_eq!(
        res_status(&redirect(StatusCode::MOVED_PERMANENTLY, "/new")),
        StatusCode::MOVED_PERMANENTLY
    );
    assert_eq!(err_status(&error_status(StatusCode::GONE)), StatusCode::GONE);
    assert_eq!(
        err_status(&raw_error_status(StatusCode::UNAUTHORIZED)),
        StatusCode::UNAUTHORIZED
    );
}

#[test]
fn test_get_body() {
    assert_eq!(res_body(&status(StatusCode::OK)), r#"{"status":200}"#);
    assert_eq!(res_body(&raw_status(StatusCode::OK)), "");
    assert_eq!(res_body(&redirect(StatusCode::FOUND, "/location")), "");
    assert_eq!(
        err_body(&error_status(StatusCode::BAD_REQUEST)),
        r#"{"status":400,"error":"Bad Request"}"#
    );
    assert_eq!(err_body(&raw_error_status(StatusCode::BAD_REQUEST)), "");
}

#[test]
fn test_get_headers() {
    let headers = res_headers(&redirect(StatusCode::FOUND, "/location"));
    assert_eq!(headers[header::LOCATION], "/location");
    assert!(headers.get(header::CONTENT_TYPE).is_none());

    let headers = res_headers(&raw_status(StatusCode::OK));
    assert_eq!(headers[header::CONTENT_LENGTH], "0");

    let headers = err_headers(&error(StatusCode::FORBIDDEN, "nope"));
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
}

#[test]
fn test_get_data() {
    let res = data(StatusCode::OK, json!({"field1": 123, "field2": true}));
    assert_eq!(res_data(&res), Some(json!({"field1": 123, "field2": true})));

    let res = data(StatusCode::OK, vec!["a", "b"]);
    assert_eq!(res_data(&res), Some(json!(["a", "b"])));

    assert_eq!(res_data(&string(StatusCode::OK, "plain")), None);
}

#[test]
fn test_error_status_matches_labelled_error() {
    for code in [400u16, 401, 403, 404, 409, 422, 500, 503] {
        let status = StatusCode::from_u16(code).unwrap();
        assert_eq!(
            err_body(&error_status(status)),
            err_body(&error(status, reason_phrase(status)))
        );
    }
}

#[test]
fn test_writes_are_idempotent() {
    let res: Res = data(StatusCode::OK, json!({"id": 1}));
    let first = stdapi_testing::record_res(&res);
    let second = stdapi_testing::record_res(&res);
    assert_eq!(first.status, second.status);
    assert_eq!(first.headers, second.headers);
    assert_eq!(first.body, second.body);

    let fault: Fault = error_message(StatusCode::NOT_FOUND, "User Not Found", "gone");
    assert_eq!(err_body(&fault), err_body(&fault));
    assert_eq!(err_headers(&fault), err_headers(&fault));
}

#[test]
fn test_record_trait_objects() {
    let res = string(StatusCode::OK, "hello");
    let recorded = record_success(res.as_success().unwrap());
    assert_eq!(recorded.text(), "hello");

    let fault = not_found();
    let recorded = record_failure(fault.as_failure());
    assert_eq!(recorded.status, StatusCode::NOT_FOUND);
    assert_eq!(
        recorded.json().unwrap(),
        json!({"status": 404, "error": "Not Found"})
    );
}
