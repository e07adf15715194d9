//! Property-based tests for what response values write
//!
//! Statuses range over every representable code and payloads over arbitrary
//! JSON trees.

use http::header;
use proptest::prelude::*;
use serde_json::Value;
use stdapi_core::prelude::*;
use stdapi_core::{Envelope, ErrorBody};
use stdapi_testing::{err_body, err_headers, err_status, record_fault, record_res, res_data};

fn arb_status() -> impl Strategy<Value = StatusCode> {
    (100u16..=999).prop_map(|code| StatusCode::from_u16(code).expect("code in range"))
}

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        ".*".prop_map(Value::String),
    ];

    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z_]{1,8}", inner, 0..6)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn test_raw_status_is_bodyless(status in arb_status()) {
        let recorded = record_res(&raw_status(status));

        prop_assert_eq!(recorded.status, status);
        prop_assert!(recorded.body.is_empty());
        prop_assert_eq!(recorded.header(header::CONTENT_LENGTH.as_str()), Some("0"));
    }

    #[test]
    fn test_raw_error_status_is_bodyless(status in arb_status()) {
        let fault = raw_error_status(status);

        prop_assert_eq!(err_status(&fault), status);
        prop_assert!(err_body(&fault).is_empty());
        prop_assert_eq!(&err_headers(&fault)[header::CONTENT_LENGTH], "0");
    }

    #[test]
    fn test_status_body_is_exact(status in arb_status()) {
        let recorded = record_res(&stdapi_core::status(status));

        prop_assert_eq!(recorded.status, status);
        prop_assert_eq!(recorded.text(), format!(r#"{{"status":{}}}"#, status.as_u16()));
    }

    #[test]
    fn test_data_matches_direct_serialization(status in arb_status(), payload in arb_json()) {
        let expected = serde_json::to_value(&payload).expect("payload serializes");
        let res = data(status, payload);

        let recorded = record_res(&res);
        prop_assert_eq!(recorded.status, status);
        let body = recorded.json().expect("json body");
        prop_assert_eq!(body["status"].as_u64(), Some(u64::from(status.as_u16())));

        let data = res_data(&res);
        if expected.is_null() {
            prop_assert_eq!(data, None);
        } else {
            prop_assert_eq!(data, Some(expected));
        }
    }

    #[test]
    fn test_error_status_uses_reason_phrase(status in arb_status()) {
        let by_status = record_fault(&error_status(status));
        let by_label = record_fault(&error(status, reason_phrase(status)));

        prop_assert_eq!(by_status.status, by_label.status);
        prop_assert_eq!(by_status.headers, by_label.headers);
        prop_assert_eq!(by_status.body, by_label.body);
    }

    #[test]
    fn test_error_message_reads_back(status in arb_status(), label in ".*", message in ".*") {
        let recorded = record_fault(&error_message(status, label.clone(), message.clone()));

        prop_assert_eq!(
            recorded.envelope().expect("error envelope"),
            Envelope::Error(ErrorBody::new(status.as_u16(), label, message))
        );
    }

    #[test]
    fn test_writes_are_repeatable(status in arb_status(), payload in arb_json(), label in ".*") {
        let res = data(status, payload);
        let first = record_res(&res);
        let second = record_res(&res);
        prop_assert_eq!(first.status, second.status);
        prop_assert_eq!(first.headers, second.headers);
        prop_assert_eq!(first.body, second.body);

        let fault = error(status, label);
        let first = record_fault(&fault);
        let second = record_fault(&fault);
        prop_assert_eq!(first.status, second.status);
        prop_assert_eq!(first.headers, second.headers);
        prop_assert_eq!(first.body, second.body);
    }
}
