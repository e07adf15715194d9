//! Built-in success and failure shapes

use super::{Failure, Success};
use crate::envelope::{ErrorBody, SuccessBody};
use crate::{Context, Error, Result};
use http::{header, HeaderValue, StatusCode};
use serde::Serialize;
use std::fmt;

/// Status line only, zero-length body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawStatus(pub StatusCode);

impl Success for RawStatus {
    fn write_response(&self, ctx: &Context) {
        write_bodyless(ctx, self.0);
    }
}

/// Error status line only, zero-length body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawErrorStatus(pub StatusCode);

impl Failure for RawErrorStatus {
    fn write_error(&self, ctx: &Context) {
        write_bodyless(ctx, self.0);
    }
}

/// `{"status": ..., "data": ...}` envelope
///
/// The payload is serialized when the response is written. A missing payload,
/// or one that serializes to `null`, leaves the `data` member out.
#[derive(Debug, Clone, PartialEq)]
pub struct DataResponse<T = serde_json::Value> {
    status: StatusCode,
    data: Option<T>,
}

impl<T> DataResponse<T> {
    /// Create an envelope
    pub fn new(status: StatusCode, data: Option<T>) -> Self {
        Self { status, data }
    }

    /// Status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Payload, if any
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }
}

impl<T> Success for DataResponse<T>
where
    T: Serialize + Send + Sync + fmt::Debug,
{
    fn write_response(&self, ctx: &Context) {
        let result = self
            .data
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(Error::from)
            .and_then(|data| ctx.json(self.status, &SuccessBody::new(self.status.as_u16(), data)));

        recover(ctx, "data", result);
    }
}

/// `Location` redirect without a body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectResponse {
    status: StatusCode,
    location: String,
}

impl RedirectResponse {
    /// Create a redirect
    pub fn new(status: StatusCode, location: impl Into<String>) -> Self {
        Self {
            status,
            location: location.into(),
        }
    }

    /// Status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Redirect target
    pub fn location(&self) -> &str {
        &self.location
    }
}

impl Success for RedirectResponse {
    fn write_response(&self, ctx: &Context) {
        let result = ctx.redirect(self.status, &self.location);
        recover(ctx, "redirect", result);
    }
}

/// `{"status": ..., "error": ..., "message": ...}` envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    status: StatusCode,
    error: String,
    message: String,
}

impl ErrorResponse {
    /// Create an error envelope; an empty `message` is left out of the body
    pub fn new(status: StatusCode, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            message: message.into(),
        }
    }

    /// Status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Short error label
    pub fn error(&self) -> &str {
        &self.error
    }

    /// Longer explanation, empty when not given
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Failure for ErrorResponse {
    fn write_error(&self, ctx: &Context) {
        let body = ErrorBody::new(self.status.as_u16(), self.error.as_str(), self.message.as_str());
        let result = ctx.json(self.status, &body);
        recover(ctx, "error", result);
    }
}

/// Plain text body, usable on either path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextResponse {
    status: StatusCode,
    text: String,
}

impl TextResponse {
    /// Create a text response
    pub fn new(status: StatusCode, text: impl Into<String>) -> Self {
        Self {
            status,
            text: text.into(),
        }
    }

    /// Status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Body text
    pub fn text(&self) -> &str {
        &self.text
    }

    fn write(&self, ctx: &Context) {
        let result = ctx.string(self.status, &self.text);
        recover(ctx, "text", result);
    }
}

impl Success for TextResponse {
    fn write_response(&self, ctx: &Context) {
        self.write(ctx);
    }
}

impl Failure for TextResponse {
    fn write_error(&self, ctx: &Context) {
        self.write(ctx);
    }
}

fn write_bodyless(ctx: &Context, status: StatusCode) {
    ctx.insert_header(header::CONTENT_LENGTH, HeaderValue::from_static("0"));
    ctx.set_status(status);
}

// A primitive refused the write; the client still gets a well-formed 500.
fn recover(ctx: &Context, kind: &'static str, result: Result<()>) {
    if let Err(err) = result {
        tracing::error!(
            request_id = %ctx.request_id(),
            kind,
            error = %err,
            "failed to write response, falling back to 500"
        );
        write_bodyless(ctx, StatusCode::INTERNAL_SERVER_ERROR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DispatchConfig;
    use axum::response::Response;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn detached() -> Context {
        Context::detached(Arc::new(DispatchConfig::default()))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_raw_status_has_empty_body() {
        let ctx = detached();
        RawStatus(StatusCode::NO_CONTENT).write_response(&ctx);

        let response = ctx.finish();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers().get(header::CONTENT_LENGTH).unwrap(), "0");
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_data_response_with_struct_payload() {
        #[derive(Debug, Serialize)]
        struct User {
            id: u32,
            admin: bool,
        }

        let ctx = detached();
        DataResponse::new(StatusCode::OK, Some(User { id: 1, admin: true })).write_response(&ctx);

        let response = ctx.finish();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"status": 200, "data": {"id": 1, "admin": true}})
        );
    }

    #[tokio::test]
    async fn test_data_response_without_payload() {
        let ctx = detached();
        DataResponse::<Value>::new(StatusCode::ACCEPTED, None).write_response(&ctx);
        assert_eq!(body_json(ctx.finish()).await, json!({"status": 202}));

        let ctx = detached();
        DataResponse::new(StatusCode::OK, Some(Option::<u8>::None)).write_response(&ctx);
        assert_eq!(body_json(ctx.finish()).await, json!({"status": 200}));
    }

    #[tokio::test]
    async fn test_unserializable_payload_falls_back_to_500() {
        let mut payload = HashMap::new();
        payload.insert(vec![1u8], "map keys must be strings");

        let ctx = detached();
        DataResponse::new(StatusCode::OK, Some(payload)).write_response(&ctx);

        let response = ctx.finish();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers().get(header::CONTENT_LENGTH).unwrap(), "0");
    }

    #[tokio::test]
    async fn test_invalid_redirect_location_falls_back_to_500() {
        let ctx = detached();
        RedirectResponse::new(StatusCode::FOUND, "/bad\r\nlocation").write_response(&ctx);

        let response = ctx.finish();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::LOCATION).is_none());
    }

    #[tokio::test]
    async fn test_error_response_envelope() {
        let ctx = detached();
        ErrorResponse::new(StatusCode::FORBIDDEN, "Sorry, you can't do that", "")
            .write_error(&ctx);

        let response = ctx.finish();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(response).await,
            json!({"status": 403, "error": "Sorry, you can't do that"})
        );
    }

    #[tokio::test]
    async fn test_text_response_on_both_paths() {
        let text = TextResponse::new(StatusCode::IM_A_TEAPOT, "short and stout");

        for ctx in [detached(), detached()] {
            text.write_response(&ctx);
            let response = ctx.finish();
            assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
            assert_eq!(
                response.headers().get(header::CONTENT_TYPE).unwrap(),
                "text/plain; charset=utf-8"
            );
        }

        let ctx = detached();
        text.write_error(&ctx);
        let bytes = ctx.finish().into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"short and stout");
    }
}
