//! Recording what a response value writes

use axum::response::Response;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use stdapi_core::{Context, DispatchConfig, Envelope, Failure, Fault, Res, Success};
use std::sync::Arc;

/// Status, headers and body of a finished response
#[derive(Debug, Clone)]
pub struct Recorded {
    /// Response status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
}

impl Recorded {
    /// Drain a response into memory
    pub async fn from_response(response: Response) -> Self {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .expect("failed to read response body")
            .to_bytes();

        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    /// Flush a context and record the result
    pub fn from_context(ctx: &Context) -> Self {
        // Buffered bodies are always ready, so this never actually blocks.
        futures::executor::block_on(Self::from_response(ctx.finish()))
    }

    /// Body as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as arbitrary JSON
    pub fn json(&self) -> serde_json::Result<Value> {
        serde_json::from_slice(&self.body)
    }

    /// Body parsed as a standard envelope
    pub fn envelope(&self) -> stdapi_core::Result<Envelope> {
        Envelope::from_slice(&self.body)
    }

    /// A response header as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Writes response values into throwaway contexts
///
/// Every recording uses a brand new [`Context`]; nothing carries over from one
/// call to the next.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    config: Arc<DispatchConfig>,
}

impl Recorder {
    /// Recorder using `config` for every context it creates
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    fn context(&self) -> Context {
        Context::detached(Arc::clone(&self.config))
    }

    /// Record a success value
    pub fn success(&self, success: &dyn Success) -> Recorded {
        let ctx = self.context();
        success.write_response(&ctx);
        Recorded::from_context(&ctx)
    }

    /// Record a failure value
    pub fn failure(&self, failure: &dyn Failure) -> Recorded {
        let ctx = self.context();
        failure.write_error(&ctx);
        Recorded::from_context(&ctx)
    }

    /// Record a [`Res`]; the already-handled marker records an untouched context
    pub fn res(&self, res: &Res) -> Recorded {
        match res.as_success() {
            Some(success) => self.success(success),
            None => Recorded::from_context(&self.context()),
        }
    }

    /// Record a [`Fault`]
    pub fn fault(&self, fault: &Fault) -> Recorded {
        self.failure(fault.as_failure())
    }
}
