//! Per-request context handed to handlers
//!
//! A [`Context`] gives read access to the incoming request and owns the
//! buffered response. Every write goes through one of its primitives
//! (`set_status`, `set_header`, `json`, `raw`, `string`, `redirect`) and
//! nothing reaches the transport until the dispatcher calls [`Context::finish`].

use crate::config::DispatchConfig;
use crate::{Error, Result};
use axum::body::Body;
use axum::extract::{FromRequestParts, MatchedPath, RawPathParams, Request};
use axum::response::Response;
use bytes::Bytes;
use http::request::Parts;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use http_body_util::LengthLimitError;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Header consulted for an upstream request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request/response context for a single request
///
/// Cloning is cheap and every clone refers to the same request. Clones must
/// not outlive the request they were created for.
#[derive(Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

struct Inner {
    request_id: String,
    parts: Parts,
    params: Vec<(String, String)>,
    body: Mutex<Option<Body>>,
    buffer: Mutex<ResponseBuffer>,
    config: Arc<DispatchConfig>,
}

#[derive(Debug, Default)]
struct ResponseBuffer {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseBuffer {
    fn is_empty(&self) -> bool {
        self.status.is_none() && self.headers.is_empty() && self.body.is_empty()
    }
}

impl Context {
    /// Build a context from an incoming axum request
    pub async fn from_request(req: Request, config: Arc<DispatchConfig>) -> Self {
        let (mut parts, body) = req.into_parts();

        let params = match RawPathParams::from_request_parts(&mut parts, &()).await {
            Ok(params) => params
                .iter()
                .map(|(key, value)| (key.to_owned(), value.to_owned()))
                .collect(),
            Err(_) => Vec::new(),
        };

        Self::assemble(parts, params, body, config)
    }

    /// Build a context that is not attached to any connection
    ///
    /// Used for inspecting what a response value writes. Every call returns
    /// a fresh, empty context.
    pub fn detached(config: Arc<DispatchConfig>) -> Self {
        let (parts, body) = http::Request::new(Body::empty()).into_parts();
        Self::assemble(parts, Vec::new(), body, config)
    }

    fn assemble(
        parts: Parts,
        params: Vec<(String, String)>,
        body: Body,
        config: Arc<DispatchConfig>,
    ) -> Self {
        let request_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Self {
            inner: Arc::new(Inner {
                request_id,
                parts,
                params,
                body: Mutex::new(Some(body)),
                buffer: Mutex::new(ResponseBuffer::default()),
                config,
            }),
        }
    }

    // ---------------------------------------------------------------------
    // Request side
    // ---------------------------------------------------------------------

    /// Request id, taken from `x-request-id` or generated
    pub fn request_id(&self) -> &str {
        &self.inner.request_id
    }

    /// HTTP method
    pub fn method(&self) -> &Method {
        &self.inner.parts.method
    }

    /// Request URI
    pub fn uri(&self) -> &Uri {
        &self.inner.parts.uri
    }

    /// Request path
    pub fn path(&self) -> &str {
        self.inner.parts.uri.path()
    }

    /// Route pattern that matched this request, e.g. `/users/:id`
    pub fn full_path(&self) -> Option<&str> {
        self.inner
            .parts
            .extensions
            .get::<MatchedPath>()
            .map(MatchedPath::as_str)
    }

    /// Get a path parameter
    pub fn param(&self, key: &str) -> Option<&str> {
        self.inner
            .params
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Request headers
    pub fn headers(&self) -> &HeaderMap {
        &self.inner.parts.headers
    }

    /// Get a request header as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner
            .parts
            .headers
            .get(name)
            .and_then(|value| value.to_str().ok())
    }

    /// Get a request extension, such as state inserted by an `Extension` layer
    pub fn extension<T: Clone + Send + Sync + 'static>(&self) -> Option<T> {
        self.inner.parts.extensions.get::<T>().cloned()
    }

    /// Configuration this context was created with
    pub fn config(&self) -> &DispatchConfig {
        &self.inner.config
    }

    /// Whether both handles refer to the same request
    pub fn same_request(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Take the raw request body; `None` once it has been taken
    pub fn take_body(&self) -> Option<Body> {
        self.inner.body.lock().take()
    }

    /// Read the whole request body, bounded by `max_body_size`
    pub async fn body_bytes(&self) -> Result<Bytes> {
        let body = self
            .take_body()
            .ok_or_else(|| Error::InvalidBody("request body already consumed".to_string()))?;
        let limit = self.inner.config.max_body_size;

        axum::body::to_bytes(body, limit).await.map_err(|err| {
            let inner = err.into_inner();
            if inner.is::<LengthLimitError>() {
                Error::BodyTooLarge(limit)
            } else {
                Error::InvalidBody(inner.to_string())
            }
        })
    }

    /// Read the request body as JSON
    pub async fn bind_json<T: DeserializeOwned>(&self) -> Result<T> {
        let bytes = self.body_bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| Error::InvalidBody(e.to_string()))
    }

    // ---------------------------------------------------------------------
    // Response side
    // ---------------------------------------------------------------------

    /// Set the response status
    pub fn set_status(&self, status: StatusCode) {
        self.inner.buffer.lock().status = Some(status);
    }

    /// Set a response header, replacing any previous value
    pub fn set_header(&self, name: &str, value: &str) -> Result<()> {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(Error::invalid_header)?;
        let value = HeaderValue::from_str(value).map_err(Error::invalid_header)?;
        self.insert_header(name, value);
        Ok(())
    }

    /// Set an already validated response header
    pub fn insert_header(&self, name: HeaderName, value: HeaderValue) {
        self.inner.buffer.lock().headers.insert(name, value);
    }

    /// Write `value` as a JSON body with the given status
    ///
    /// Nothing is written if serialization fails.
    pub fn json<T: Serialize + ?Sized>(&self, status: StatusCode, value: &T) -> Result<()> {
        let body = serde_json::to_vec(value)?;
        let content_type = HeaderValue::from_str(&self.inner.config.json_content_type)
            .map_err(Error::invalid_header)?;
        self.write_body(status, content_type, &body);
        Ok(())
    }

    /// Write `text` verbatim with the configured text content type
    pub fn string(&self, status: StatusCode, text: &str) -> Result<()> {
        let content_type = HeaderValue::from_str(&self.inner.config.text_content_type)
            .map_err(Error::invalid_header)?;
        self.write_body(status, content_type, text.as_bytes());
        Ok(())
    }

    /// Write raw bytes with an explicit content type
    pub fn raw(&self, status: StatusCode, content_type: &str, body: &[u8]) -> Result<()> {
        let content_type = HeaderValue::from_str(content_type).map_err(Error::invalid_header)?;
        self.write_body(status, content_type, body);
        Ok(())
    }

    /// Set `Location` and the status, without a body
    pub fn redirect(&self, status: StatusCode, location: &str) -> Result<()> {
        let location = HeaderValue::from_str(location).map_err(Error::invalid_header)?;
        let mut buffer = self.inner.buffer.lock();
        buffer.headers.insert(header::LOCATION, location);
        buffer.status = Some(status);
        Ok(())
    }

    fn write_body(&self, status: StatusCode, content_type: HeaderValue, body: &[u8]) {
        let mut buffer = self.inner.buffer.lock();
        buffer.status = Some(status);
        buffer
            .headers
            .entry(header::CONTENT_TYPE)
            .or_insert(content_type);
        buffer.body.extend_from_slice(body);
    }

    /// Drop the buffered body along with its `Content-Type` and `Content-Length`
    ///
    /// Status and every other header are left alone.
    pub fn discard_body(&self) {
        let mut buffer = self.inner.buffer.lock();
        buffer.body.clear();
        buffer.headers.remove(header::CONTENT_TYPE);
        buffer.headers.remove(header::CONTENT_LENGTH);
    }

    /// Whether anything has been written to the response yet
    pub fn written(&self) -> bool {
        !self.inner.buffer.lock().is_empty()
    }

    /// Status the response would be sent with right now
    pub fn response_status(&self) -> StatusCode {
        self.inner.buffer.lock().status.unwrap_or(StatusCode::OK)
    }

    /// Flush the buffered status, headers and body into a response
    ///
    /// The buffer is left empty, so a second call yields a bare `200`.
    pub fn finish(&self) -> Response {
        let buffer = std::mem::take(&mut *self.inner.buffer.lock());

        let mut response = Response::new(Body::from(buffer.body));
        *response.status_mut() = buffer.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = buffer.headers;
        response
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("request_id", &self.inner.request_id)
            .field("method", &self.inner.parts.method)
            .field("uri", &self.inner.parts.uri)
            .field("params", &self.inner.params)
            .finish()
    }
}
