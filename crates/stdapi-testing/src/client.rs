//! Driving an axum router in-process

use crate::recorder::Recorded;
use axum::body::Body;
use axum::Router;
use http::{Method, Request};
use std::collections::HashMap;
use tower::ServiceExt;

/// Run `request` through `router` and record the response
pub async fn send(router: Router, request: Request<Body>) -> Recorded {
    let response = match router.oneshot(request).await {
        Ok(response) => response,
        Err(err) => match err {},
    };
    Recorded::from_response(response).await
}

/// `GET uri` against `router`
pub async fn get(router: Router, uri: &str) -> Recorded {
    send(router, RequestBuilder::get(uri).build()).await
}

/// Builder for requests sent with [`send`]
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    uri: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl RequestBuilder {
    /// A request with the given method and URI
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// `GET` request
    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(Method::GET, uri)
    }

    /// `POST` request
    pub fn post(uri: impl Into<String>) -> Self {
        Self::new(Method::POST, uri)
    }

    /// `PUT` request
    pub fn put(uri: impl Into<String>) -> Self {
        Self::new(Method::PUT, uri)
    }

    /// `DELETE` request
    pub fn delete(uri: impl Into<String>) -> Self {
        Self::new(Method::DELETE, uri)
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the raw body
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a JSON body and its content type
    pub fn json_body(mut self, value: &serde_json::Value) -> Self {
        self.body = value.to_string().into_bytes();
        self.headers
            .insert("content-type".to_string(), "application/json".to_string());
        self
    }

    /// Build the request
    ///
    /// # Panics
    ///
    /// When the URI or a header is malformed.
    pub fn build(self) -> Request<Body> {
        let mut builder = Request::builder().method(self.method).uri(self.uri);

        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }

        builder
            .body(Body::from(self.body))
            .expect("invalid test request")
    }

    /// Build and send to `router`
    pub async fn send(self, router: Router) -> Recorded {
        send(router, self.build()).await
    }
}
