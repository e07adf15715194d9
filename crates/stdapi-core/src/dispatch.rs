//! Turning `Outcome`-returning handlers into axum handlers
//!
//! [`handle`] wraps a handler so it can be registered on an axum router:
//!
//! ```rust,no_run
//! use axum::{routing::get, Router};
//! use stdapi_core::{handle, not_found, status, Context, Fault, Res, StatusCode};
//!
//! async fn show(ctx: Context) -> Result<Res, Fault> {
//!     match ctx.param("id") {
//!         Some("1") => Ok(status(StatusCode::OK)),
//!         _ => Err(not_found()),
//!     }
//! }
//!
//! let app: Router = Router::new().route("/users/:id", get(handle(show)));
//! ```
//!
//! The wrapped handler runs once per request. If it produced a failure, that
//! failure is written; otherwise a success is written unless it is
//! [`Res::ALREADY_HANDLED`](crate::Res::ALREADY_HANDLED). A success returned
//! together with a failure is dropped without being written.

use crate::config::DispatchConfig;
use crate::response::{Failure, Outcome, Success};
use crate::{Context, Result};
use axum::extract::Request;
use axum::response::Response;
use futures::future::{BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// A request handler producing an [`Outcome`]
///
/// Implemented for every `async fn(Context) -> T` (and equivalent closure)
/// where `T: Into<Outcome>`, e.g. `Result<Res, Fault>`, `Res`, `Fault` or
/// `(Option<Res>, Option<Fault>)`.
pub trait Handler: Clone + Send + Sync + 'static {
    /// Run the handler for one request
    fn call(&self, ctx: Context) -> BoxFuture<'static, Outcome>;
}

impl<F, Fut, O> Handler for F
where
    F: Fn(Context) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = O> + Send + 'static,
    O: Into<Outcome>,
{
    fn call(&self, ctx: Context) -> BoxFuture<'static, Outcome> {
        let fut = (self)(ctx);
        async move { fut.await.into() }.boxed()
    }
}

type BeforeSuccess = Arc<dyn Fn(&Context, &dyn Success) + Send + Sync>;
type BeforeFailure = Arc<dyn Fn(&Context, &dyn Failure) + Send + Sync>;

/// Callbacks run right before a response is written
///
/// They see the live context and the exact value about to be written. They
/// are meant for observation (metrics, logging) and must not write to the
/// response themselves. A panicking callback is not caught.
#[derive(Clone, Default)]
pub struct Inspection {
    before_success: Option<BeforeSuccess>,
    before_failure: Option<BeforeFailure>,
}

impl Inspection {
    /// No callbacks
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` before every success write
    pub fn before_success<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context, &dyn Success) + Send + Sync + 'static,
    {
        self.before_success = Some(Arc::new(f));
        self
    }

    /// Run `f` before every failure write
    pub fn before_failure<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context, &dyn Failure) + Send + Sync + 'static,
    {
        self.before_failure = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for Inspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inspection")
            .field("before_success", &self.before_success.is_some())
            .field("before_failure", &self.before_failure.is_some())
            .finish()
    }
}

/// Terminal state of one dispatched request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// A success value was written
    Success,
    /// A failure value was written
    Failure,
    /// The handler returned the already-handled marker; nothing was written
    AlreadyHandled,
    /// The handler returned neither; nothing was written
    Empty,
}

impl Disposition {
    /// Short label used in log events
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Success => "success",
            Disposition::Failure => "failure",
            Disposition::AlreadyHandled => "already_handled",
            Disposition::Empty => "empty",
        }
    }
}

/// Wraps handlers with a shared configuration and inspection callbacks
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    config: Arc<DispatchConfig>,
    inspection: Inspection,
}

impl Dispatcher {
    /// Create a dispatcher
    ///
    /// Fails when `config` does not pass [`DispatchConfig::validate`], since
    /// every response written with it would otherwise degrade to a bare 500.
    pub fn new(config: DispatchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            inspection: Inspection::default(),
        })
    }

    /// Replace the inspection callbacks
    pub fn with_inspection(mut self, inspection: Inspection) -> Self {
        self.inspection = inspection;
        self
    }

    /// Dispatcher configuration
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Wrap `handler` into an axum handler
    pub fn handle<H: Handler>(
        &self,
        handler: H,
    ) -> impl Fn(Request) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static {
        let dispatcher = self.clone();

        move |req: Request| {
            let dispatcher = dispatcher.clone();
            let handler = handler.clone();

            async move {
                let ctx = Context::from_request(req, Arc::clone(&dispatcher.config)).await;
                dispatcher.dispatch(&handler, &ctx).await;
                ctx.finish()
            }
            .boxed()
        }
    }

    /// Wrap `handler` with callbacks that replace this dispatcher's own
    pub fn handle_with_inspection<H: Handler>(
        &self,
        handler: H,
        inspection: Inspection,
    ) -> impl Fn(Request) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static {
        self.clone().with_inspection(inspection).handle(handler)
    }

    /// Run `handler` against `ctx` and write its outcome
    pub async fn dispatch<H: Handler>(&self, handler: &H, ctx: &Context) -> Disposition {
        let outcome = handler.call(ctx.clone()).await;
        let disposition = self.settle(ctx, outcome);

        if self.config.log_dispatch {
            debug!(
                request_id = %ctx.request_id(),
                method = %ctx.method(),
                path = %ctx.path(),
                outcome = disposition.as_str(),
                status = ctx.response_status().as_u16(),
                "request dispatched"
            );
        }

        disposition
    }

    /// Write an already computed outcome into `ctx`
    ///
    /// Before a success or failure is written, any body the handler buffered
    /// is discarded together with its `Content-Type` and `Content-Length`.
    /// Other headers the handler set (cookies, caching) are kept.
    pub fn settle(&self, ctx: &Context, outcome: Outcome) -> Disposition {
        let (res, fault) = outcome.into_parts();

        if let Some(fault) = fault {
            let failure = fault.as_failure();
            if let Some(inspect) = &self.inspection.before_failure {
                inspect(ctx, failure);
            }
            ctx.discard_body();
            failure.write_error(ctx);
            return Disposition::Failure;
        }

        let Some(res) = res else {
            return Disposition::Empty;
        };

        match res.as_success() {
            Some(success) => {
                if let Some(inspect) = &self.inspection.before_success {
                    inspect(ctx, success);
                }
                ctx.discard_body();
                success.write_response(ctx);
                Disposition::Success
            }
            None => Disposition::AlreadyHandled,
        }
    }
}

/// Wrap `handler` into an axum handler using the default configuration
pub fn handle<H: Handler>(
    handler: H,
) -> impl Fn(Request) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static {
    Dispatcher::default().handle(handler)
}

/// Like [`handle`], running `inspection` callbacks before each write
pub fn handle_with_inspection<H: Handler>(
    handler: H,
    inspection: Inspection,
) -> impl Fn(Request) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static {
    Dispatcher::default()
        .with_inspection(inspection)
        .handle(handler)
}
