use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::response::{IntoResponse, Response};
use errgate_core::{BoxError, Handler, Request, RequestContext, ResponseWriter, StructuredError};
use http::StatusCode;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Dispatcher settings shared by every route
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Status used for bare errors that carry no status of their own
    pub fallback_status: StatusCode,
    /// Deadline placed on each request context, if any
    pub request_timeout: Option<Duration>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            fallback_status: StatusCode::INTERNAL_SERVER_ERROR,
            request_timeout: None,
        }
    }
}

/// What the client receives when a handler fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReply {
    /// Response status
    pub status: StatusCode,
    /// Plain-text response body
    pub message: String,
}

/// Error types a dispatcher knows how to translate
///
/// The handler's declared error type picks the translation: bare errors get
/// the fallback status and their own description, structured errors are
/// used verbatim.
pub trait HandlerError: Send + 'static {
    /// Build the client reply, logging anything the client must not see
    fn into_reply(self, ctx: &RequestContext, options: &DispatchOptions) -> ErrorReply;
}

impl HandlerError for BoxError {
    fn into_reply(self, ctx: &RequestContext, options: &DispatchOptions) -> ErrorReply {
        let message = self.to_string();

        tracing::warn!(
            request_id = %ctx.request_id,
            method = %ctx.method,
            uri = %ctx.uri,
            status = options.fallback_status.as_u16(),
            error = %message,
            "handler failed"
        );

        ErrorReply {
            status: options.fallback_status,
            message,
        }
    }
}

impl HandlerError for StructuredError {
    fn into_reply(self, ctx: &RequestContext, _options: &DispatchOptions) -> ErrorReply {
        let fields = self.fields().clone();
        let (cause, message, status) = self.into_parts();

        tracing::error!(
            request_id = %ctx.request_id,
            method = %ctx.method,
            uri = %ctx.uri,
            status = status.as_u16(),
            cause = %Chain(cause.as_ref()),
            ?fields,
            "handler failed"
        );

        ErrorReply { status, message }
    }
}

/// Displays an error followed by each of its sources
struct Chain<'a>(&'a (dyn std::error::Error + 'static));

impl fmt::Display for Chain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;

        let mut source = self.0.source();
        while let Some(err) = source {
            write!(f, ": {err}")?;
            source = err.source();
        }

        Ok(())
    }
}

/// Wraps a handler and turns its failures into responses
///
/// This is the only place where handler errors become client-visible
/// output. Per request it invokes the handler, leaves the response alone on
/// success, and on failure replaces whatever the handler wrote with one
/// status and one message. The dispatcher keeps no per-request state.
pub struct Dispatcher<H, E> {
    handler: Arc<H>,
    options: DispatchOptions,
    _error: PhantomData<fn() -> E>,
}

impl<H, E> Clone for Dispatcher<H, E> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            options: self.options.clone(),
            _error: PhantomData,
        }
    }
}

impl<H> Dispatcher<H, BoxError>
where
    H: Handler<BoxError>,
{
    /// Wrap a handler that only reports bare errors
    pub fn bare(handler: H) -> Self {
        Self::new(handler)
    }
}

impl<H> Dispatcher<H, StructuredError>
where
    H: Handler<StructuredError>,
{
    /// Wrap a handler that reports structured errors
    pub fn structured(handler: H) -> Self {
        Self::new(handler)
    }
}

impl<H, E> Dispatcher<H, E>
where
    H: Handler<E>,
    E: HandlerError,
{
    /// Wrap a handler with default options
    pub fn new(handler: H) -> Self {
        Self {
            handler: Arc::new(handler),
            options: DispatchOptions::default(),
            _error: PhantomData,
        }
    }

    /// Replace the dispatch options
    #[must_use]
    pub fn with_options(mut self, options: DispatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Options in effect
    pub const fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Build the context for an incoming request
    pub fn context_for(&self, request: &Request, cancellation: CancellationToken) -> RequestContext {
        let ctx = RequestContext::new(request.method().clone(), request.uri().clone(), cancellation);

        match self.options.request_timeout {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx,
        }
    }

    /// Run the handler and translate its outcome
    pub async fn dispatch(&self, ctx: &RequestContext, request: Request) -> ResponseWriter {
        let mut response = ResponseWriter::new();

        let outcome = self
            .handler
            .call(ctx, request, &mut response)
            .instrument(tracing::debug_span!("handler", request_id = %ctx.request_id))
            .await;

        match outcome {
            Ok(()) => {}
            Err(error) => {
                let reply = error.into_reply(ctx, &self.options);
                response.fail(reply.status, &reply.message);
            }
        }

        response
    }
}

/// Type-erased route target served by the registry
#[async_trait]
pub trait Endpoint: Send + Sync + 'static {
    /// Serve one request; `shutdown` is the server-wide cancellation token
    async fn serve(&self, request: Request, shutdown: &CancellationToken) -> Response;
}

#[async_trait]
impl<H, E> Endpoint for Dispatcher<H, E>
where
    H: Handler<E>,
    E: HandlerError,
{
    async fn serve(&self, request: Request, shutdown: &CancellationToken) -> Response {
        let ctx = self.context_for(&request, shutdown.child_token());
        self.dispatch(&ctx, request).await.into_response()
    }
}
