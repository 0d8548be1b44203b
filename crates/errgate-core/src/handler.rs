use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::response::ResponseWriter;

/// Incoming request as seen by handlers
pub type Request = axum::extract::Request;

/// Unit of request-processing logic
///
/// A handler writes its successful output to `response` and returns
/// `Ok(())`. On failure it returns an error and writes nothing itself;
/// turning the error into a response is the dispatcher's job. The error
/// type decides how much the dispatcher knows about the failure.
#[async_trait]
pub trait Handler<E>: Send + Sync + 'static {
    /// Process one request
    async fn call(&self, ctx: &RequestContext, request: Request, response: &mut ResponseWriter) -> Result<(), E>;
}

/// Handler built from an async closure, see [`handler_fn`]
pub struct HandlerFn<F, E> {
    f: F,
    _error: PhantomData<fn() -> E>,
}

/// Adapt an async closure into a [`Handler`]
///
/// The closure owns its inputs and returns the response it built. On
/// failure nothing it produced reaches the client.
pub const fn handler_fn<F, Fut, E>(f: F) -> HandlerFn<F, E>
where
    F: Fn(RequestContext, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ResponseWriter, E>> + Send,
{
    HandlerFn { f, _error: PhantomData }
}

#[async_trait]
impl<F, Fut, E> Handler<E> for HandlerFn<F, E>
where
    F: Fn(RequestContext, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ResponseWriter, E>> + Send,
    E: Send + 'static,
{
    async fn call(&self, ctx: &RequestContext, request: Request, response: &mut ResponseWriter) -> Result<(), E> {
        *response = (self.f)(ctx.clone(), request).await?;
        Ok(())
    }
}
