use std::sync::Arc;

use async_trait::async_trait;
use axum::RequestExt;
use axum::extract::Path;
use errgate_core::{BoxError, Handler, Request, RequestContext, ResponseWriter, StructuredError};
use errgate_dispatch::{DispatchOptions, Dispatcher, RegistryBuilder};
use errgate_retry::Retrier;
use http::Method;
use http::header::{self, HeaderValue};

use crate::error::RecordError;
use crate::render::{JsonRenderer, Renderer};
use crate::store::{Record, RecordStore};

/// Collaborators shared by the record handlers
#[derive(Clone)]
pub struct RecordsState {
    store: Arc<dyn RecordStore>,
    renderer: Arc<dyn Renderer>,
    retrier: Retrier,
}

impl RecordsState {
    /// State over `store` with JSON rendering and the default retry policy
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            renderer: Arc::new(JsonRenderer),
            retrier: Retrier::default(),
        }
    }

    #[must_use]
    pub fn with_renderer(mut self, renderer: impl Renderer) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    #[must_use]
    pub fn with_retrier(mut self, retrier: Retrier) -> Self {
        self.retrier = retrier;
        self
    }

    /// Fetch `id`, retrying temporary store failures
    ///
    /// Waiting stops when the request is cancelled; the whole lookup is cut
    /// short at the request deadline.
    async fn fetch(&self, ctx: &RequestContext, id: &str) -> Result<Record, RecordError> {
        let retrier = self.retrier.clone().with_cancellation(ctx.cancellation.clone());
        let lookup = retrier.run(|attempt| {
            tracing::trace!(id, attempt, "fetching record");
            self.store.fetch(id)
        });

        match ctx.remaining() {
            Some(remaining) => tokio::time::timeout(remaining, lookup)
                .await
                .map_err(|_| RecordError::TimedOut)?
                .map_err(RecordError::from),
            None => lookup.await.map_err(RecordError::from),
        }
    }
}

/// Shows a rendered record, reporting failures as structured errors
pub struct ShowRecord {
    state: RecordsState,
}

impl ShowRecord {
    pub const fn new(state: RecordsState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Handler<StructuredError> for ShowRecord {
    async fn call(
        &self,
        ctx: &RequestContext,
        mut request: Request,
        response: &mut ResponseWriter,
    ) -> Result<(), StructuredError> {
        let Path(id) = request
            .extract_parts::<Path<String>>()
            .await
            .map_err(|rejection| StructuredError::bad_request(rejection, "Invalid record id"))?;

        let record = self
            .state
            .fetch(ctx, &id)
            .await
            .map_err(|e| StructuredError::from(e).with_field("id", id.clone()))?;

        let body = self
            .state
            .renderer
            .render(&record)
            .map_err(|e| StructuredError::from(RecordError::Render(e)).with_field("id", id))?;

        response.insert_header(
            header::CONTENT_TYPE,
            HeaderValue::from_static(self.state.renderer.content_type()),
        );
        response.write(body);

        Ok(())
    }
}

/// Returns the stored record as JSON, reporting failures as bare errors
pub struct RawRecord {
    state: RecordsState,
}

impl RawRecord {
    pub const fn new(state: RecordsState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Handler<BoxError> for RawRecord {
    async fn call(
        &self,
        ctx: &RequestContext,
        mut request: Request,
        response: &mut ResponseWriter,
    ) -> Result<(), BoxError> {
        let Path(id) = request.extract_parts::<Path<String>>().await?;

        let record = self.state.fetch(ctx, &id).await?;
        response.json(&record)?;

        Ok(())
    }
}

/// Add the record routes to `builder`
///
/// - `GET /records/{id}` renders the record ([`ShowRecord`])
/// - `GET /records/{id}/raw` returns it as JSON ([`RawRecord`])
pub fn register(builder: RegistryBuilder, state: &RecordsState, options: &DispatchOptions) -> RegistryBuilder {
    builder
        .route(
            Method::GET,
            "/records/{id}",
            Dispatcher::structured(ShowRecord::new(state.clone())).with_options(options.clone()),
        )
        .route(
            Method::GET,
            "/records/{id}/raw",
            Dispatcher::bare(RawRecord::new(state.clone())).with_options(options.clone()),
        )
}
