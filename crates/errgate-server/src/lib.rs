#![allow(clippy::must_use_candidate)]

mod health;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use errgate_config::{Config, RecordFormat};
use errgate_dispatch::{DispatchOptions, Registry};
use errgate_records::{FileStore, HtmlRenderer, MemoryStore, RecordStore, RecordsState};
use errgate_retry::{Retrier, RetryPolicy};
use http::Method;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
    handlers_shutdown: CancellationToken,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configured value is invalid or the route
    /// registry rejects a registration
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let options = DispatchOptions {
            fallback_status: config.fallback_status()?,
            request_timeout: config.server.request_timeout()?,
        };

        let policy = RetryPolicy::from_config(&config.retry)?;

        let store: Arc<dyn RecordStore> = match config.records.directory {
            Some(ref directory) => {
                tracing::info!(directory = %directory.display(), "serving records from disk");
                Arc::new(FileStore::new(directory))
            }
            None => {
                tracing::info!("no records directory configured, using an empty in-memory store");
                Arc::new(MemoryStore::new())
            }
        };

        let mut state = RecordsState::new(store).with_retrier(Retrier::new(policy));
        if config.records.format == RecordFormat::Html {
            state = state.with_renderer(HtmlRenderer);
        }

        let mut routes = errgate_records::register(Registry::builder(), &state, &options);

        // Health check
        if config.server.health.enabled {
            routes = routes.route(Method::GET, config.server.health.path.clone(), health::endpoint());
        }

        let registry = routes.build()?;
        for (method, path) in registry.routes() {
            tracing::debug!(%method, path, "route registered");
        }

        // Handlers see this token; it fires once graceful shutdown begins
        let handlers_shutdown = CancellationToken::new();

        let app = registry
            .into_router(handlers_shutdown.clone())
            .layer(TraceLayer::new_for_http());

        Ok(Self {
            router: app,
            listen_address,
            handlers_shutdown,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Override the listen address
    #[must_use]
    pub fn with_listen_address(mut self, listen_address: SocketAddr) -> Self {
        self.listen_address = listen_address;
        self
    }

    /// Consume the server and return the inner router
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Bind the configured listen address and start serving requests
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.listen_address).await?;
        self.serve_on(listener, shutdown).await
    }

    /// Serve requests on an already bound listener
    ///
    /// Blocks until the cancellation token is triggered. In-flight handlers
    /// are cancelled once shutdown starts and the server drains them.
    ///
    /// # Errors
    ///
    /// Returns an error if serving fails
    pub async fn serve_on(self, listener: TcpListener, shutdown: CancellationToken) -> anyhow::Result<()> {
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        let handlers_shutdown = self.handlers_shutdown;

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
                handlers_shutdown.cancel();
            })
            .await?;

        Ok(())
    }
}
