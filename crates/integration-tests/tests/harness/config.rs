//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::path::Path;

use errgate_config::{Config, RecordFormat};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    ///
    /// Retries are immediate so failing tests do not sleep.
    pub fn new() -> Self {
        let mut config = Config::default();
        config.server.listen_address = Some(SocketAddr::from(([127, 0, 0, 1], 0)));
        config.retry.backoff = "0s".to_owned();

        Self { config }
    }

    /// Serve records from `directory`
    pub fn with_records_dir(mut self, directory: &Path) -> Self {
        self.config.records.directory = Some(directory.to_path_buf());
        self
    }

    /// Render records as HTML
    pub fn with_html(mut self) -> Self {
        self.config.records.format = RecordFormat::Html;
        self
    }

    /// Status used for bare errors
    pub fn with_fallback_status(mut self, status: u16) -> Self {
        self.config.dispatch.fallback_status = status;
        self
    }

    /// Per-request deadline
    pub fn with_request_timeout(mut self, timeout: &str) -> Self {
        self.config.server.request_timeout = Some(timeout.to_owned());
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    ///
    /// # Panics
    ///
    /// Panics if the assembled config fails validation
    pub fn build(self) -> Config {
        self.config.validate().expect("test config is valid");
        self.config
    }
}
