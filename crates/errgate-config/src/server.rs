use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;

use crate::health::HealthConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub listen_address: Option<SocketAddr>,
    /// Per-request deadline handed to handlers (e.g. "30s")
    #[serde(default)]
    pub request_timeout: Option<String>,
    #[serde(default)]
    pub health: HealthConfig,
}

impl ServerConfig {
    /// Parsed request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the configured value is not a valid duration
    pub fn request_timeout(&self) -> anyhow::Result<Option<Duration>> {
        self.request_timeout
            .as_deref()
            .map(|raw| {
                duration_str::parse(raw)
                    .map_err(|e| anyhow::anyhow!("invalid server.request_timeout '{raw}': {e}"))
            })
            .transpose()
    }
}
