#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod dispatch;
mod env;
pub mod health;
mod loader;
pub mod records;
pub mod retry;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use dispatch::*;
pub use health::*;
pub use records::*;
pub use retry::*;
pub use server::*;
pub use telemetry::TelemetryConfig;

/// Top-level errgate configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Error translation settings
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// Retry policy for transient failures
    #[serde(default)]
    pub retry: RetryConfig,
    /// Record store used by the bundled handlers
    #[serde(default)]
    pub records: RecordsConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
