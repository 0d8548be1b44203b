use std::path::Path;

use http::StatusCode;

use crate::Config;

/// Upper bound on configured retry attempts
const MAX_RETRY_ATTEMPTS: u32 = 100;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_server()?;
        self.validate_dispatch()?;
        self.validate_retry()?;
        self.validate_telemetry()?;
        Ok(())
    }

    /// Parsed fallback status for bare errors
    ///
    /// # Errors
    ///
    /// Returns an error unless the status is a valid 4xx or 5xx code
    pub fn fallback_status(&self) -> anyhow::Result<StatusCode> {
        let code = self.dispatch.fallback_status;
        let status = StatusCode::from_u16(code)
            .map_err(|_| anyhow::anyhow!("dispatch.fallback_status is not a valid status code: {code}"))?;

        if !status.is_client_error() && !status.is_server_error() {
            anyhow::bail!("dispatch.fallback_status must be a 4xx or 5xx status, got {code}");
        }

        Ok(status)
    }

    fn validate_server(&self) -> anyhow::Result<()> {
        self.server.request_timeout()?;

        if self.server.health.enabled && !self.server.health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/': {}", self.server.health.path);
        }

        Ok(())
    }

    fn validate_dispatch(&self) -> anyhow::Result<()> {
        self.fallback_status().map(|_| ())
    }

    fn validate_retry(&self) -> anyhow::Result<()> {
        let attempts = self.retry.max_attempts;
        if !(1..=MAX_RETRY_ATTEMPTS).contains(&attempts) {
            anyhow::bail!("retry.max_attempts must be between 1 and {MAX_RETRY_ATTEMPTS}, got {attempts}");
        }

        duration_str::parse(&self.retry.backoff)
            .map_err(|e| anyhow::anyhow!("invalid retry.backoff '{}': {e}", self.retry.backoff))?;

        Ok(())
    }

    fn validate_telemetry(&self) -> anyhow::Result<()> {
        let Some(ref telemetry) = self.telemetry else {
            return Ok(());
        };

        if !(0.0..=1.0).contains(&telemetry.sampling_rate) {
            anyhow::bail!("telemetry.sampling_rate must be between 0.0 and 1.0");
        }

        Ok(())
    }
}
