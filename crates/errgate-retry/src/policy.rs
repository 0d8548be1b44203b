use std::num::NonZeroU32;
use std::time::Duration;

use errgate_config::RetryConfig;

use crate::error::RetryError;

const DEFAULT_MAX_ATTEMPTS: NonZeroU32 = NonZeroU32::new(3).unwrap();
const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// How often and how far apart to retry
///
/// The attempt count is always bounded: at least one attempt, never more
/// than `max_attempts`. Backoff is fixed between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: NonZeroU32,
    backoff: Duration,
}

impl RetryPolicy {
    /// Create a policy
    pub const fn new(max_attempts: NonZeroU32, backoff: Duration) -> Self {
        Self { max_attempts, backoff }
    }

    /// A policy that never retries
    pub const fn no_retry() -> Self {
        Self::new(NonZeroU32::MIN, Duration::ZERO)
    }

    /// Build a policy from configuration
    pub fn from_config(config: &RetryConfig) -> Result<Self, RetryError> {
        let max_attempts = NonZeroU32::new(config.max_attempts)
            .ok_or_else(|| RetryError::Config("max_attempts must be at least 1".to_string()))?;
        let backoff = parse_duration(&config.backoff)?;

        Ok(Self::new(max_attempts, backoff))
    }

    /// Total attempts, including the first
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts.get()
    }

    /// Wait between consecutive attempts
    pub const fn backoff(&self) -> Duration {
        self.backoff
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BACKOFF)
    }
}

fn parse_duration(s: &str) -> Result<Duration, RetryError> {
    duration_str::parse(s).map_err(|e| RetryError::Config(format!("invalid duration '{s}': {e}")))
}
