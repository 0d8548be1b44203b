//! Bounded retry for operations that fail with temporary errors
//!
//! Only errors that expose the transient capability and report themselves
//! as temporary are retried. Everything else is returned after one attempt.

#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

mod error;
mod policy;

use std::future::Future;

use errgate_core::transient;
use tokio_util::sync::CancellationToken;

pub use error::RetryError;
pub use policy::RetryPolicy;

/// Runs an operation under a [`RetryPolicy`]
#[derive(Debug, Clone, Default)]
pub struct Retrier {
    policy: RetryPolicy,
    cancellation: Option<CancellationToken>,
}

impl Retrier {
    /// Create a retrier for `policy`
    pub const fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            cancellation: None,
        }
    }

    /// Stop waiting between attempts once `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Policy in effect
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out
    ///
    /// `op` receives the 1-based attempt number. Between attempts the
    /// retrier sleeps for the policy's backoff; only the calling task
    /// waits. Cancellation during the wait returns the last error.
    pub async fn run<F, Fut, T, E>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + 'static,
    {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;

        loop {
            let err = match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !transient::is_temporary(&err) {
                return Err(err);
            }

            if attempt >= max_attempts {
                tracing::warn!(attempts = attempt, error = %err, "giving up after temporary failures");
                return Err(err);
            }

            tracing::warn!(
                attempt,
                max_attempts,
                backoff = ?self.policy.backoff(),
                error = %err,
                "temporary failure, retrying"
            );

            if !self.wait().await {
                tracing::debug!(attempt, "retry cancelled");
                return Err(err);
            }

            attempt += 1;
        }
    }

    /// Sleep for the backoff; `false` if cancelled first
    async fn wait(&self) -> bool {
        let backoff = self.policy.backoff();

        match &self.cancellation {
            Some(token) => tokio::select! {
                () = token.cancelled() => false,
                () = tokio::time::sleep(backoff) => true,
            },
            None => {
                tokio::time::sleep(backoff).await;
                true
            }
        }
    }
}
