use std::time::Duration;

use http::{Method, Uri};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Per-request inputs handed to every handler
///
/// The dispatcher builds this and passes it through untouched. Cancellation
/// and the deadline are for handlers to consult; nothing upstream of the
/// handler acts on them.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Identifier used to correlate log lines for one request
    pub request_id: Uuid,
    /// Request method, kept for diagnostics
    pub method: Method,
    /// Request URI, kept for diagnostics
    pub uri: Uri,
    /// Fires when the server is shutting down
    pub cancellation: CancellationToken,
    /// Point in time after which the client no longer cares about the answer
    pub deadline: Option<Instant>,
}

impl RequestContext {
    /// Create a context for a request
    pub fn new(method: Method, uri: Uri, cancellation: CancellationToken) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            method,
            uri,
            cancellation,
            deadline: None,
        }
    }

    /// Create a minimal context for non-HTTP use
    ///
    /// `GET /` with a fresh cancellation token and no deadline
    pub fn empty() -> Self {
        Self::new(Method::GET, Uri::from_static("/"), CancellationToken::new())
    }

    /// Set a deadline `timeout` from now
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Time left before the deadline, if there is one
    ///
    /// Returns `Some(Duration::ZERO)` once the deadline has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_has_no_deadline() {
        let ctx = RequestContext::empty();
        assert!(ctx.deadline.is_none());
        assert!(ctx.remaining().is_none());
        assert!(!ctx.is_cancelled());
        assert_eq!(ctx.method, Method::GET);
    }

    #[test]
    fn cancellation_is_observable() {
        let parent = CancellationToken::new();
        let ctx = RequestContext::new(Method::POST, Uri::from_static("/records"), parent.child_token());

        parent.cancel();
        assert!(ctx.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_counts_down_to_zero() {
        let ctx = RequestContext::empty().with_timeout(Duration::from_secs(2));
        assert_eq!(ctx.remaining(), Some(Duration::from_secs(2)));

        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }
}
