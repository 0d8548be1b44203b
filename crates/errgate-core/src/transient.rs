//! Optional transient/timeout classification for errors
//!
//! Not every error supports this refinement. Callers look for it with
//! [`as_transient`] and fall back to ordinary handling when it is absent.

use std::error::Error as StdError;
use std::io;

use thiserror::Error;

/// Failure classification used to decide whether to retry
pub trait Transient {
    /// Whether the same operation may succeed if tried again
    fn is_temporary(&self) -> bool;

    /// Whether the failure was caused by a deadline expiring
    fn is_timeout(&self) -> bool;
}

/// Error value that carries its own classification
#[derive(Debug, Clone, Error)]
#[error("{description}")]
pub struct TransientError {
    description: String,
    temporary: bool,
    timeout: bool,
}

impl TransientError {
    /// A failure worth retrying
    pub fn temporary(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            temporary: true,
            timeout: false,
        }
    }

    /// A deadline expiry, which is also worth retrying
    pub fn timeout(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            temporary: true,
            timeout: true,
        }
    }

    /// A failure that will not go away on its own
    pub fn permanent(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            temporary: false,
            timeout: false,
        }
    }
}

impl Transient for TransientError {
    fn is_temporary(&self) -> bool {
        self.temporary
    }

    fn is_timeout(&self) -> bool {
        self.timeout
    }
}

impl Transient for io::Error {
    fn is_temporary(&self) -> bool {
        matches!(
            self.kind(),
            io::ErrorKind::TimedOut
                | io::ErrorKind::WouldBlock
                | io::ErrorKind::Interrupted
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
        )
    }

    fn is_timeout(&self) -> bool {
        self.kind() == io::ErrorKind::TimedOut
    }
}

/// View an error through the [`Transient`] capability
///
/// Walks the error and its `source()` chain and returns the first link
/// that supports classification, or `None` when no link does.
pub fn as_transient<'a>(error: &'a (dyn StdError + 'static)) -> Option<&'a dyn Transient> {
    let mut current = Some(error);

    while let Some(err) = current {
        if let Some(classified) = err.downcast_ref::<TransientError>() {
            return Some(classified);
        }
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            // io::Error may wrap a classified custom error
            if let Some(inner) = io_err.get_ref().and_then(|inner| inner.downcast_ref::<TransientError>()) {
                return Some(inner);
            }
            return Some(io_err);
        }
        current = err.source();
    }

    None
}

/// Whether the error is classified as temporary; `false` when unclassified
pub fn is_temporary(error: &(dyn StdError + 'static)) -> bool {
    as_transient(error).is_some_and(Transient::is_temporary)
}

/// Whether the error is classified as a timeout; `false` when unclassified
pub fn is_timeout(error: &(dyn StdError + 'static)) -> bool {
    as_transient(error).is_some_and(Transient::is_timeout)
}
