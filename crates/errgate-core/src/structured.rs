use std::collections::BTreeMap;

use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::error::{BoxError, HttpError};

const OFFSET: &str = "offset";

/// Error carrying a response status, a client-facing message and the root cause
///
/// `Display` yields the client-facing message only. The root cause stays
/// reachable through [`StructuredError::cause`] and `Error::source` so the
/// dispatcher can log it; it is never written to the client.
///
/// There is no empty or default value. A handler reports success with
/// `Ok(())`, so an unset structured error cannot stand in for "no error":
///
/// ```compile_fail
/// use errgate_core::StructuredError;
///
/// let unset = StructuredError::default();
/// ```
///
/// Declaring the error up front and only assigning it on the failure
/// branch does not compile either:
///
/// ```compile_fail
/// use errgate_core::StructuredError;
///
/// fn lookup(found: bool) -> Result<(), StructuredError> {
///     let err: StructuredError;
///     if !found {
///         err = StructuredError::not_found("no such row", "Record not found");
///     }
///     Err(err)
/// }
/// ```
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StructuredError {
    #[source]
    cause: BoxError,
    message: String,
    status: StatusCode,
    fields: BTreeMap<String, Value>,
}

impl StructuredError {
    /// Pair a root cause with a status and a client-facing message
    pub fn new(cause: impl Into<BoxError>, message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            cause: cause.into(),
            message: message.into(),
            status,
            fields: BTreeMap::new(),
        }
    }

    /// 404 with the given message
    pub fn not_found(cause: impl Into<BoxError>, message: impl Into<String>) -> Self {
        Self::new(cause, message, StatusCode::NOT_FOUND)
    }

    /// 400 with the given message
    pub fn bad_request(cause: impl Into<BoxError>, message: impl Into<String>) -> Self {
        Self::new(cause, message, StatusCode::BAD_REQUEST)
    }

    /// 500 with the given message
    pub fn internal(cause: impl Into<BoxError>, message: impl Into<String>) -> Self {
        Self::new(cause, message, StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Attach a structured field for programmatic inspection
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Attach the byte offset at which the failure was detected
    #[must_use]
    pub fn with_offset(self, offset: u64) -> Self {
        self.with_field(OFFSET, offset)
    }

    /// Response status
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Client-facing message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Root cause, kept for diagnostics
    pub fn cause(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.cause.as_ref()
    }

    /// Look up a structured field
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Byte offset, if one was attached
    pub fn offset(&self) -> Option<u64> {
        self.field(OFFSET).and_then(Value::as_u64)
    }

    /// All structured fields
    pub const fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Split into root cause, message and status
    pub fn into_parts(self) -> (BoxError, String, StatusCode) {
        (self.cause, self.message, self.status)
    }
}

impl<E> From<E> for StructuredError
where
    E: HttpError + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        let status = error.status_code();
        let message = error.client_message();
        Self::new(error, message, status)
    }
}

/// Turn an optionally recorded failure into a handler result
///
/// `None` becomes the explicit `Ok(())` sentinel.
pub fn into_result(slot: Option<StructuredError>) -> Result<(), StructuredError> {
    slot.map_or(Ok(()), Err)
}
