use http::StatusCode;
use thiserror::Error;

/// Uniform carrier for bare errors
///
/// Any `std::error::Error` converts into this with `?` or `.into()`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

const UNKNOWN: &str = "unknown error";

/// Error value built from a plain description
#[derive(Debug, Clone, Error)]
#[error("{description}")]
pub struct PlainError {
    description: String,
}

impl PlainError {
    /// Build an error from a description
    ///
    /// An empty description is replaced with `"unknown error"`.
    pub fn new(description: impl Into<String>) -> Self {
        let description = description.into();
        let description = if description.is_empty() {
            UNKNOWN.to_owned()
        } else {
            description
        };

        Self { description }
    }

    /// The description this error was built with
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl From<&str> for PlainError {
    fn from(description: &str) -> Self {
        Self::new(description)
    }
}

impl From<String> for PlainError {
    fn from(description: String) -> Self {
        Self::new(description)
    }
}

/// Trait for domain errors that can be converted to HTTP responses
///
/// Implemented by each feature crate's error type. The dispatch layer
/// turns these into responses through [`crate::StructuredError`],
/// keeping domain errors decoupled from axum.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Message safe to expose to API consumers
    fn client_message(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_is_the_input() {
        let err = PlainError::new("disk on fire");
        assert_eq!(err.to_string(), "disk on fire");
        assert_eq!(err.description(), "disk on fire");
    }

    #[test]
    fn empty_description_is_replaced() {
        assert_eq!(PlainError::new("").to_string(), "unknown error");
        assert_eq!(PlainError::from(String::new()).to_string(), "unknown error");
    }

    #[test]
    fn converts_into_box_error() {
        let boxed: BoxError = PlainError::from("bad input").into();
        assert_eq!(boxed.to_string(), "bad input");
        assert!(boxed.downcast_ref::<PlainError>().is_some());
    }
}
