use thiserror::Error;

/// Retry configuration errors
#[derive(Debug, Error)]
pub enum RetryError {
    /// Configuration error
    #[error("retry configuration error: {0}")]
    Config(String),
}
