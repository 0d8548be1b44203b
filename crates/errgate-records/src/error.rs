use std::io;

use errgate_core::{BoxError, HttpError};
use http::StatusCode;
use thiserror::Error;

/// Failures raised by a [`crate::RecordStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists under the id
    #[error("record {id} not found")]
    NotFound { id: String },

    /// The backing storage could not be read
    #[error("failed to read record {id}")]
    Io {
        id: String,
        #[source]
        source: io::Error,
    },

    /// The stored data does not decode into a record
    #[error("record {id} is corrupt")]
    Corrupt {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors surfaced by the record handlers
#[derive(Debug, Error)]
pub enum RecordError {
    /// Looking the record up failed
    #[error(transparent)]
    Fetch(#[from] StoreError),

    /// The lookup outlived the request deadline
    #[error("record lookup exceeded the request deadline")]
    TimedOut,

    /// The record was loaded but could not be rendered
    #[error("render failed")]
    Render(#[source] BoxError),
}

impl HttpError for RecordError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Fetch(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Fetch(_) | Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::TimedOut => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Fetch(StoreError::NotFound { .. }) => "Record not found",
            Self::Fetch(_) => "Can't load record",
            Self::TimedOut => "Record lookup timed out",
            Self::Render(_) => "Can't display record",
        }
        .to_owned()
    }
}
