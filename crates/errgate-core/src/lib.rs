//! Shared error model and handler contract for errgate
//!
//! Everything a request handler needs to report failure lives here: the
//! bare [`BoxError`] carrier, the [`StructuredError`] that pairs a root
//! cause with a status and a client-safe message, and the optional
//! [`Transient`] refinement used by retrying callers.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod context;
mod error;
mod handler;
mod response;
mod structured;
pub mod transient;

pub use context::RequestContext;
pub use error::{BoxError, HttpError, PlainError};
pub use handler::{Handler, HandlerFn, Request, handler_fn};
pub use response::ResponseWriter;
pub use structured::{StructuredError, into_result};
pub use transient::{Transient, TransientError, as_transient};
