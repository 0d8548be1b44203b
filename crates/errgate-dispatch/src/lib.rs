//! Centralized translation of handler failures into responses
//!
//! A [`Dispatcher`] wraps one handler; a [`Registry`] holds every
//! dispatcher the server exposes and turns them into an `axum::Router`.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod dispatch;
mod registry;

pub use dispatch::{DispatchOptions, Dispatcher, Endpoint, ErrorReply, HandlerError};
pub use registry::{Registry, RegistryBuilder, RegistryError};
