//! Record lookup handlers built on the errgate error model
//!
//! [`ShowRecord`] reports failures as structured errors with fixed client
//! messages; [`RawRecord`] uses bare errors and lets the dispatcher pick the
//! status. Storage and rendering sit behind [`RecordStore`] and [`Renderer`].

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod handler;
mod render;
mod store;

pub use error::{RecordError, StoreError};
pub use handler::{RawRecord, RecordsState, ShowRecord, register};
pub use render::{HtmlRenderer, JsonRenderer, Renderer};
pub use store::{FileStore, MemoryStore, Record, RecordStore};
