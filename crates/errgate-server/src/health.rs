use errgate_core::{BoxError, Handler, ResponseWriter, handler_fn};
use errgate_dispatch::Dispatcher;
use serde_json::json;

/// Health check endpoint reporting status and version
pub fn endpoint() -> Dispatcher<impl Handler<BoxError>, BoxError> {
    Dispatcher::bare(handler_fn(|_ctx, _request| async {
        let mut response = ResponseWriter::new();
        response.json(&json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))?;
        Ok::<_, BoxError>(response)
    }))
}
