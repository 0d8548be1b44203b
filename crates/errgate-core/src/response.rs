use axum::body::Body;
use axum::response::{IntoResponse, Response};
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use serde::Serialize;

/// Writable response target handed to handlers
///
/// Buffers status, headers and body until the dispatcher is done with the
/// request. Every mutation is counted so callers can tell whether anything
/// was written at all.
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
    writes: usize,
}

impl ResponseWriter {
    /// Create an untouched response
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the response status
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
        self.writes += 1;
    }

    /// Insert a header, replacing any previous value
    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
        self.writes += 1;
    }

    /// Append bytes to the body
    pub fn write(&mut self, bytes: impl AsRef<[u8]>) {
        self.body.extend_from_slice(bytes.as_ref());
        self.writes += 1;
    }

    /// Replace the body with `value` serialized as JSON
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized; the response is
    /// left unchanged in that case
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        self.headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = body;
        self.writes += 1;
        Ok(())
    }

    /// Discard everything written so far and write a plain-text failure
    ///
    /// Leaves exactly one status and one body on the response.
    pub fn fail(&mut self, status: StatusCode, message: &str) {
        *self = Self::new();
        self.set_status(status);
        self.headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
        self.write(message);
    }

    /// Status that will be sent, `200 OK` unless set
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    /// Headers written so far
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Body written so far
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Number of write operations performed
    pub const fn writes(&self) -> usize {
        self.writes
    }

    /// Whether nothing has been written yet
    pub const fn is_untouched(&self) -> bool {
        self.writes == 0
    }
}

impl IntoResponse for ResponseWriter {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        response
    }
}
