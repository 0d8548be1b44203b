use errgate_core::BoxError;

use crate::store::Record;

/// Turns a record into response body text
pub trait Renderer: Send + Sync + 'static {
    /// Content type of the rendered output
    fn content_type(&self) -> &'static str;

    /// Render `record`
    fn render(&self, record: &Record) -> Result<String, BoxError>;
}

/// Renders records as pretty-printed JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn render(&self, record: &Record) -> Result<String, BoxError> {
        Ok(serde_json::to_string_pretty(record)?)
    }
}

/// Renders records as a minimal HTML page
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn content_type(&self) -> &'static str {
        "text/html; charset=utf-8"
    }

    fn render(&self, record: &Record) -> Result<String, BoxError> {
        Ok(format!(
            "<article id=\"{}\"><h1>{}</h1><p>{}</p></article>",
            escape(&record.id),
            escape(&record.title),
            escape(&record.body)
        ))
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
