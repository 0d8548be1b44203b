use std::path::PathBuf;

use serde::Deserialize;

/// Record store configuration
///
/// Without a directory the server starts with an empty in-memory store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordsConfig {
    /// Directory holding one `<id>.json` file per record
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// How `GET /records/{id}` renders a record
    #[serde(default)]
    pub format: RecordFormat,
}

/// Output format for rendered records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordFormat {
    #[default]
    Json,
    Html,
}
