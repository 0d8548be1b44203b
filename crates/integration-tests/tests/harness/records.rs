//! On-disk record fixtures

use std::path::Path;

use serde_json::json;
use tempfile::TempDir;

/// Temporary records directory, removed on drop
pub struct RecordDir {
    dir: TempDir,
}

impl RecordDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Store a well-formed record
    pub fn write(&self, id: &str, title: &str, body: &str) -> &Self {
        let record = json!({ "id": id, "title": title, "body": body });
        self.write_raw(id, &record.to_string())
    }

    /// Store arbitrary contents under `id`
    pub fn write_raw(&self, id: &str, contents: &str) -> &Self {
        std::fs::write(self.dir.path().join(format!("{id}.json")), contents).expect("write record");
        self
    }
}
