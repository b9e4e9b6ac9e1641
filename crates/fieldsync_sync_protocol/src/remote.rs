//! Wire types of the remote document service.
//!
//! A remote document is a named set of text files. The snapshot of a
//! module is the content of one of them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One file of a remote document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// File content. Absent when the service omits it.
    #[serde(default)]
    pub content: Option<String>,
}

impl RemoteFile {
    /// Creates a file with content.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
        }
    }
}

/// A remote document as returned by a fetch.
///
/// Fields other than `files` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDocument {
    /// Files by name.
    #[serde(default)]
    pub files: BTreeMap<String, RemoteFile>,
}

impl RemoteDocument {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file.
    #[must_use]
    pub fn with_file(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(name.into(), RemoteFile::new(content));
        self
    }

    /// Returns the content of a file, if the file exists and has content.
    #[must_use]
    pub fn content(&self, name: &str) -> Option<&str> {
        self.files.get(name).and_then(|f| f.content.as_deref())
    }

    /// Applies an update the way the service does: named files are
    /// overwritten, other files are kept.
    pub fn apply(&mut self, update: &DocumentUpdate) {
        for (name, file) in &update.files {
            self.files.insert(name.clone(), file.clone());
        }
    }
}

/// Body of an overwrite request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUpdate {
    /// Document description.
    pub description: String,
    /// Files to overwrite.
    pub files: BTreeMap<String, RemoteFile>,
}

impl DocumentUpdate {
    /// Creates an update overwriting one file.
    pub fn single(description: impl Into<String>, file_name: impl Into<String>, content: impl Into<String>) -> Self {
        let mut files = BTreeMap::new();
        files.insert(file_name.into(), RemoteFile::new(content));
        Self {
            description: description.into(),
            files,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_ignores_unknown_fields() {
        let body = json!({
            "id": "abc",
            "description": "whatever",
            "files": {
                "sales_data.json": {"filename": "sales_data.json", "content": "{}"},
                "empty.txt": {"filename": "empty.txt"}
            }
        });

        let doc: RemoteDocument = serde_json::from_value(body).unwrap();
        assert_eq!(doc.content("sales_data.json"), Some("{}"));
        assert_eq!(doc.content("empty.txt"), None);
        assert_eq!(doc.content("missing.json"), None);
    }

    #[test]
    fn update_body_shape() {
        let update = DocumentUpdate::single("fieldsync sales data", "sales_data.json", "{}");
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(
            body,
            json!({
                "description": "fieldsync sales data",
                "files": {"sales_data.json": {"content": "{}"}}
            })
        );
    }

    #[test]
    fn apply_keeps_other_files() {
        let mut doc = RemoteDocument::new()
            .with_file("sales_data.json", "old")
            .with_file("notes.md", "keep");

        doc.apply(&DocumentUpdate::single("d", "sales_data.json", "new"));

        assert_eq!(doc.content("sales_data.json"), Some("new"));
        assert_eq!(doc.content("notes.md"), Some("keep"));
    }
}
