//! Record store for processed documents.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Table processed documents are recorded in unless configured otherwise.
pub const DEFAULT_TABLE: &str = "pdf-to-json";

/// One processed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Record key; the source object name
    pub id: String,
    /// `bucket/object` path of the source document
    pub file_path: String,
    /// Reconstructed pages
    pub content: serde_json::Value,
    /// When the record was written
    pub created_at: DateTime<Utc>,
}

impl Record {
    /// Create a record stamped with the current time.
    pub fn new(
        id: impl Into<String>,
        file_path: impl Into<String>,
        content: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            file_path: file_path.into(),
            content,
            created_at: Utc::now(),
        }
    }
}

/// Keyed storage for [`Record`]s.
pub trait RecordStore {
    /// Insert or replace a record in `table`.
    fn put(&self, table: &str, record: &Record) -> Result<()>;
}

/// Make a table name safe for stores with restrictive naming rules.
///
/// Spaces, parentheses, `&` and `:` become `-`, commas become spaces, `/`
/// becomes `--`, `#` becomes `No` and `"` becomes `Inch`. Names of three
/// characters or fewer get a `-xxxx` suffix.
pub fn sanitize_table_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            ' ' | '(' | ')' | '&' | ':' => out.push('-'),
            ',' => out.push(' '),
            '/' => out.push_str("--"),
            '#' => out.push_str("No"),
            '"' => out.push_str("Inch"),
            _ => out.push(c),
        }
    }
    if out.chars().count() <= 3 {
        out.push_str("-xxxx");
    }
    out
}

/// Stores records as JSON files at `<root>/<table>/<encoded id>.json`.
///
/// Table names are sanitized with [`sanitize_table_name`]; record ids are
/// percent-encoded so any object name maps to a single file.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    root: PathBuf,
}

impl FileRecordStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that holds the record `id` of `table`.
    pub fn record_path(&self, table: &str, id: &str) -> PathBuf {
        self.root
            .join(sanitize_table_name(table))
            .join(format!("{}.json", encode_id(id)))
    }

    /// Read a record back, if present.
    pub fn get(&self, table: &str, id: &str) -> Result<Option<Record>> {
        let path = self.record_path(table, id);
        if !path.exists() {
            return Ok(None);
        }
        let record = serde_json::from_slice(&fs::read(&path)?)?;
        Ok(Some(record))
    }
}

impl RecordStore for FileRecordStore {
    fn put(&self, table: &str, record: &Record) -> Result<()> {
        if record.id.is_empty() {
            return Err(Error::Storage("record id must not be empty".into()));
        }

        let path = self.record_path(table, &record.id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_vec(record)?)?;
        log::debug!("Stored record '{}' at {}", record.id, path.display());
        Ok(())
    }
}

fn encode_id(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for byte in id.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    // "." and ".." are not usable as file stems
    if out.chars().all(|c| c == '.') {
        out = out.replace('.', "%2E");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_table_name() {
        assert_eq!(sanitize_table_name("pdf-to-json"), "pdf-to-json");
        assert_eq!(sanitize_table_name("W2 (2024) & more"), "W2--2024----more");
        assert_eq!(sanitize_table_name("a,b:c/d"), "a b-c--d");
        assert_eq!(sanitize_table_name("#5 12\""), "No5-12Inch");
        assert_eq!(sanitize_table_name("ab"), "ab-xxxx");
        assert_eq!(sanitize_table_name("a/b"), "a--b");
        assert_eq!(sanitize_table_name("#"), "No-xxxx");
    }

    #[test]
    fn test_encode_id() {
        assert_eq!(encode_id("forms/W2 final.pdf"), "forms%2FW2%20final.pdf");
        assert_eq!(encode_id(".."), "%2E%2E");
    }

    #[test]
    fn test_put_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRecordStore::new(dir.path());
        let record = Record::new(
            "scans/form.pdf",
            "inbox/scans/form.pdf",
            serde_json::json!([{"page": 1, "content": []}]),
        );

        store.put("forms", &record).unwrap();
        assert!(dir.path().join("forms/scans%2Fform.pdf.json").is_file());

        let loaded = store.get("forms", "scans/form.pdf").unwrap().unwrap();
        assert_eq!(loaded, record);
        assert!(store.get("forms", "other.pdf").unwrap().is_none());
    }

    #[test]
    fn test_put_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRecordStore::new(dir.path());

        let first = Record::new("a", "b/a", serde_json::json!(1));
        store.put(DEFAULT_TABLE, &first).unwrap();
        let second = Record::new("a", "b/a", serde_json::json!(2));
        store.put(DEFAULT_TABLE, &second).unwrap();

        let loaded = store.get(DEFAULT_TABLE, "a").unwrap().unwrap();
        assert_eq!(loaded.content, serde_json::json!(2));
    }
}
