//! Reconstructed page content.

use super::TableMatrix;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key text → value text for one band.
///
/// Keys are rendered text, not block ids; a later key with the same text
/// replaces an earlier one.
pub type KeyValueMap = BTreeMap<String, String>;

/// One anchor line with the structures attached to its band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEntry {
    /// Text of the anchor line
    pub line_text: String,

    /// Key/value pairs whose value falls in the line's band
    pub key_values: KeyValueMap,

    /// Tables in the line's band, in source order; `None` when there are none
    pub tables: Option<Vec<TableMatrix>>,
}

impl ContentEntry {
    /// Create an entry with no attached structures.
    pub fn new(line_text: impl Into<String>) -> Self {
        Self {
            line_text: line_text.into(),
            key_values: KeyValueMap::new(),
            tables: None,
        }
    }

    /// Number of attached tables.
    pub fn table_count(&self) -> usize {
        self.tables.as_ref().map_or(0, Vec::len)
    }

    /// Iterate attached tables.
    pub fn tables(&self) -> impl Iterator<Item = &TableMatrix> {
        self.tables.iter().flatten()
    }
}

/// Ordered content of a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    /// Page number (1-indexed)
    pub page: u32,

    /// Entries in anchor-line order
    pub content: Vec<ContentEntry>,
}

impl PageContent {
    /// Create an empty page.
    pub fn new(page: u32) -> Self {
        Self {
            page,
            content: Vec::new(),
        }
    }

    /// Check if the page has no entries.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Number of anchor lines.
    pub fn line_count(&self) -> usize {
        self.content.len()
    }

    /// Total key/value pairs across all entries.
    pub fn key_value_count(&self) -> usize {
        self.content.iter().map(|e| e.key_values.len()).sum()
    }

    /// Total tables across all entries.
    pub fn table_count(&self) -> usize {
        self.content.iter().map(ContentEntry::table_count).sum()
    }

    /// Get plain text content of the page.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(|e| e.line_text.trim_end())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
