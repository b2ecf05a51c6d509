//! Rendering result with metadata and statistics.

use crate::model::{Metadata, PageContent};
use serde::{Deserialize, Serialize};

/// Result of rendering a document, including content and statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    /// The rendered content (Markdown, text, etc.)
    pub content: String,

    /// Document metadata (copied from source document)
    pub metadata: Metadata,

    /// Extraction statistics
    pub stats: ExtractionStats,
}

impl RenderResult {
    /// Create a new render result.
    pub fn new(content: String, metadata: Metadata, stats: ExtractionStats) -> Self {
        Self {
            content,
            metadata,
            stats,
        }
    }

    /// Create a simple result with just content.
    pub fn content_only(content: String) -> Self {
        Self {
            content,
            metadata: Metadata::default(),
            stats: ExtractionStats::default(),
        }
    }

    /// Get the content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Statistics collected while rendering reconstructed content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages rendered
    pub page_count: u32,

    /// Anchor lines rendered
    pub line_count: u32,

    /// Key/value pairs rendered
    pub key_value_count: u32,

    /// Tables rendered
    pub table_count: u32,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: u32,

    /// Character count (excluding whitespace)
    pub char_count: u32,
}

impl ExtractionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment page count.
    pub fn add_page(&mut self) {
        self.page_count += 1;
    }

    /// Increment line count.
    pub fn add_line(&mut self) {
        self.line_count += 1;
    }

    /// Increment key/value count.
    pub fn add_key_value(&mut self) {
        self.key_value_count += 1;
    }

    /// Increment table count.
    pub fn add_table(&mut self) {
        self.table_count += 1;
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count() as u32;
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }

    /// Statistics of a whole page, independent of any renderer.
    pub fn from_page(page: &PageContent) -> Self {
        let mut stats = Self::new();
        stats.add_page();
        for entry in &page.content {
            stats.add_line();
            stats.count_text(&entry.line_text);
            for (key, value) in &entry.key_values {
                stats.add_key_value();
                stats.count_text(key);
                stats.count_text(value);
            }
            for table in entry.tables() {
                stats.add_table();
                for cell in table.rows.iter().flatten() {
                    stats.count_text(cell);
                }
            }
        }
        stats
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.page_count += other.page_count;
        self.line_count += other.line_count;
        self.key_value_count += other.key_value_count;
        self.table_count += other.table_count;
        self.word_count += other.word_count;
        self.char_count += other.char_count;
    }
}
