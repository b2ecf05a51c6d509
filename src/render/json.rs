//! JSON rendering.
//!
//! [`to_json`] serializes the whole [`Document`], metadata included.
//! [`pages_to_json`] produces the bare per-page list that downstream
//! consumers of job output expect:
//!
//! ```text
//! [{"page": 1, "content": [{"line_text": "...", "key_values": {...}, "tables": null}]}]
//! ```

use crate::error::{Error, Result};
use crate::model::{Document, PageContent};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

fn serialize<T: serde::Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Convert a document to JSON.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    serialize(doc, format)
}

/// Convert reconstructed pages to the per-page JSON list.
pub fn pages_to_json(pages: &[PageContent], format: JsonFormat) -> Result<String> {
    serialize(pages, format)
}
