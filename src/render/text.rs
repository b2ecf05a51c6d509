//! Plain text rendering.

use crate::error::Result;
use crate::model::{ContentEntry, Document};

use super::{CleanupPipeline, RenderOptions};

/// Convert a document to plain text.
///
/// Each entry is its line text, then one `key: value` line per pair, then
/// each table as tab-separated rows. Entries are separated by a blank line.
pub fn to_text(doc: &Document, options: &RenderOptions) -> Result<String> {
    let mut blocks = Vec::new();

    for page in &doc.pages {
        if !options.page_selection.includes(page.page) {
            continue;
        }
        for entry in &page.content {
            let block = render_entry(entry, options);
            if !block.is_empty() {
                blocks.push(block);
            }
        }
    }

    let mut output = blocks.join("\n\n");

    if let Some(ref cleanup_options) = options.cleanup {
        let pipeline = CleanupPipeline::new(cleanup_options.clone());
        output = pipeline.process(&output);
    }

    Ok(output.trim().to_string())
}

fn render_entry(entry: &ContentEntry, options: &RenderOptions) -> String {
    let mut lines = Vec::new();

    let line = entry.line_text.trim();
    if !line.is_empty() {
        lines.push(line.to_string());
    }

    if options.include_key_values {
        for (key, value) in &entry.key_values {
            lines.push(format!("{}: {}", key.trim(), value.trim()));
        }
    }

    if options.include_tables {
        for table in entry.tables() {
            lines.push(table.plain_text());
        }
    }

    lines.join("\n")
}
