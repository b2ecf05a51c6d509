//! Markdown rendering for reconstructed documents.

use crate::error::Result;
use crate::model::{ContentEntry, Document, KeyValueMap, PageContent, TableMatrix};

use super::{CleanupPipeline, ExtractionStats, RenderOptions, RenderResult};

/// Convert a document to Markdown.
pub fn to_markdown(doc: &Document, options: &RenderOptions) -> Result<String> {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render(doc)
}

/// Convert a document to Markdown with statistics.
pub fn to_markdown_with_stats(doc: &Document, options: &RenderOptions) -> Result<RenderResult> {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render_with_stats(doc)
}

/// Markdown renderer.
///
/// Each entry renders as its line text in a paragraph, followed by the
/// attached key/value pairs as a bullet list and the attached tables as
/// pipe tables whose first row is the header.
pub struct MarkdownRenderer {
    options: RenderOptions,
    stats: ExtractionStats,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            stats: ExtractionStats::new(),
        }
    }

    /// Render a document to Markdown.
    pub fn render(mut self, doc: &Document) -> Result<String> {
        self.render_internal(doc)
    }

    /// Render a document to Markdown with extraction statistics.
    pub fn render_with_stats(mut self, doc: &Document) -> Result<RenderResult> {
        self.options.collect_stats = true;
        let content = self.render_internal(doc)?;

        // Count words and characters in final content
        self.stats.count_text(&content);

        Ok(RenderResult::new(content, doc.metadata.clone(), self.stats))
    }

    fn render_internal(&mut self, doc: &Document) -> Result<String> {
        let mut output = String::new();

        if self.options.include_frontmatter {
            output.push_str(&doc.metadata.to_yaml_frontmatter());
            output.push('\n');
        }

        for page in &doc.pages {
            if self.options.page_selection.includes(page.page) {
                self.render_page(&mut output, page);
            }
        }

        if let Some(ref cleanup_options) = self.options.cleanup {
            let pipeline = CleanupPipeline::new(cleanup_options.clone());
            output = pipeline.process(&output);
        }

        Ok(output.trim().to_string())
    }

    fn render_page(&mut self, output: &mut String, page: &PageContent) {
        if self.options.collect_stats {
            self.stats.add_page();
        }
        for entry in &page.content {
            self.render_entry(output, entry);
        }
    }

    fn render_entry(&mut self, output: &mut String, entry: &ContentEntry) {
        let line = entry.line_text.trim();
        if !line.is_empty() {
            if self.options.collect_stats {
                self.stats.add_line();
            }
            output.push_str(&self.escape(line));
            output.push_str("\n\n");
        }

        if self.options.include_key_values && !entry.key_values.is_empty() {
            self.render_key_values(output, &entry.key_values);
        }

        if self.options.include_tables {
            for table in entry.tables() {
                if self.options.collect_stats {
                    self.stats.add_table();
                }
                self.render_table(output, table);
            }
        }
    }

    fn render_key_values(&mut self, output: &mut String, pairs: &KeyValueMap) {
        for (key, value) in pairs {
            if self.options.collect_stats {
                self.stats.add_key_value();
            }
            output.push_str("- **");
            output.push_str(&self.escape(key.trim()));
            output.push_str("**: ");
            output.push_str(&self.escape(value.trim()));
            output.push('\n');
        }
        output.push('\n');
    }

    fn render_table(&self, output: &mut String, table: &TableMatrix) {
        let col_count = table.column_count();
        if col_count == 0 {
            return;
        }

        for (i, row) in table.rows.iter().enumerate() {
            output.push('|');
            for col in 0..col_count {
                let content = row
                    .get(col)
                    .map(|cell| cell.trim().replace('\n', " "))
                    .unwrap_or_default();
                output.push(' ');
                output.push_str(&self.escape(&content));
                output.push_str(" |");
            }
            output.push('\n');

            // Separator after header row
            if i == 0 {
                output.push('|');
                for _ in 0..col_count {
                    output.push_str(" --- |");
                }
                output.push('\n');
            }
        }

        output.push('\n');
    }

    fn escape(&self, text: &str) -> String {
        if self.options.escape_special_chars {
            escape_markdown(text)
        } else {
            text.to_string()
        }
    }
}

/// Escape special Markdown characters.
/// Only escape characters that could be misinterpreted as Markdown syntax.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}
