//! # blockdoc
//!
//! Reconstructs reading-ordered content from document-analysis output.
//!
//! Analysis engines return a flat graph of typed blocks (pages, lines,
//! words, form fields, tables, cells, checkboxes) joined by id-based
//! relationships. This library turns that graph into one ordered list per
//! page: each free-standing text line, with the key/value pairs and tables
//! that sit between it and the next line attached to it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use blockdoc::{parse_file, render};
//!
//! fn main() -> blockdoc::Result<()> {
//!     let doc = parse_file("analysis.json")?;
//!
//!     for page in &doc.pages {
//!         for entry in &page.content {
//!             println!("{} ({} fields)", entry.line_text, entry.key_values.len());
//!         }
//!     }
//!
//!     let markdown = render::to_markdown(&doc, &render::RenderOptions::default())?;
//!     println!("{}", markdown);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Ordered reconstruction**: lines, key/value pairs and tables per page
//! - **Multiple output formats**: JSON, Markdown, plain text
//! - **Paginated input**: merges responses split across `NextToken` pages
//! - **Parallel processing**: Uses Rayon for multi-page documents
//! - **Job pipeline**: notification → fetch → reconstruct → upload → record

pub mod detect;
pub mod error;
pub mod job;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, InputFormat};
pub use error::{Error, Result};
pub use model::{
    AnalysisResult, Block, BlockKind, BoundingBox, ContentEntry, Document, KeyValueMap, Metadata,
    PageContent, TableMatrix,
};
pub use parser::{AnalysisParser, ErrorMode, KeyValuePolicy, PageLinearizer, ParseOptions};
pub use render::{CleanupOptions, CleanupPreset, JsonFormat, PageSelection, RenderOptions};

use std::io::Read;
use std::path::Path;

/// Parse an analysis output file and reconstruct every page.
///
/// # Example
///
/// ```no_run
/// use blockdoc::parse_file;
///
/// let doc = parse_file("analysis.json").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let parser = AnalysisParser::open(path)?;
    parser.parse()
}

/// Parse an analysis output file with custom options.
///
/// # Example
///
/// ```no_run
/// use blockdoc::{parse_file_with_options, ParseOptions};
///
/// let options = ParseOptions::new()
///     .lenient()
///     .exclude_table_key_values();
/// let doc = parse_file_with_options("analysis.json", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Document> {
    let parser = AnalysisParser::open_with_options(path, options)?;
    parser.parse()
}

/// Parse analysis output from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    let parser = AnalysisParser::from_bytes(data)?;
    parser.parse()
}

/// Parse analysis output from bytes with custom options.
pub fn parse_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Document> {
    let parser = AnalysisParser::from_bytes_with_options(data, options)?;
    parser.parse()
}

/// Parse analysis output from a reader.
///
/// # Example
///
/// ```no_run
/// use blockdoc::parse_reader;
/// use std::fs::File;
///
/// let file = File::open("analysis.json").unwrap();
/// let doc = parse_reader(file).unwrap();
/// ```
pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
    let parser = AnalysisParser::from_reader(reader)?;
    parser.parse()
}

/// Parse analysis output from a reader with custom options.
pub fn parse_reader_with_options<R: Read>(reader: R, options: ParseOptions) -> Result<Document> {
    let parser = AnalysisParser::from_reader_with_options(reader, options)?;
    parser.parse()
}

/// Extract the anchor line text of every page.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = parse_file(path)?;
    Ok(doc.plain_text())
}

/// Convert an analysis output file to Markdown.
///
/// # Example
///
/// ```no_run
/// use blockdoc::to_markdown;
///
/// let markdown = to_markdown("analysis.json").unwrap();
/// std::fs::write("output.md", markdown).unwrap();
/// ```
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = parse_file(path)?;
    let options = RenderOptions::default();
    render::to_markdown(&doc, &options)
}

/// Convert an analysis output file to Markdown with custom options.
pub fn to_markdown_with_options<P: AsRef<Path>>(
    path: P,
    options: &RenderOptions,
) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_markdown(&doc, options)
}

/// Convert an analysis output file to plain text.
///
/// # Example
///
/// ```no_run
/// use blockdoc::{to_text, RenderOptions, CleanupPreset};
///
/// let options = RenderOptions::new()
///     .with_cleanup_preset(CleanupPreset::Standard);
/// let text = to_text("analysis.json", &options).unwrap();
/// ```
pub fn to_text<P: AsRef<Path>>(path: P, options: &RenderOptions) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_text(&doc, options)
}

/// Convert an analysis output file to the per-page JSON list.
///
/// # Example
///
/// ```no_run
/// use blockdoc::{to_json, JsonFormat};
///
/// let json = to_json("analysis.json", JsonFormat::Pretty).unwrap();
/// std::fs::write("pages.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = parse_file(path)?;
    render::pages_to_json(&doc.pages, format)
}

/// Builder for parsing and rendering analysis output.
///
/// # Example
///
/// ```no_run
/// use blockdoc::{Blockdoc, CleanupPreset};
///
/// let markdown = Blockdoc::new()
///     .lenient()
///     .exclude_table_key_values()
///     .with_frontmatter()
///     .with_cleanup(CleanupPreset::Standard)
///     .parse("analysis.json")?
///     .to_markdown()?;
/// # Ok::<(), blockdoc::Error>(())
/// ```
pub struct Blockdoc {
    parse_options: ParseOptions,
    render_options: RenderOptions,
}

impl Blockdoc {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Enable lenient parsing mode.
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parse_options = self.parse_options.sequential();
        self
    }

    /// Drop key/value pairs whose value sits inside a table.
    pub fn exclude_table_key_values(mut self) -> Self {
        self.parse_options = self.parse_options.exclude_table_key_values();
        self
    }

    /// Set the key/value policy.
    pub fn with_key_value_policy(mut self, policy: KeyValuePolicy) -> Self {
        self.parse_options = self.parse_options.with_key_value_policy(policy);
        self
    }

    /// Enable frontmatter in output.
    pub fn with_frontmatter(mut self) -> Self {
        self.render_options = self.render_options.with_frontmatter(true);
        self
    }

    /// Set cleanup preset.
    pub fn with_cleanup(mut self, preset: CleanupPreset) -> Self {
        self.render_options = self.render_options.with_cleanup_preset(preset);
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.parse_options = self.parse_options.with_pages(pages.clone());
        self.render_options = self.render_options.with_pages(pages);
        self
    }

    /// Parse an analysis output file.
    pub fn parse<P: AsRef<Path>>(self, path: P) -> Result<BlockdocResult> {
        let parser = AnalysisParser::open_with_options(path, self.parse_options)?;
        let document = parser.parse()?;
        Ok(BlockdocResult {
            document,
            render_options: self.render_options,
        })
    }

    /// Parse analysis output from bytes.
    pub fn parse_bytes(self, data: &[u8]) -> Result<BlockdocResult> {
        let parser = AnalysisParser::from_bytes_with_options(data, self.parse_options)?;
        let document = parser.parse()?;
        Ok(BlockdocResult {
            document,
            render_options: self.render_options,
        })
    }
}

impl Default for Blockdoc {
    fn default() -> Self {
        Self::new()
    }
}

/// A reconstructed document plus the render options chosen on the builder.
pub struct BlockdocResult {
    /// The reconstructed document
    pub document: Document,
    render_options: RenderOptions,
}

impl BlockdocResult {
    /// Convert to Markdown.
    pub fn to_markdown(&self) -> Result<String> {
        render::to_markdown(&self.document, &self.render_options)
    }

    /// Convert to plain text.
    pub fn to_text(&self) -> Result<String> {
        render::to_text(&self.document, &self.render_options)
    }

    /// Convert the whole document, metadata included, to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Convert to the per-page JSON list.
    pub fn to_pages_json(&self, format: JsonFormat) -> Result<String> {
        render::pages_to_json(&self.document.pages, format)
    }

    /// Get anchor line text without cleanup.
    pub fn plain_text(&self) -> String {
        self.document.plain_text()
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = br#"{
        "DocumentMetadata": {"Pages": 1},
        "Blocks": [
            {"BlockType": "LINE", "Id": "l1", "Page": 1, "Text": "Header",
             "Geometry": {"BoundingBox": {"Top": 0.1, "Left": 0.1, "Width": 0.5, "Height": 0.05}}},
            {"BlockType": "LINE", "Id": "l2", "Page": 1, "Text": "Footer",
             "Geometry": {"BoundingBox": {"Top": 0.8, "Left": 0.1, "Width": 0.5, "Height": 0.05}}}
        ]
    }"#;

    #[test]
    fn test_blockdoc_builder() {
        let builder = Blockdoc::new()
            .lenient()
            .exclude_table_key_values()
            .with_frontmatter()
            .with_cleanup(CleanupPreset::Standard);

        assert_eq!(builder.parse_options.error_mode, ErrorMode::Lenient);
        assert_eq!(
            builder.parse_options.key_value_policy,
            KeyValuePolicy::ExcludeInTables
        );
        assert!(builder.render_options.include_frontmatter);
        assert!(builder.render_options.cleanup.is_some());
    }

    #[test]
    fn test_blockdoc_builder_with_pages() {
        let builder = Blockdoc::new()
            .sequential()
            .with_pages(PageSelection::Range(1..=5));
        assert!(!builder.parse_options.parallel);
        assert_eq!(builder.parse_options.pages, PageSelection::Range(1..=5));
        assert_eq!(
            builder.render_options.page_selection,
            PageSelection::Range(1..=5)
        );
    }

    #[test]
    fn test_parse_bytes() {
        let doc = parse_bytes(SAMPLE).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.plain_text(), "Header\nFooter");
    }

    #[test]
    fn test_builder_outputs() {
        let result = Blockdoc::new().parse_bytes(SAMPLE).unwrap();
        assert_eq!(result.to_text().unwrap(), "Header\n\nFooter");
        assert!(result.to_markdown().unwrap().starts_with("Header"));

        let pages = result.to_pages_json(JsonFormat::Compact).unwrap();
        assert!(pages.starts_with(r#"[{"page":1,"content":[{"line_text":"Header""#));
    }

    // ==================== Edge Case Tests ====================

    #[test]
    fn test_parse_bytes_empty_data() {
        assert!(parse_bytes(b"").is_err());
    }

    #[test]
    fn test_parse_bytes_not_json() {
        assert!(matches!(parse_bytes(b"%PDF-1.7"), Err(Error::Json(_))));
    }

    #[test]
    fn test_parse_bytes_notification_event() {
        let result = parse_bytes(br#"{"Records": []}"#);
        assert!(matches!(result, Err(Error::UnknownFormat(_))));
    }

    #[test]
    fn test_parse_bytes_without_blocks_is_empty() {
        let doc = parse_bytes(br#"{"Blocks": []}"#).unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.metadata.page_count, 0);
    }
}
