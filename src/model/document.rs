//! Document-level types.

use super::PageContent;
use serde::{Deserialize, Serialize};

/// A reconstructed document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata
    pub metadata: Metadata,

    /// Reconstructed pages, ascending by page number
    pub pages: Vec<PageContent>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of reconstructed pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_num: u32) -> Option<&PageContent> {
        self.pages.iter().find(|p| p.page == page_num)
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: PageContent) {
        self.pages.push(page);
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.plain_text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Source file or object name
    pub source: Option<String>,

    /// Total number of pages in the analysed document
    pub page_count: u32,

    /// Number of decoded blocks
    pub block_count: usize,

    /// Model version reported by the engine
    pub model_version: Option<String>,

    /// Final job status, for asynchronous jobs
    pub job_status: Option<String>,
}

impl Metadata {
    /// Convert metadata to YAML frontmatter format.
    pub fn to_yaml_frontmatter(&self) -> String {
        let mut lines = vec!["---".to_string()];

        if let Some(ref source) = self.source {
            lines.push(format!("source: \"{}\"", escape_yaml(source)));
        }
        lines.push(format!("pages: {}", self.page_count));
        lines.push(format!("blocks: {}", self.block_count));
        if let Some(ref version) = self.model_version {
            lines.push(format!("model_version: \"{}\"", escape_yaml(version)));
        }
        if let Some(ref status) = self.job_status {
            lines.push(format!("job_status: \"{}\"", escape_yaml(status)));
        }

        lines.push("---".to_string());
        lines.push(String::new());

        lines.join("\n")
    }
}

/// Escape special characters for YAML strings.
fn escape_yaml(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
