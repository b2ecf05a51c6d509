//! Decoded analysis output for a whole document.

use super::wire::AnalysisResponse;
use super::Block;
use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// All blocks of one analysis job, merged across response pages.
#[derive(Debug, Clone, Default)]
pub struct AnalysisResult {
    /// Blocks in source listing order
    pub blocks: Vec<Block>,

    /// Number of pages in the analysed document
    pub total_pages: u32,

    /// Model version reported by the engine
    pub model_version: Option<String>,

    /// Final job status, for asynchronous jobs
    pub job_status: Option<String>,
}

impl AnalysisResult {
    /// Create a result from already-typed blocks.
    ///
    /// The page count is the highest page number seen on any block.
    pub fn new(blocks: Vec<Block>) -> Self {
        let total_pages = blocks.iter().map(|b| b.page).max().unwrap_or(0);
        Self {
            blocks,
            total_pages,
            model_version: None,
            job_status: None,
        }
    }

    /// Decode and merge the pages of a paginated response.
    ///
    /// Blocks are concatenated in response order. Document metadata comes
    /// from the first response that carries it.
    pub fn from_responses(responses: Vec<AnalysisResponse>) -> Result<Self> {
        if responses.is_empty() {
            return Err(Error::UnknownFormat("no analysis responses".into()));
        }

        let mut declared_pages = None;
        let mut model_version = None;
        let mut job_status = None;
        let mut blocks = Vec::new();
        let mut skipped = 0usize;

        for response in responses {
            if declared_pages.is_none() {
                declared_pages = response.document_metadata.map(|m| m.pages);
            }
            if model_version.is_none() {
                model_version = response.model_version;
            }
            if job_status.is_none() {
                job_status = response.job_status;
            }

            blocks.reserve(response.blocks.len());
            for raw in response.blocks {
                match raw.into_block()? {
                    Some(block) => blocks.push(block),
                    None => skipped += 1,
                }
            }
        }

        if skipped > 0 {
            log::debug!("Skipped {} blocks of unsupported types", skipped);
        }

        let seen_pages = blocks.iter().map(|b| b.page).max().unwrap_or(0);
        let total_pages = declared_pages.unwrap_or(seen_pages);
        if seen_pages > total_pages {
            log::warn!(
                "Blocks reference page {} but document metadata declares {} pages",
                seen_pages,
                total_pages
            );
        }

        Ok(Self {
            blocks,
            total_pages,
            model_version,
            job_status,
        })
    }

    /// Blocks tagged with the given page, in listing order.
    pub fn blocks_on_page(&self, page: u32) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(move |b| b.page == page)
    }

    /// Count of blocks per block type name.
    pub fn block_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for block in &self.blocks {
            *counts.entry(block.kind.name()).or_insert(0) += 1;
        }
        counts
    }

    /// Total number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the result holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
