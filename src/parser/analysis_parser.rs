//! Document parser over decoded analysis output.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use rayon::prelude::*;

use crate::detect::decode_responses;
use crate::error::{Error, Result};
use crate::model::{AnalysisResult, Block, Document, Metadata, PageContent};

use super::linearize::PageLinearizer;
use super::options::{ErrorMode, ParseOptions};
use super::PageContext;

/// Reconstructs ordered page content from analysis output.
pub struct AnalysisParser {
    result: AnalysisResult,
    source: Option<String>,
    options: ParseOptions,
}

impl AnalysisParser {
    /// Open an analysis output file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open an analysis output file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let mut parser = Self::from_bytes_with_options(&data, options)?;
        parser.source = Some(path.display().to_string());
        Ok(parser)
    }

    /// Parse analysis output from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse analysis output from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        let responses = decode_responses(data)?;
        let result = AnalysisResult::from_responses(responses)?;
        Ok(Self::from_result_with_options(result, options))
    }

    /// Parse analysis output from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Parse analysis output from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(mut reader: R, options: ParseOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Wrap an already decoded result.
    pub fn from_result(result: AnalysisResult) -> Self {
        Self::from_result_with_options(result, ParseOptions::default())
    }

    /// Wrap an already decoded result with custom options.
    pub fn from_result_with_options(result: AnalysisResult, options: ParseOptions) -> Self {
        Self {
            result,
            source: None,
            options,
        }
    }

    /// Set the source name recorded in the document metadata.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Reconstruct every selected page.
    ///
    /// Pages come out in ascending order whether or not they were processed
    /// in parallel.
    pub fn parse(&self) -> Result<Document> {
        let mut document = Document::new();
        document.metadata = self.metadata();

        let groups = self.group_by_page();
        let selected: Vec<u32> = (1..=self.result.total_pages)
            .filter(|&page| self.options.pages.includes(page))
            .collect();

        let linearizer = PageLinearizer::new(self.options.key_value_policy);
        let run = |page: u32| {
            let blocks = groups.get(&page).map(Vec::as_slice).unwrap_or(&[]);
            (page, reconstruct(&linearizer, blocks, page))
        };

        let outcomes: Vec<(u32, Result<PageContent>)> = if self.options.parallel {
            selected.par_iter().map(|&page| run(page)).collect()
        } else {
            selected.iter().map(|&page| run(page)).collect()
        };

        for (page_num, outcome) in outcomes {
            match outcome {
                Ok(page) => document.add_page(page),
                Err(e) => {
                    if self.options.error_mode == ErrorMode::Strict {
                        return Err(e);
                    }
                    log::warn!("Skipping page {}: {}", page_num, e);
                }
            }
        }

        Ok(document)
    }

    /// Reconstruct a single page (1-indexed).
    pub fn parse_page(&self, page_num: u32) -> Result<PageContent> {
        let total = self.result.total_pages;
        if page_num == 0 || page_num > total {
            return Err(Error::PageOutOfRange(page_num, total));
        }

        let linearizer = PageLinearizer::new(self.options.key_value_policy);
        let ctx = PageContext::build(self.result.blocks_on_page(page_num), page_num)?;
        linearizer.linearize(&ctx)
    }

    /// Document metadata derived from the analysis result.
    pub fn metadata(&self) -> Metadata {
        Metadata {
            source: self.source.clone(),
            page_count: self.result.total_pages,
            block_count: self.result.block_count(),
            model_version: self.result.model_version.clone(),
            job_status: self.result.job_status.clone(),
        }
    }

    /// The decoded analysis result.
    pub fn result(&self) -> &AnalysisResult {
        &self.result
    }

    /// Get the number of pages in the analysed document.
    pub fn page_count(&self) -> u32 {
        self.result.total_pages
    }

    /// The options in use.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    fn group_by_page(&self) -> HashMap<u32, Vec<&Block>> {
        let mut groups: HashMap<u32, Vec<&Block>> = HashMap::new();
        for block in &self.result.blocks {
            groups.entry(block.page).or_default().push(block);
        }
        groups
    }
}

fn reconstruct(linearizer: &PageLinearizer, blocks: &[&Block], page: u32) -> Result<PageContent> {
    let ctx = PageContext::build(blocks.iter().copied(), page)?;
    linearizer.linearize(&ctx)
}
