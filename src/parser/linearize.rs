//! Page linearization.
//!
//! A page becomes a sequence of entries, one per anchor line. An anchor is
//! a LINE that is not part of any form field, table or checkbox. Each
//! anchor owns the vertical band from its own top down to the bottom of
//! the next anchor (the last anchor's band runs to the page end), and the
//! key/value pairs and tables found in that band are attached to it.

use std::collections::{HashSet, VecDeque};

use crate::error::Result;
use crate::model::{Band, Block, ContentEntry, PageContent};

use super::key_value::{key_value_pairs, select_in_band};
use super::options::KeyValuePolicy;
use super::tables::{table_boxes_in_band, tables_in_band};
use super::text::line_text;
use super::PageContext;

/// An anchor LINE and its text.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorLine<'a> {
    /// The LINE block
    pub block: &'a Block,
    /// Its text
    pub text: String,
}

/// Ids owned by structural blocks.
///
/// Starts from every key/value, table, cell and selection block and follows
/// all relationships transitively. Ids that do not resolve on the page are
/// still recorded, but cannot be expanded further.
pub fn consumed_ids<'a>(ctx: &PageContext<'a>) -> HashSet<&'a str> {
    let index = ctx.index();
    let mut consumed: HashSet<&'a str> = HashSet::new();
    let mut queue: VecDeque<&'a Block> = VecDeque::new();

    for block in ctx.structural() {
        if consumed.insert(block.id.as_str()) {
            queue.push_back(block);
        }
    }

    while let Some(block) = queue.pop_front() {
        for id in block.all_related_ids() {
            if consumed.insert(id) {
                if let Some(target) = index.get(id) {
                    queue.push_back(target);
                }
            }
        }
    }

    consumed
}

/// LINE blocks whose own id and child ids are all unconsumed, in listing
/// order.
pub fn anchor_lines<'a>(ctx: &PageContext<'a>) -> Result<Vec<AnchorLine<'a>>> {
    let consumed = consumed_ids(ctx);

    ctx.lines()
        .iter()
        .copied()
        .filter(|line| {
            !consumed.contains(line.id.as_str())
                && line.all_related_ids().all(|id| !consumed.contains(id))
        })
        .map(|line| {
            Ok(AnchorLine {
                block: line,
                text: line_text(line, ctx.index())?,
            })
        })
        .collect()
}

/// Bands for a sequence of anchors.
///
/// Anchor `i` spans from its own top to the bottom of anchor `i + 1`; the
/// last anchor spans to the bottom of the page.
pub fn bands(anchors: &[AnchorLine<'_>]) -> Vec<Band> {
    anchors
        .iter()
        .enumerate()
        .map(|(i, anchor)| {
            let top = anchor.block.bounding_box.top;
            match anchors.get(i + 1) {
                Some(next) => Band::new(top, next.block.bounding_box.bottom()),
                None => Band::to_page_end(top),
            }
        })
        .collect()
}

/// Reconstructs one page into ordered content.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageLinearizer {
    policy: KeyValuePolicy,
}

impl PageLinearizer {
    /// Create a linearizer with the given key/value policy.
    pub fn new(policy: KeyValuePolicy) -> Self {
        Self { policy }
    }

    /// The key/value policy in use.
    pub fn policy(&self) -> KeyValuePolicy {
        self.policy
    }

    /// Linearize a page.
    ///
    /// A page without anchor lines yields an empty page, and in that case
    /// key/value pairs are never resolved.
    pub fn linearize(&self, ctx: &PageContext<'_>) -> Result<PageContent> {
        let mut page = PageContent::new(ctx.page());

        let anchors = anchor_lines(ctx)?;
        if anchors.is_empty() {
            log::debug!("Page {}: no anchor lines", ctx.page());
            return Ok(page);
        }

        let pairs = key_value_pairs(ctx)?;

        for (anchor, band) in anchors.iter().zip(bands(&anchors)) {
            let key_values = match self.policy {
                KeyValuePolicy::Plain => select_in_band(&pairs, band, None),
                KeyValuePolicy::ExcludeInTables => {
                    let boxes = table_boxes_in_band(ctx, band);
                    select_in_band(&pairs, band, Some(&boxes))
                }
            };

            let tables = tables_in_band(ctx, band)?;

            page.content.push(ContentEntry {
                line_text: anchor.text.clone(),
                key_values,
                tables: if tables.is_empty() { None } else { Some(tables) },
            });
        }

        log::debug!(
            "Page {}: {} anchors, {} key/value pairs, {} tables",
            ctx.page(),
            page.line_count(),
            page.key_value_count(),
            page.table_count()
        );

        Ok(page)
    }
}

/// Reconstruct a single page from a block list.
pub fn reconstruct_page<'a, I>(blocks: I, page: u32, policy: KeyValuePolicy) -> Result<PageContent>
where
    I: IntoIterator<Item = &'a Block>,
{
    let ctx = PageContext::build(blocks, page)?;
    PageLinearizer::new(policy).linearize(&ctx)
}
