//! Page-scoped block lookup.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::model::{Block, BlockKind, KeyValueRole};

/// Id → block lookup restricted to one page.
///
/// Built once per page; every extractor resolves relationship ids through
/// it instead of scanning the block list.
#[derive(Debug, Clone)]
pub struct BlockIndex<'a> {
    page: u32,
    by_id: HashMap<&'a str, &'a Block>,
    order: Vec<&'a Block>,
}

impl<'a> BlockIndex<'a> {
    /// Index the blocks tagged with `page`.
    ///
    /// Blocks on other pages are ignored. A repeated id on this page is a
    /// data-integrity error.
    pub fn for_page<I>(blocks: I, page: u32) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Block>,
    {
        let mut by_id = HashMap::new();
        let mut order = Vec::new();

        for block in blocks.into_iter().filter(|b| b.page == page) {
            if by_id.insert(block.id.as_str(), block).is_some() {
                return Err(Error::DuplicateId {
                    id: block.id.clone(),
                    page,
                });
            }
            order.push(block);
        }

        Ok(Self { page, by_id, order })
    }

    /// Page this index covers.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Look up a block by id.
    pub fn get(&self, id: &str) -> Option<&'a Block> {
        self.by_id.get(id).copied()
    }

    /// Look up a block by id, failing with `BrokenReference` when absent.
    pub fn resolve(&self, id: &str) -> Result<&'a Block> {
        self.get(id)
            .ok_or_else(|| Error::broken_reference(id, self.page))
    }

    /// Blocks in source listing order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Block> + '_ {
        self.order.iter().copied()
    }

    /// Number of indexed blocks.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the page has no blocks.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Everything the extractors need about one page, classified once.
#[derive(Debug, Clone)]
pub struct PageContext<'a> {
    index: BlockIndex<'a>,
    lines: Vec<&'a Block>,
    keys: Vec<&'a Block>,
    tables: Vec<&'a Block>,
    structural: Vec<&'a Block>,
}

impl<'a> PageContext<'a> {
    /// Build the context for one page of a block list.
    pub fn build<I>(blocks: I, page: u32) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Block>,
    {
        Ok(Self::new(BlockIndex::for_page(blocks, page)?))
    }

    /// Classify the blocks of an existing index.
    pub fn new(index: BlockIndex<'a>) -> Self {
        let mut lines = Vec::new();
        let mut keys = Vec::new();
        let mut tables = Vec::new();
        let mut structural = Vec::new();

        for block in index.iter() {
            match block.kind {
                BlockKind::Line { .. } => lines.push(block),
                BlockKind::KeyValueSet {
                    role: KeyValueRole::Key,
                } => keys.push(block),
                BlockKind::Table => tables.push(block),
                _ => {}
            }
            if block.is_structural() {
                structural.push(block);
            }
        }

        Self {
            index,
            lines,
            keys,
            tables,
            structural,
        }
    }

    /// Page number.
    pub fn page(&self) -> u32 {
        self.index.page()
    }

    /// The page's block index.
    pub fn index(&self) -> &BlockIndex<'a> {
        &self.index
    }

    /// LINE blocks in listing order.
    pub fn lines(&self) -> &[&'a Block] {
        &self.lines
    }

    /// Key-role blocks in listing order.
    pub fn keys(&self) -> &[&'a Block] {
        &self.keys
    }

    /// TABLE blocks in listing order.
    pub fn tables(&self) -> &[&'a Block] {
        &self.tables
    }

    /// Key/value, table, cell and selection blocks in listing order.
    pub fn structural(&self) -> &[&'a Block] {
        &self.structural
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;

    fn bbox() -> BoundingBox {
        BoundingBox::new(0.1, 0.1, 0.1, 0.1)
    }

    #[test]
    fn test_index_filters_page() {
        let blocks = vec![
            Block::word("w1", "one", 1, bbox()),
            Block::word("w2", "two", 2, bbox()),
            Block::word("w3", "three", 1, bbox()),
        ];

        let index = BlockIndex::for_page(&blocks, 1).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.get("w2").is_none());
        let ids: Vec<_> = index.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["w1", "w3"]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let blocks = vec![
            Block::word("w1", "one", 1, bbox()),
            Block::word("w1", "again", 1, bbox()),
        ];

        let err = BlockIndex::for_page(&blocks, 1).unwrap_err();
        assert!(
            matches!(err, Error::DuplicateId { ref id, page: 1 } if id == "w1")
        );
    }

    #[test]
    fn test_same_id_on_other_page_is_ignored() {
        let blocks = vec![
            Block::word("w1", "one", 1, bbox()),
            Block::word("w1", "two", 2, bbox()),
        ];
        assert!(BlockIndex::for_page(&blocks, 1).is_ok());
    }

    #[test]
    fn test_resolve_missing_is_broken_reference() {
        let blocks = vec![Block::word("w1", "one", 3, bbox())];
        let index = BlockIndex::for_page(&blocks, 3).unwrap();

        assert!(index.resolve("w1").is_ok());
        let err = index.resolve("nope").unwrap_err();
        assert!(matches!(err, Error::BrokenReference { page: 3, .. }));
    }

    #[test]
    fn test_context_classification() {
        let blocks = vec![
            Block::line("l1", "Name", 1, bbox()),
            Block::key("k1", 1, bbox()),
            Block::value("v1", 1, bbox()),
            Block::table("t1", 1, bbox()),
            Block::cell("c1", 1, 1, 1, bbox()),
            Block::word("w1", "Name", 1, bbox()),
        ];

        let ctx = PageContext::build(&blocks, 1).unwrap();
        assert_eq!(ctx.lines().len(), 1);
        assert_eq!(ctx.keys().len(), 1);
        assert_eq!(ctx.tables().len(), 1);
        assert_eq!(ctx.structural().len(), 4);
        assert_eq!(ctx.page(), 1);
    }
}
