//! Table reconstruction from TABLE and CELL blocks.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::model::{Band, Block, BlockKind, BoundingBox, RelationshipKind, TableMatrix};

use super::text::render_text;
use super::{BlockIndex, PageContext};

/// Build the matrix for one TABLE block.
///
/// Cells are grouped by row index, then column index, both ascending.
/// Rows keep only the columns that have a cell, so a sparse table yields
/// ragged rows. Children that are not CELL blocks are ignored.
pub fn build_matrix(table: &Block, index: &BlockIndex<'_>) -> Result<TableMatrix> {
    let mut grid: BTreeMap<u32, BTreeMap<u32, String>> = BTreeMap::new();

    for child_id in table.related_ids(RelationshipKind::Child) {
        let child = index.resolve(child_id)?;
        let BlockKind::Cell {
            row_index,
            column_index,
        } = child.kind
        else {
            continue;
        };

        let text = render_text(child, index)?;
        let row = grid.entry(row_index).or_default();
        if row.insert(column_index, text).is_some() {
            return Err(Error::malformed(
                &table.id,
                format!("two cells at row {row_index}, column {column_index}"),
            ));
        }
    }

    Ok(TableMatrix::from_rows(grid.into_values().map(|row| row.into_values())))
}

/// TABLE blocks on the page whose box falls in `band`, in listing order.
fn tables_in<'a, 'c>(ctx: &'c PageContext<'a>, band: Band) -> impl Iterator<Item = &'a Block> + 'c {
    ctx.tables()
        .iter()
        .copied()
        .filter(move |table| band.holds(&table.bounding_box))
}

/// Matrices of every table in `band`. Empty when there are none.
pub fn tables_in_band(ctx: &PageContext<'_>, band: Band) -> Result<Vec<TableMatrix>> {
    tables_in(ctx, band)
        .map(|table| build_matrix(table, ctx.index()))
        .collect()
}

/// Bounding boxes of every table in `band`.
pub fn table_boxes_in_band(ctx: &PageContext<'_>, band: Band) -> Vec<BoundingBox> {
    tables_in(ctx, band)
        .map(|table| table.bounding_box)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(top: f64, height: f64) -> BoundingBox {
        BoundingBox::new(top, 0.1, 0.8, height)
    }

    fn two_by_two(table_top: f64) -> Vec<Block> {
        let cell_box = bbox(table_top, 0.05);
        vec![
            Block::word("wa", "A", 1, cell_box),
            Block::word("wb", "B", 1, cell_box),
            Block::word("wc", "C", 1, cell_box),
            Block::word("wd", "D", 1, cell_box),
            // Cells listed out of order on purpose
            Block::cell("c22", 2, 2, 1, cell_box).with_children(["wd"]),
            Block::cell("c11", 1, 1, 1, cell_box).with_children(["wa"]),
            Block::cell("c21", 2, 1, 1, cell_box).with_children(["wc"]),
            Block::cell("c12", 1, 2, 1, cell_box).with_children(["wb"]),
            Block::table("t1", 1, bbox(table_top, 0.1))
                .with_children(["c22", "c11", "c21", "c12"]),
        ]
    }

    #[test]
    fn test_matrix_sorted_by_row_and_column() {
        let blocks = two_by_two(0.4);
        let ctx = PageContext::build(&blocks, 1).unwrap();

        let tables = tables_in_band(&ctx, Band::new(0.3, 0.6)).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(
            tables[0],
            TableMatrix::from_rows([["A ", "B "], ["C ", "D "]])
        );
    }

    #[test]
    fn test_table_outside_band() {
        let blocks = two_by_two(0.4);
        let ctx = PageContext::build(&blocks, 1).unwrap();

        let band = Band::new(0.0, 0.45);
        assert!(tables_in_band(&ctx, band).unwrap().is_empty());
        assert!(table_boxes_in_band(&ctx, band).is_empty());
    }

    #[test]
    fn test_table_boxes() {
        let blocks = two_by_two(0.4);
        let ctx = PageContext::build(&blocks, 1).unwrap();

        let boxes = table_boxes_in_band(&ctx, Band::to_page_end(0.0));
        assert_eq!(boxes, vec![bbox(0.4, 0.1)]);
    }

    #[test]
    fn test_sparse_table_is_ragged() {
        let b = bbox(0.1, 0.1);
        let blocks = vec![
            Block::cell("c11", 1, 1, 1, b),
            Block::cell("c13", 1, 3, 1, b),
            Block::cell("c21", 2, 1, 1, b),
            Block::table("t", 1, b).with_children(["c11", "c13", "c21"]),
        ];
        let index = BlockIndex::for_page(&blocks, 1).unwrap();

        let matrix = build_matrix(&blocks[3], &index).unwrap();
        assert_eq!(matrix.row_count(), 2);
        assert_eq!(matrix.rows[0].len(), 2);
        assert_eq!(matrix.rows[1].len(), 1);
        assert!(!matrix.is_rectangular());
    }

    #[test]
    fn test_non_cell_children_ignored() {
        let b = bbox(0.1, 0.1);
        let blocks = vec![
            Block::word("w", "stray", 1, b),
            Block::cell("c11", 1, 1, 1, b),
            Block::table("t", 1, b).with_children(["w", "c11"]),
        ];
        let index = BlockIndex::for_page(&blocks, 1).unwrap();

        let matrix = build_matrix(&blocks[2], &index).unwrap();
        assert_eq!(matrix, TableMatrix::from_rows([[""]]));
    }

    #[test]
    fn test_duplicate_cell_position_is_malformed() {
        let b = bbox(0.1, 0.1);
        let blocks = vec![
            Block::cell("c1", 1, 1, 1, b),
            Block::cell("c2", 1, 1, 1, b),
            Block::table("t", 1, b).with_children(["c1", "c2"]),
        ];
        let index = BlockIndex::for_page(&blocks, 1).unwrap();

        let err = build_matrix(&blocks[2], &index).unwrap_err();
        assert!(
            matches!(err, Error::MalformedBlock { ref id, .. } if id == "t")
        );
    }

    #[test]
    fn test_missing_cell_is_broken_reference() {
        let b = bbox(0.1, 0.1);
        let blocks = vec![Block::table("t", 1, b).with_children(["gone"])];
        let ctx = PageContext::build(&blocks, 1).unwrap();

        let err = tables_in_band(&ctx, Band::to_page_end(0.0)).unwrap_err();
        assert!(matches!(err, Error::BrokenReference { .. }));
    }
}
