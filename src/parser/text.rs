//! Visible text of a block, rendered from its child words.

use crate::error::Result;
use crate::model::{Block, BlockKind, RelationshipKind, SelectionStatus};

use super::BlockIndex;

/// Token emitted for a selected checkbox.
pub const SELECTED_MARK: &str = "X";

/// Render the text of a block by walking its `Child` relationships.
///
/// Each WORD contributes its text plus one space, each selected
/// SELECTION_ELEMENT contributes `"X "`, and every other child is ignored.
/// Children are taken in relationship order. The trailing space is kept.
pub fn render_text(block: &Block, index: &BlockIndex<'_>) -> Result<String> {
    let mut text = String::new();

    for child_id in block.related_ids(RelationshipKind::Child) {
        let child = index.resolve(child_id)?;
        match &child.kind {
            BlockKind::Word { text: word } => {
                text.push_str(word);
                text.push(' ');
            }
            BlockKind::SelectionElement {
                status: SelectionStatus::Selected,
            } => {
                text.push_str(SELECTED_MARK);
                text.push(' ');
            }
            _ => {}
        }
    }

    Ok(text)
}

/// Text of a LINE block: its own text when present, else its rendered words.
pub fn line_text(line: &Block, index: &BlockIndex<'_>) -> Result<String> {
    match &line.kind {
        BlockKind::Line { text: Some(text) } => Ok(text.clone()),
        _ => render_text(line, index),
    }
}
