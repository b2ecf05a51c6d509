//! Typed analysis blocks.
//!
//! The analysis engine emits a flat list of blocks joined by id-based
//! relationships. Each block kind carries exactly the fields its type
//! requires, so a CELL without indices or a WORD without text cannot be
//! represented.

use super::BoundingBox;
use serde::{Deserialize, Serialize};

/// Which side of a key/value pair a `KeyValueSet` block represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyValueRole {
    /// The label side ("Name:")
    Key,
    /// The content side ("Alice")
    Value,
}

/// Whether a checkbox or radio button is marked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStatus {
    Selected,
    NotSelected,
}

/// Relationship edge type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    /// Structural containment (LINE → WORD, TABLE → CELL, ...)
    Child,
    /// Key → value link, only present on key blocks
    Value,
}

/// An ordered, typed edge set from one block to others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub kind: RelationshipKind,
    pub ids: Vec<String>,
}

impl Relationship {
    /// Create a relationship of the given kind.
    pub fn new<S: Into<String>>(kind: RelationshipKind, ids: impl IntoIterator<Item = S>) -> Self {
        Self {
            kind,
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a `Child` relationship.
    pub fn child<S: Into<String>>(ids: impl IntoIterator<Item = S>) -> Self {
        Self::new(RelationshipKind::Child, ids)
    }

    /// Create a `Value` relationship.
    pub fn value<S: Into<String>>(ids: impl IntoIterator<Item = S>) -> Self {
        Self::new(RelationshipKind::Value, ids)
    }
}

/// Block type with its type-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    /// Page container
    Page,
    /// A line of text; the text may be absent and is then rendered from words
    Line { text: Option<String> },
    /// A single recognised word
    Word { text: String },
    /// One side of a form field
    KeyValueSet { role: KeyValueRole },
    /// A checkbox or radio button
    SelectionElement { status: SelectionStatus },
    /// A table container
    Table,
    /// A table cell, 1-based indices
    Cell { row_index: u32, column_index: u32 },
}

impl BlockKind {
    /// Short uppercase name matching the engine's block type.
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Page => "PAGE",
            BlockKind::Line { .. } => "LINE",
            BlockKind::Word { .. } => "WORD",
            BlockKind::KeyValueSet { .. } => "KEY_VALUE_SET",
            BlockKind::SelectionElement { .. } => "SELECTION_ELEMENT",
            BlockKind::Table => "TABLE",
            BlockKind::Cell { .. } => "CELL",
        }
    }
}

/// A node in the analysis output graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Unique id across the whole document
    pub id: String,

    /// Block type and payload
    pub kind: BlockKind,

    /// Page number (1-indexed)
    pub page: u32,

    /// Page-relative bounding box
    pub bounding_box: BoundingBox,

    /// Outgoing relationships, in source order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
}

impl Block {
    /// Create a block with no relationships.
    pub fn new(
        id: impl Into<String>,
        kind: BlockKind,
        page: u32,
        bounding_box: BoundingBox,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            page,
            bounding_box,
            relationships: Vec::new(),
        }
    }

    /// Create a LINE block with literal text.
    pub fn line(
        id: impl Into<String>,
        text: impl Into<String>,
        page: u32,
        bbox: BoundingBox,
    ) -> Self {
        Self::new(
            id,
            BlockKind::Line {
                text: Some(text.into()),
            },
            page,
            bbox,
        )
    }

    /// Create a WORD block.
    pub fn word(
        id: impl Into<String>,
        text: impl Into<String>,
        page: u32,
        bbox: BoundingBox,
    ) -> Self {
        Self::new(id, BlockKind::Word { text: text.into() }, page, bbox)
    }

    /// Create a key-role `KeyValueSet` block.
    pub fn key(id: impl Into<String>, page: u32, bbox: BoundingBox) -> Self {
        Self::new(
            id,
            BlockKind::KeyValueSet {
                role: KeyValueRole::Key,
            },
            page,
            bbox,
        )
    }

    /// Create a value-role `KeyValueSet` block.
    pub fn value(id: impl Into<String>, page: u32, bbox: BoundingBox) -> Self {
        Self::new(
            id,
            BlockKind::KeyValueSet {
                role: KeyValueRole::Value,
            },
            page,
            bbox,
        )
    }

    /// Create a SELECTION_ELEMENT block.
    pub fn selection(
        id: impl Into<String>,
        status: SelectionStatus,
        page: u32,
        bbox: BoundingBox,
    ) -> Self {
        Self::new(id, BlockKind::SelectionElement { status }, page, bbox)
    }

    /// Create a TABLE block.
    pub fn table(id: impl Into<String>, page: u32, bbox: BoundingBox) -> Self {
        Self::new(id, BlockKind::Table, page, bbox)
    }

    /// Create a CELL block.
    pub fn cell(
        id: impl Into<String>,
        row_index: u32,
        column_index: u32,
        page: u32,
        bbox: BoundingBox,
    ) -> Self {
        Self::new(
            id,
            BlockKind::Cell {
                row_index,
                column_index,
            },
            page,
            bbox,
        )
    }

    /// Append a relationship and return self.
    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Append a `Child` relationship and return self.
    pub fn with_children<S: Into<String>>(self, ids: impl IntoIterator<Item = S>) -> Self {
        self.with_relationship(Relationship::child(ids))
    }

    /// Append a `Value` relationship and return self.
    pub fn with_values<S: Into<String>>(self, ids: impl IntoIterator<Item = S>) -> Self {
        self.with_relationship(Relationship::value(ids))
    }

    /// Ids of all relationships of the given kind, in order.
    pub fn related_ids(&self, kind: RelationshipKind) -> impl Iterator<Item = &str> {
        self.relationships
            .iter()
            .filter(move |r| r.kind == kind)
            .flat_map(|r| r.ids.iter().map(String::as_str))
    }

    /// Ids of every relationship regardless of kind.
    pub fn all_related_ids(&self) -> impl Iterator<Item = &str> {
        self.relationships
            .iter()
            .flat_map(|r| r.ids.iter().map(String::as_str))
    }

    /// Key/value role, if this is a `KeyValueSet` block.
    pub fn key_value_role(&self) -> Option<KeyValueRole> {
        match self.kind {
            BlockKind::KeyValueSet { role } => Some(role),
            _ => None,
        }
    }

    /// Whether this block belongs to a key/value or table substructure.
    pub fn is_structural(&self) -> bool {
        matches!(
            self.kind,
            BlockKind::KeyValueSet { .. }
                | BlockKind::Table
                | BlockKind::Cell { .. }
                | BlockKind::SelectionElement { .. }
        )
    }
}
