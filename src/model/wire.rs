//! Wire format of the analysis engine's JSON responses.
//!
//! Responses use PascalCase keys (`BlockType`, `Geometry`, `Relationships`).
//! Some exported documents spell identifiers in lowercase (`id`, `ids`), so
//! both spellings are accepted. Decoding into [`Block`] happens in
//! [`RawBlock::into_block`], which enforces the per-type required fields.

use super::{
    Block, BlockKind, BoundingBox, KeyValueRole, Relationship, RelationshipKind, SelectionStatus,
};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// One page of a (possibly paginated) analysis response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnalysisResponse {
    /// Document-level metadata; only present on some pages of a paginated job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_metadata: Option<DocumentMetadata>,

    /// Job status for asynchronous jobs (`IN_PROGRESS`, `SUCCEEDED`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_status: Option<String>,

    /// Continuation token for the next page of blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,

    /// Human-readable status detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,

    /// Model version that produced the blocks
    #[serde(
        default,
        rename = "AnalyzeDocumentModelVersion",
        skip_serializing_if = "Option::is_none"
    )]
    pub model_version: Option<String>,

    /// Blocks in this page of the response
    #[serde(default)]
    pub blocks: Vec<RawBlock>,
}

/// Document-level metadata.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DocumentMetadata {
    /// Total number of pages in the source document
    pub pages: u32,
}

/// Geometry wrapper; only the axis-aligned box is used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawGeometry {
    #[serde(default)]
    pub bounding_box: Option<RawBoundingBox>,
}

/// Axis-aligned box as sent on the wire.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawBoundingBox {
    pub width: f64,
    pub height: f64,
    pub left: f64,
    pub top: f64,
}

impl From<RawBoundingBox> for BoundingBox {
    fn from(raw: RawBoundingBox) -> Self {
        BoundingBox::new(raw.top, raw.left, raw.width, raw.height)
    }
}

/// A relationship as sent on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRelationship {
    #[serde(rename = "Type")]
    pub kind: String,

    #[serde(rename = "Ids", alias = "ids", default)]
    pub ids: Vec<String>,
}

/// A block as sent on the wire, before type checking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawBlock {
    pub block_type: String,

    #[serde(rename = "Id", alias = "id")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<RawGeometry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_index: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_index: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_types: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Vec<RawRelationship>>,
}

impl RawBlock {
    /// Type-check and convert into a [`Block`].
    ///
    /// Returns `Ok(None)` for block types outside the supported set; those
    /// are skipped rather than rejected.
    pub fn into_block(self) -> Result<Option<Block>> {
        let kind = match self.block_type.as_str() {
            "PAGE" => BlockKind::Page,
            "LINE" => BlockKind::Line {
                text: self.text.clone(),
            },
            "WORD" => BlockKind::Word {
                text: self
                    .text
                    .clone()
                    .ok_or_else(|| Error::malformed(&self.id, "WORD without Text"))?,
            },
            "KEY_VALUE_SET" | "KEY" | "VALUE" => BlockKind::KeyValueSet {
                role: self.key_value_role()?,
            },
            "SELECTION_ELEMENT" => BlockKind::SelectionElement {
                status: self.selection_status()?,
            },
            "TABLE" => BlockKind::Table,
            "CELL" => match (self.row_index, self.column_index) {
                (Some(row_index), Some(column_index)) if row_index > 0 && column_index > 0 => {
                    BlockKind::Cell {
                        row_index,
                        column_index,
                    }
                }
                (Some(_), Some(_)) => {
                    return Err(Error::malformed(&self.id, "CELL indices must be 1-based"))
                }
                _ => {
                    return Err(Error::malformed(&self.id, "CELL without RowIndex/ColumnIndex"))
                }
            },
            other => {
                log::debug!("Skipping block '{}' of unsupported type {}", self.id, other);
                return Ok(None);
            }
        };

        let bounding_box = self
            .geometry
            .as_ref()
            .and_then(|g| g.bounding_box)
            .ok_or_else(|| Error::malformed(&self.id, "missing Geometry.BoundingBox"))?;

        let page = match self.page {
            Some(0) => return Err(Error::malformed(&self.id, "page numbers are 1-based")),
            Some(page) => page,
            None => 1,
        };

        let relationships = self
            .relationships
            .unwrap_or_default()
            .into_iter()
            .filter_map(|raw| {
                let kind = match raw.kind.as_str() {
                    "CHILD" => RelationshipKind::Child,
                    "VALUE" => RelationshipKind::Value,
                    other => {
                        log::debug!("Dropping {} relationship on block '{}'", other, self.id);
                        return None;
                    }
                };
                Some(Relationship { kind, ids: raw.ids })
            })
            .collect();

        Ok(Some(Block {
            id: self.id,
            kind,
            page,
            bounding_box: bounding_box.into(),
            relationships,
        }))
    }

    fn key_value_role(&self) -> Result<KeyValueRole> {
        let entity_types = self.entity_types.as_deref().unwrap_or_default();
        let is_key = entity_types.iter().any(|t| t == "KEY");
        let is_value = entity_types.iter().any(|t| t == "VALUE");

        match (is_key, is_value, self.block_type.as_str()) {
            (true, true, _) => {
                Err(Error::malformed(&self.id, "EntityTypes has both KEY and VALUE"))
            }
            (true, false, _) => Ok(KeyValueRole::Key),
            (false, true, _) => Ok(KeyValueRole::Value),
            (false, false, "KEY") => Ok(KeyValueRole::Key),
            (false, false, "VALUE") => Ok(KeyValueRole::Value),
            (false, false, _) => {
                Err(Error::malformed(&self.id, "KEY_VALUE_SET without KEY or VALUE entity type"))
            }
        }
    }

    fn selection_status(&self) -> Result<SelectionStatus> {
        match self.selection_status.as_deref() {
            Some("SELECTED") => Ok(SelectionStatus::Selected),
            Some("NOT_SELECTED") => Ok(SelectionStatus::NotSelected),
            Some(other) => {
                Err(Error::malformed(&self.id, format!("unknown SelectionStatus {}", other)))
            }
            None => Err(Error::malformed(&self.id, "SELECTION_ELEMENT without SelectionStatus")),
        }
    }
}
