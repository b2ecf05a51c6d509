//! Key/value pairing.

use crate::error::{Error, Result};
use crate::model::geometry::contains;
use crate::model::{Band, Block, BoundingBox, KeyValueMap, KeyValueRole, RelationshipKind};

use super::text::render_text;
use super::{BlockIndex, PageContext};

/// A key paired with its value, both rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValuePair<'a> {
    /// Id of the key block
    pub key_id: &'a str,
    /// Rendered key text
    pub key: String,
    /// Rendered value text
    pub value: String,
    /// Box of the value block; band filtering uses this, not the key's box
    pub value_box: BoundingBox,
}

/// Resolve the value block paired with a key.
///
/// When the `Value` relationship names several value blocks the last one
/// wins. Ids that resolve to blocks other than value-role key/value sets
/// are not counted. An id that does not resolve is a broken reference; a
/// key with no value-role target at all is malformed.
pub fn resolve_value<'a>(key: &Block, index: &BlockIndex<'a>) -> Result<&'a Block> {
    let mut found = None;
    let mut resolved = 0usize;
    let mut wrong_target = None;

    for value_id in key.related_ids(RelationshipKind::Value) {
        let target = index.resolve(value_id)?;
        if target.key_value_role() == Some(KeyValueRole::Value) {
            found = Some(target);
            resolved += 1;
        } else {
            log::debug!(
                "Key '{}' links to {} block '{}'; ignoring",
                key.id,
                target.kind.name(),
                value_id
            );
            wrong_target.get_or_insert(target);
        }
    }

    if resolved > 1 {
        log::warn!(
            "Key '{}' on page {} links to {} values; keeping the last",
            key.id,
            index.page(),
            resolved
        );
    }

    found.ok_or_else(|| match wrong_target {
        Some(target) => Error::malformed(
            &key.id,
            format!(
                "value relationship targets {} block '{}', not a value",
                target.kind.name(),
                target.id
            ),
        ),
        None => Error::malformed(&key.id, "key has no value relationship"),
    })
}

/// Pair every key on the page with its value and render both sides.
///
/// A key whose value cannot be resolved fails the whole page.
pub fn key_value_pairs<'a>(ctx: &PageContext<'a>) -> Result<Vec<KeyValuePair<'a>>> {
    let index = ctx.index();
    ctx.keys()
        .iter()
        .map(|key| {
            let value = resolve_value(key, index)?;
            Ok(KeyValuePair {
                key_id: key.id.as_str(),
                key: render_text(key, index)?,
                value: render_text(value, index)?,
                value_box: value.bounding_box,
            })
        })
        .collect()
}

/// Select the pairs whose value falls in `band`.
///
/// With `exclude`, a pair whose value box lies fully inside any excluded
/// box is dropped; partial overlap keeps the pair. Later keys with the same
/// text overwrite earlier ones.
pub fn select_in_band(
    pairs: &[KeyValuePair<'_>],
    band: Band,
    exclude: Option<&[BoundingBox]>,
) -> KeyValueMap {
    let mut map = KeyValueMap::new();
    for pair in pairs {
        if !band.holds(&pair.value_box) {
            continue;
        }
        if let Some(boxes) = exclude {
            if boxes.iter().any(|outer| contains(&pair.value_box, outer)) {
                continue;
            }
        }
        map.insert(pair.key.clone(), pair.value.clone());
    }
    map
}

/// Key/value pairs whose value falls in `band`, optionally excluding those
/// inside the given table boxes.
pub fn key_values_in_band(
    ctx: &PageContext<'_>,
    band: Band,
    exclude: Option<&[BoundingBox]>,
) -> Result<KeyValueMap> {
    let pairs = key_value_pairs(ctx)?;
    Ok(select_in_band(&pairs, band, exclude))
}
