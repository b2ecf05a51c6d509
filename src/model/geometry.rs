//! Normalized page geometry.
//!
//! All coordinates are fractions of the page size in `[0, 1]`, with the
//! origin at the top-left corner. Every predicate here uses closed
//! intervals: boxes touching a boundary are inside it.

use serde::{Deserialize, Serialize};

/// An axis-aligned, page-relative bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Distance from the top edge of the page
    pub top: f64,
    /// Distance from the left edge of the page
    pub left: f64,
    /// Box width
    pub width: f64,
    /// Box height
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// Bottom edge (`top + height`).
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Right edge (`left + width`).
    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// A vertical interval on one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    /// Upper edge
    pub top: f64,
    /// Lower edge
    pub bottom: f64,
}

impl Band {
    /// Create a band between two vertical positions.
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    /// Band running from `top` to the bottom of the page.
    pub fn to_page_end(top: f64) -> Self {
        Self { top, bottom: 1.0 }
    }

    /// Check whether a box falls inside this band.
    pub fn holds(&self, bbox: &BoundingBox) -> bool {
        in_band(bbox, self.top, self.bottom)
    }
}

/// Full containment: `inner` lies entirely inside `outer`.
///
/// Overlap alone is not containment.
pub fn contains(inner: &BoundingBox, outer: &BoundingBox) -> bool {
    inner.top >= outer.top
        && inner.left >= outer.left
        && inner.bottom() <= outer.bottom()
        && inner.right() <= outer.right()
}

/// Vertical band membership: the box starts at or below `band_top` and
/// ends at or above `band_bottom`.
pub fn in_band(bbox: &BoundingBox, band_top: f64, band_bottom: f64) -> bool {
    bbox.top >= band_top && bbox.bottom() <= band_bottom
}
