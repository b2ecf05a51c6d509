//! Document model types.
//!
//! Two halves: the typed block graph decoded from the analysis engine
//! (`Block`, `AnalysisResult`, plus the raw `wire` format), and the ordered
//! content reconstructed from it (`Document`, `PageContent`, `ContentEntry`).

mod analysis;
mod block;
mod content;
mod document;
pub mod geometry;
mod table;
pub mod wire;

pub use analysis::AnalysisResult;
pub use block::{Block, BlockKind, KeyValueRole, Relationship, RelationshipKind, SelectionStatus};
pub use content::{ContentEntry, KeyValueMap, PageContent};
pub use document::{Document, Metadata};
pub use geometry::{Band, BoundingBox};
pub use table::TableMatrix;
pub use wire::AnalysisResponse;
