//! Page reconstruction.
//!
//! Per page: [`PageContext`] indexes and classifies the blocks once, the
//! extractors in [`key_value`], [`tables`] and [`text`] read from it, and
//! [`PageLinearizer`] stitches their output into ordered content.
//! [`AnalysisParser`] runs that over every page of a document.

mod analysis_parser;
mod index;
pub mod key_value;
pub mod linearize;
mod options;
pub mod tables;
pub mod text;

pub use analysis_parser::AnalysisParser;
pub use index::{BlockIndex, PageContext};
pub use key_value::KeyValuePair;
pub use linearize::{reconstruct_page, AnchorLine, PageLinearizer};
pub use options::{ErrorMode, KeyValuePolicy, ParseOptions};
