//! Semantic analysis over the structure tree.
//!
//! Associates page regions with extracted text and runs the checkers that
//! annotate structure elements with detected semantic types and contrast
//! ratios.

mod accumulated;
mod association;
mod contrast;
mod fonts;
mod uri;

pub use accumulated::AccumulatedChecker;
pub use association::{looks_like_link, text_for};
pub use contrast::{contrast_ratio, relative_luminance, ContrastChecker};
pub use fonts::FontStatistics;
pub use uri::UriReference;

use crate::error::Result;
use crate::model::SaStructTreeRoot;

/// A pass over a built structure tree that writes results onto its elements.
pub trait SemanticChecker {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    fn check_semantic_tree(&mut self, root: &SaStructTreeRoot) -> Result<()>;
}
