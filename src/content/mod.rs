//! Page content: chunk types, font metrics and the content stream walker.

mod chunk;
mod extractor;
mod font;

pub use chunk::{ContentChunk, ImageChunk, TextChunk};
pub use extractor::{ChunkExtractor, DEFAULT_MAX_FORM_DEPTH};
pub use font::FontMetrics;
