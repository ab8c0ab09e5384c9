//! Bounding box → text association.

use super::uri::UriReference;
use crate::content::ContentChunk;
use crate::cos::ObjectKey;
use crate::geometry::BoundingBox;
use crate::workspace::Workspace;

/// Text shown inside `region` of `page`.
///
/// Concatenates, in content-stream order and without separators, every text
/// chunk of the page whose box overlaps `region`, then trims the result.
/// An unknown page or no overlapping chunk yields an empty string.
pub fn text_for(workspace: &Workspace, page: Option<ObjectKey>, region: &BoundingBox) -> String {
    let Some(page) = page else {
        return String::new();
    };
    let chunks = workspace.chunks(page);
    let text: String = chunks
        .iter()
        .filter_map(ContentChunk::as_text)
        .filter(|chunk| chunk.bounding_box.intersects(region))
        .map(|chunk| chunk.value.as_str())
        .collect();
    text.trim().to_string()
}

/// Whether `text` parses as a URI reference.
pub fn looks_like_link(text: &str) -> bool {
    UriReference::parse(text).is_some()
}
