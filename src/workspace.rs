//! Per-document workspace.
//!
//! Holds the content chunk index for the document currently being
//! processed. One workspace belongs to one document pass; it is reset at the
//! start of every pass and is never shared between documents processed at
//! the same time.

use std::cell::{Ref, RefCell};
use std::collections::{HashMap, HashSet};

use crate::content::ContentChunk;
use crate::cos::ObjectKey;

/// Mutable, document-scoped caches.
///
/// Interior mutability is single-writer: chunks are registered during the
/// extraction phase and only read afterwards.
#[derive(Debug, Default)]
pub struct Workspace {
    chunks: RefCell<HashMap<ObjectKey, Vec<ContentChunk>>>,
    /// Positions of marked chunks in their page sequence, by `(page, mcid)`
    marked: RefCell<HashMap<(ObjectKey, i64), Vec<usize>>>,
    extracted: RefCell<HashSet<ObjectKey>>,
}

impl Workspace {
    /// Create an empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything recorded for the previous document.
    pub fn reset(&self) {
        self.chunks.borrow_mut().clear();
        self.marked.borrow_mut().clear();
        self.extracted.borrow_mut().clear();
    }

    /// Mark `page` as extracted. Returns `false` if it already was.
    pub fn mark_extracted(&self, page: ObjectKey) -> bool {
        self.extracted.borrow_mut().insert(page)
    }

    /// Append chunks to a page's sequence, keeping encounter order.
    pub fn register(&self, page: ObjectKey, chunks: Vec<ContentChunk>) {
        let mut index = self.chunks.borrow_mut();
        let sequence = index.entry(page).or_default();
        let mut marked = self.marked.borrow_mut();
        for chunk in chunks {
            if let Some(mcid) = chunk.mcid() {
                marked.entry((page, mcid)).or_default().push(sequence.len());
            }
            sequence.push(chunk);
        }
    }

    /// Borrow the chunk sequence of `page` (empty when the page is unknown).
    pub fn chunks(&self, page: ObjectKey) -> Ref<'_, [ContentChunk]> {
        Ref::map(self.chunks.borrow(), |index| {
            index.get(&page).map(Vec::as_slice).unwrap_or(&[])
        })
    }

    /// Chunks of `page` tagged with marked-content id `mcid`, in encounter
    /// order.
    pub fn marked_chunks(&self, page: ObjectKey, mcid: i64) -> Vec<ContentChunk> {
        let marked = self.marked.borrow();
        let Some(positions) = marked.get(&(page, mcid)) else {
            return Vec::new();
        };
        let index = self.chunks.borrow();
        let Some(sequence) = index.get(&page) else {
            return Vec::new();
        };
        positions
            .iter()
            .filter_map(|&i| sequence.get(i).cloned())
            .collect()
    }

    /// Number of pages with registered chunks.
    pub fn page_count(&self) -> usize {
        self.chunks.borrow().len()
    }

    /// Total number of registered chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.borrow().values().map(Vec::len).sum()
    }

    /// Visit every registered chunk, page by page.
    pub fn for_each_chunk(&self, mut f: impl FnMut(ObjectKey, &ContentChunk)) {
        for (page, chunks) in self.chunks.borrow().iter() {
            for chunk in chunks {
                f(*page, chunk);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::TextChunk;
    use crate::geometry::BoundingBox;

    fn text(value: &str) -> ContentChunk {
        ContentChunk::Text(TextChunk::new(value, BoundingBox::new(1, 0.0, 0.0, 10.0, 10.0)))
    }

    #[test]
    fn test_register_keeps_order() {
        let workspace = Workspace::new();
        workspace.register((3, 0), vec![text("a"), text("b")]);
        workspace.register((3, 0), vec![text("c")]);

        let values: Vec<String> = workspace
            .chunks((3, 0))
            .iter()
            .filter_map(|c| c.as_text().map(|t| t.value.clone()))
            .collect();
        assert_eq!(values, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_marked_chunks_by_mcid() {
        let workspace = Workspace::new();
        let marked = |value: &str, mcid: i64| {
            let mut chunk = TextChunk::new(value, BoundingBox::new(1, 0.0, 0.0, 10.0, 10.0));
            chunk.mcid = Some(mcid);
            ContentChunk::Text(chunk)
        };
        workspace.register((3, 0), vec![marked("a", 1), text("x"), marked("b", 2)]);
        workspace.register((3, 0), vec![marked("c", 1)]);
        workspace.register((4, 0), vec![marked("d", 1)]);

        let values = |page, mcid| -> Vec<String> {
            workspace
                .marked_chunks(page, mcid)
                .iter()
                .filter_map(|c| c.as_text().map(|t| t.value.clone()))
                .collect()
        };
        assert_eq!(values((3, 0), 1), vec!["a", "c"]);
        assert_eq!(values((3, 0), 2), vec!["b"]);
        assert_eq!(values((4, 0), 1), vec!["d"]);
        assert!(values((3, 0), 9).is_empty());

        workspace.reset();
        assert!(values((3, 0), 1).is_empty());
    }

    #[test]
    fn test_unknown_page_is_empty() {
        let workspace = Workspace::new();
        assert!(workspace.chunks((42, 0)).is_empty());
    }

    #[test]
    fn test_reset_clears_everything() {
        let workspace = Workspace::new();
        assert!(workspace.mark_extracted((1, 0)));
        assert!(!workspace.mark_extracted((1, 0)));
        workspace.register((1, 0), vec![text("a")]);

        workspace.reset();
        assert_eq!(workspace.chunk_count(), 0);
        assert!(workspace.mark_extracted((1, 0)));
    }
}
