//! Object layer abstraction.
//!
//! Provides a trait-based interface to the raw PDF object graph, isolating
//! the concrete PDF library (lopdf) from model construction and chunk
//! extraction.

use std::collections::HashSet;

use super::content::{decode_content, ContentOp};
use super::object::{decode_text_simple, CosDict, CosObject, ObjectKey};
use crate::error::{Error, Result};

/// Longest chain of references followed by [`ObjectSource::resolve`].
const MAX_REFERENCE_CHAIN: usize = 32;

/// Read-only access to a parsed PDF object graph.
pub trait ObjectSource {
    /// Look up an indirect object.
    fn object(&self, key: ObjectKey) -> Option<CosObject>;

    /// The document catalog (`/Root` of the trailer).
    fn catalog(&self) -> Option<CosDict>;

    /// Name of the file the graph was read from, if any.
    fn file_name(&self) -> Option<&str> {
        None
    }

    /// Decode a shown string using the encoding of the indirect font
    /// dictionary `font`. Falls back to simple decoding.
    fn decode_text(&self, _font: Option<ObjectKey>, bytes: &[u8]) -> String {
        decode_text_simple(bytes)
    }

    /// Leaf page objects in document order.
    ///
    /// The default walks `/Pages` → `/Kids` from the catalog.
    fn page_keys(&self) -> Vec<ObjectKey> {
        let mut pages = Vec::new();
        let Some(root) = self.catalog().and_then(|c| c.get("Pages").cloned()) else {
            return pages;
        };
        let mut visited = HashSet::new();
        collect_pages(self, &root, &mut visited, &mut pages);
        pages
    }

    /// Follow references until a direct object is reached.
    ///
    /// Dangling or circular references resolve to `Null`.
    fn resolve(&self, obj: &CosObject) -> CosObject {
        let mut current = obj.clone();
        for _ in 0..MAX_REFERENCE_CHAIN {
            match current {
                CosObject::Reference(key) => match self.object(key) {
                    Some(next) => current = next,
                    None => return CosObject::Null,
                },
                direct => return direct,
            }
        }
        CosObject::Null
    }

    /// Resolve `obj` and return its dictionary, if it has one.
    fn resolve_dict(&self, obj: &CosObject) -> Option<CosDict> {
        self.resolve(obj).as_dict().cloned()
    }

    /// Resolve the value of `key` in `dict`.
    fn get_resolved(&self, dict: &CosDict, key: &str) -> Option<CosObject> {
        let value = self.resolve(dict.get(key)?);
        (!value.is_null()).then_some(value)
    }

    /// Resolve a numeric array under `key`, resolving each element too.
    fn get_numbers(&self, dict: &CosDict, key: &str) -> Option<Vec<f64>> {
        match self.get_resolved(dict, key)? {
            CosObject::Array(items) => items.iter().map(|i| self.resolve(i).as_f64()).collect(),
            _ => None,
        }
    }
}

fn collect_pages<S: ObjectSource + ?Sized>(
    source: &S,
    node: &CosObject,
    visited: &mut HashSet<ObjectKey>,
    pages: &mut Vec<ObjectKey>,
) {
    let Some(key) = node.as_reference() else {
        log::debug!("Skipping direct page tree node");
        return;
    };
    if !visited.insert(key) {
        log::warn!("Page tree cycle at {} {} R", key.0, key.1);
        return;
    }
    let Some(dict) = source.resolve_dict(node) else {
        return;
    };

    match dict.get("Kids").map(|k| source.resolve(k)) {
        Some(CosObject::Array(kids)) => {
            for kid in kids.iter() {
                collect_pages(source, kid, visited, pages);
            }
        }
        _ if dict.type_name() != Some("Pages") => pages.push(key),
        _ => {}
    }
}

/// Look up `key` on a page dictionary, walking up `/Parent` links when the
/// page does not carry it itself.
pub fn inherited_attribute<S: ObjectSource + ?Sized>(
    source: &S,
    page: &CosDict,
    key: &str,
) -> Option<CosObject> {
    let mut current = page.clone();
    let mut visited = HashSet::new();
    loop {
        if let Some(value) = source.get_resolved(&current, key) {
            return Some(value);
        }
        let parent = current.get("Parent")?;
        if let Some(parent_key) = parent.as_reference() {
            if !visited.insert(parent_key) {
                return None;
            }
        }
        current = source.resolve_dict(parent)?;
    }
}

/// Concatenated, decoded content of a page's `/Contents` (stream or array
/// of streams).
pub fn page_content_ops<S: ObjectSource + ?Sized>(
    source: &S,
    page: &CosDict,
) -> Result<Vec<ContentOp>> {
    let Some(contents) = page.get("Contents") else {
        return Ok(Vec::new());
    };

    let mut data = Vec::new();
    match source.resolve(contents) {
        CosObject::Stream(s) => data.extend_from_slice(&s.data),
        CosObject::Array(parts) => {
            for part in parts.iter() {
                match source.resolve(part) {
                    CosObject::Stream(s) => {
                        data.extend_from_slice(&s.data);
                        data.push(b' ');
                    }
                    other => {
                        return Err(Error::Corrupted(format!(
                            "content array entry is not a stream: {}",
                            other
                        )))
                    }
                }
            }
        }
        CosObject::Null => return Ok(Vec::new()),
        other => {
            return Err(Error::Corrupted(format!(
                "page /Contents is not a stream: {}",
                other
            )))
        }
    }

    decode_content(&data)
}
