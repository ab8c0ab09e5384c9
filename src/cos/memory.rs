//! In-memory [`ObjectSource`].
//!
//! Used by hosts that already hold a decoded object graph and by tests that
//! need a precise, synthetic document.

use std::collections::HashMap;

use super::object::{CosDict, CosObject, ObjectKey};
use super::source::ObjectSource;

/// An object graph held entirely in memory.
///
/// `new()` creates a catalog and an empty page tree; pages are appended with
/// [`MemorySource::add_page`].
#[derive(Debug, Clone)]
pub struct MemorySource {
    objects: HashMap<ObjectKey, CosObject>,
    root: Option<ObjectKey>,
    pages_root: Option<ObjectKey>,
    page_list: Vec<ObjectKey>,
    next_number: u32,
    file_name: Option<String>,
}

impl MemorySource {
    /// Create a source with a catalog and an empty page tree.
    pub fn new() -> Self {
        let mut source = Self::empty();
        let pages_root = source.reserve();
        source.pages_root = Some(pages_root);
        source.write_page_tree();

        let catalog: CosDict = [
            ("Type", CosObject::name("Catalog")),
            ("Pages", CosObject::Reference(pages_root)),
        ]
        .into_iter()
        .collect();
        let root = source.add(catalog);
        source.root = Some(root);
        source
    }

    /// Create a source with no objects at all (not even a catalog).
    pub fn empty() -> Self {
        Self {
            objects: HashMap::new(),
            root: None,
            pages_root: None,
            page_list: Vec::new(),
            next_number: 1,
            file_name: None,
        }
    }

    /// Set the name reported by [`ObjectSource::file_name`].
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Reserve an object key without storing anything under it yet.
    pub fn reserve(&mut self) -> ObjectKey {
        let key = (self.next_number, 0);
        self.next_number += 1;
        key
    }

    /// Store an object and return its key.
    pub fn add(&mut self, obj: impl Into<CosObject>) -> ObjectKey {
        let key = self.reserve();
        self.objects.insert(key, obj.into());
        key
    }

    /// Store (or replace) an object under a known key.
    pub fn insert(&mut self, key: ObjectKey, obj: impl Into<CosObject>) {
        self.next_number = self.next_number.max(key.0 + 1);
        self.objects.insert(key, obj.into());
    }

    /// Use `key` as the catalog.
    pub fn set_root(&mut self, key: ObjectKey) {
        self.root = Some(key);
    }

    /// Set an entry of the catalog dictionary.
    pub fn set_catalog_entry(&mut self, name: &str, value: impl Into<CosObject>) {
        let Some(root) = self.root else {
            return;
        };
        let catalog = self
            .objects
            .get(&root)
            .and_then(CosObject::as_dict)
            .cloned()
            .unwrap_or_default();
        self.objects.insert(root, catalog.with(name, value).into());
    }

    /// Append a page built from `entries` with the given content stream.
    ///
    /// `/Type`, `/Parent` and `/Contents` are filled in; a `/MediaBox` of
    /// US Letter is added when `entries` has none.
    pub fn add_page(&mut self, entries: CosDict, content: &[u8]) -> ObjectKey {
        let content_key = self.add(CosObject::stream(CosDict::new(), content));
        let page_key = self.reserve();

        let mut page = entries
            .with("Type", CosObject::name("Page"))
            .with("Contents", CosObject::Reference(content_key));
        if let Some(parent) = self.pages_root {
            page = page.with("Parent", CosObject::Reference(parent));
        }
        if !page.contains_key("MediaBox") {
            page = page.with("MediaBox", CosObject::numbers(&[0.0, 0.0, 612.0, 792.0]));
        }

        self.objects.insert(page_key, page.into());
        self.page_list.push(page_key);
        self.write_page_tree();
        page_key
    }

    fn write_page_tree(&mut self) {
        let Some(pages_root) = self.pages_root else {
            return;
        };
        let kids = self
            .page_list
            .iter()
            .map(|key| CosObject::Reference(*key))
            .collect();
        let tree: CosDict = [
            ("Type", CosObject::name("Pages")),
            ("Kids", CosObject::array(kids)),
            ("Count", CosObject::Integer(self.page_list.len() as i64)),
        ]
        .into_iter()
        .collect();
        self.objects.insert(pages_root, tree.into());
    }
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectSource for MemorySource {
    fn object(&self, key: ObjectKey) -> Option<CosObject> {
        self.objects.get(&key).cloned()
    }

    fn catalog(&self) -> Option<CosDict> {
        self.root
            .and_then(|root| self.objects.get(&root))
            .and_then(CosObject::as_dict)
            .cloned()
    }

    fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cos::page_content_ops;

    #[test]
    fn test_new_has_empty_page_tree() {
        let source = MemorySource::new();
        assert!(source.catalog().is_some());
        assert!(source.page_keys().is_empty());
    }

    #[test]
    fn test_pages_in_order() {
        let mut source = MemorySource::new();
        let first = source.add_page(CosDict::new(), b"");
        let second = source.add_page(CosDict::new(), b"");
        assert_eq!(source.page_keys(), vec![first, second]);
    }

    #[test]
    fn test_catalog_entry() {
        let mut source = MemorySource::new();
        let tree = source.add(CosDict::new().with("Type", CosObject::name("StructTreeRoot")));
        source.set_catalog_entry("StructTreeRoot", tree);

        let catalog = source.catalog().unwrap();
        assert_eq!(catalog.get("StructTreeRoot").and_then(CosObject::as_reference), Some(tree));
        assert!(catalog.contains_key("Pages"));
    }

    #[test]
    fn test_resolve_dangling_reference() {
        let source = MemorySource::new();
        assert!(source.resolve(&CosObject::Reference((99, 0))).is_null());
    }

    #[test]
    fn test_resolve_reference_cycle() {
        let mut source = MemorySource::empty();
        source.insert((1, 0), CosObject::Reference((2, 0)));
        source.insert((2, 0), CosObject::Reference((1, 0)));
        assert!(source.resolve(&CosObject::Reference((1, 0))).is_null());
    }

    #[test]
    fn test_get_numbers_resolves_elements() {
        let mut source = MemorySource::new();
        let width = source.add(CosObject::Real(200.0));
        let dict = CosDict::new().with(
            "Rect",
            CosObject::array(vec![
                CosObject::Integer(0),
                CosObject::Integer(0),
                CosObject::Reference(width),
                CosObject::Integer(50),
            ]),
        );
        assert_eq!(source.get_numbers(&dict, "Rect"), Some(vec![0.0, 0.0, 200.0, 50.0]));
        assert_eq!(source.get_numbers(&dict, "Missing"), None);
    }

    #[test]
    fn test_page_content_ops_concatenates_array() {
        let mut source = MemorySource::new();
        let first = source.add(CosObject::stream(CosDict::new(), b"BT"));
        let second = source.add(CosObject::stream(CosDict::new(), b"ET"));
        let page = CosDict::new().with(
            "Contents",
            CosObject::array(vec![CosObject::Reference(first), CosObject::Reference(second)]),
        );

        let ops = page_content_ops(&source, &page).unwrap();
        let operators: Vec<&str> = ops.iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(operators, vec!["BT", "ET"]);
    }
}
