//! Validation model types.
//!
//! This module wraps the raw object graph into typed, link-navigable model
//! nodes. Every node has a constant type tag, scalar properties and a table
//! of named links to child nodes. Links are resolved lazily on first access
//! and cached for the lifetime of the node.

mod annotation;
mod document;
mod factory;
mod halftone;
mod page;
mod struct_tree;

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use once_cell::unsync::OnceCell;
use serde::Serialize;

use crate::cos::{ObjectKey, ObjectSource};
use crate::options::ValidationOptions;
use crate::workspace::Workspace;

pub use annotation::{AnnotationKind, SaAnnotation};
pub use document::SaDocument;
pub use factory::VariantTable;
pub use halftone::{HalftoneKind, PdHalftone};
pub use page::SaPage;
pub use struct_tree::{
    NodeSemantics, SaStructElem, SaStructTreeRoot, SemanticType, StructRole,
    DEFAULT_MAX_STRUCT_DEPTH,
};

/// Shared handle to any model node.
pub type ModelRef = Rc<dyn ModelObject>;

/// An immutable, shared sequence of linked nodes.
pub type LinkedObjects = Rc<[ModelRef]>;

thread_local! {
    static EMPTY_LINKS: LinkedObjects = Rc::from(Vec::<ModelRef>::new());
}

/// The shared empty link sequence returned for unknown link names.
pub fn empty_links() -> LinkedObjects {
    EMPTY_LINKS.with(Rc::clone)
}

/// A node of the validation model.
///
/// Link and property names form a stable contract with rule evaluation.
pub trait ModelObject {
    /// Constant type tag of the variant (e.g., "SALinkAnnotation").
    fn object_type(&self) -> &'static str;

    /// Identity of the underlying raw object, when it is indirect.
    fn id(&self) -> Option<ObjectKey> {
        None
    }

    /// Names accepted by [`linked_objects`](ModelObject::linked_objects).
    fn link_names(&self) -> &'static [&'static str] {
        &[]
    }

    /// Child nodes reachable through `link`.
    ///
    /// Unknown names yield an empty sequence. Repeated calls with the same
    /// name return the same shared sequence.
    fn linked_objects(&self, _link: &str) -> LinkedObjects {
        empty_links()
    }

    /// Names accepted by [`property`](ModelObject::property).
    fn property_names(&self) -> &'static [&'static str] {
        &[]
    }

    /// Scalar property value; `None` when the name is unknown.
    fn property(&self, _name: &str) -> Option<PropertyValue> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

/// A scalar property value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(String),
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Integer(i) => Some(*i as f64),
            PropertyValue::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Null => write!(f, "null"),
            PropertyValue::Boolean(b) => write!(f, "{}", b),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Real(r) => write!(f, "{}", r),
            PropertyValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Real(value)
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(PropertyValue::Null)
    }
}

/// Lazily computed, cached link to nodes of one concrete type.
///
/// Keeps the typed sequence for callers inside the crate and an erased
/// sequence for [`ModelObject::linked_objects`]; both are built at most once.
pub struct LinkCell<T> {
    typed: OnceCell<Rc<[Rc<T>]>>,
    erased: OnceCell<LinkedObjects>,
}

impl<T: ModelObject + 'static> LinkCell<T> {
    pub fn new() -> Self {
        Self {
            typed: OnceCell::new(),
            erased: OnceCell::new(),
        }
    }

    /// Typed sequence, computed by `init` on first access.
    pub fn get_or_init(&self, init: impl FnOnce() -> Vec<Rc<T>>) -> Rc<[Rc<T>]> {
        self.typed.get_or_init(|| Rc::from(init())).clone()
    }

    /// Erased sequence, sharing nodes with the typed one.
    pub fn erased(&self, init: impl FnOnce() -> Vec<Rc<T>>) -> LinkedObjects {
        self.erased
            .get_or_init(|| {
                self.get_or_init(init)
                    .iter()
                    .map(|node| Rc::clone(node) as ModelRef)
                    .collect()
            })
            .clone()
    }
}

impl<T: ModelObject + 'static> Default for LinkCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a model node needs from its document.
pub struct ModelContext {
    pub source: Rc<dyn ObjectSource>,
    pub workspace: Rc<Workspace>,
    pub options: ValidationOptions,
    page_keys: Vec<ObjectKey>,
    page_index: HashMap<ObjectKey, u32>,
}

impl ModelContext {
    pub fn new(
        source: Rc<dyn ObjectSource>,
        workspace: Rc<Workspace>,
        options: ValidationOptions,
    ) -> Self {
        let page_keys = source.page_keys();
        let page_index = page_keys
            .iter()
            .enumerate()
            .map(|(i, key)| (*key, i as u32 + 1))
            .collect();
        Self {
            source,
            workspace,
            options,
            page_keys,
            page_index,
        }
    }

    /// Page keys in document order.
    pub fn page_keys(&self) -> &[ObjectKey] {
        &self.page_keys
    }

    /// Page number (1-indexed) of a page object.
    pub fn page_number(&self, page: ObjectKey) -> Option<u32> {
        self.page_index.get(&page).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cos::MemorySource;

    struct Leaf;

    impl ModelObject for Leaf {
        fn object_type(&self) -> &'static str {
            "Leaf"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_link_cell_computes_once() {
        let cell: LinkCell<Leaf> = LinkCell::new();
        let mut calls = 0;
        let first = cell.erased(|| {
            calls += 1;
            vec![Rc::new(Leaf), Rc::new(Leaf)]
        });
        let second = cell.erased(|| {
            calls += 1;
            Vec::new()
        });

        assert_eq!(calls, 1);
        assert_eq!(first.len(), 2);
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_default_links_are_empty_and_shared() {
        let leaf = Leaf;
        assert!(leaf.linked_objects("anything").is_empty());
        assert!(Rc::ptr_eq(&empty_links(), &empty_links()));
        assert!(leaf.property("anything").is_none());
    }

    #[test]
    fn test_property_value_conversions() {
        assert_eq!(PropertyValue::from(Some(3i64)), PropertyValue::Integer(3));
        assert_eq!(PropertyValue::from(None::<String>), PropertyValue::Null);
        assert_eq!(PropertyValue::Integer(2).as_f64(), Some(2.0));
        assert_eq!(
            serde_json::to_string(&PropertyValue::from("x")).unwrap(),
            "\"x\""
        );
    }

    #[test]
    fn test_context_page_numbers() {
        let mut source = MemorySource::new();
        let first = source.add_page(Default::default(), b"");
        let second = source.add_page(Default::default(), b"");
        let ctx = ModelContext::new(
            Rc::new(source),
            Rc::new(Workspace::new()),
            ValidationOptions::default(),
        );

        assert_eq!(ctx.page_number(first), Some(1));
        assert_eq!(ctx.page_number(second), Some(2));
        assert_eq!(ctx.page_number((999, 0)), None);
    }
}
