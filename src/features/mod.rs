//! Feature reporting.
//!
//! Feature objects describe parts of a document as small, serializable
//! trees of named values, independent of the validation model.

mod signature;

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

use crate::error::Result;

pub use signature::{
    parse_pdf_date, signatures, PdSignature, SignatureFeaturesData, SignatureFeaturesObject,
};

/// Kind of object a feature tree describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureObjectType {
    Signature,
}

impl fmt::Display for FeatureObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureObjectType::Signature => write!(f, "signature"),
        }
    }
}

/// A node of a feature tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureTreeNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FeatureTreeNode>,
}

impl FeatureTreeNode {
    /// Create a root node with no value.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Append a child and return it.
    pub fn add_child(&mut self, name: impl Into<String>) -> &mut FeatureTreeNode {
        self.children.push(FeatureTreeNode::root(name));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Append a child holding `value`, unless the value is absent or empty.
    pub fn add_not_empty(&mut self, name: &str, value: Option<impl Into<String>>) {
        let Some(value) = value.map(Into::into) else {
            return;
        };
        if value.is_empty() {
            return;
        }
        self.add_child(name).value = Some(value);
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn child(&self, name: &str) -> Option<&FeatureTreeNode> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Feature trees collected over one document, grouped by object type.
#[derive(Debug, Default, Serialize)]
pub struct FeatureExtractionResult {
    trees: IndexMap<FeatureObjectType, Vec<FeatureTreeNode>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

impl FeatureExtractionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_feature_tree(&mut self, object_type: FeatureObjectType, tree: FeatureTreeNode) {
        self.trees.entry(object_type).or_default().push(tree);
    }

    pub fn add_error(&mut self, object_type: FeatureObjectType, message: impl fmt::Display) {
        self.errors.push(format!("{}: {}", object_type, message));
    }

    pub fn trees(&self, object_type: FeatureObjectType) -> &[FeatureTreeNode] {
        self.trees
            .get(&object_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Report every object, recording failures instead of aborting.
    pub fn collect<'a>(objects: impl IntoIterator<Item = &'a dyn FeaturesObject>) -> Self {
        let mut result = Self::new();
        for object in objects {
            if let Err(e) = object.report_features(&mut result) {
                log::warn!("Failed to report {} features: {}", object.object_type(), e);
                result.add_error(object.object_type(), e);
            }
        }
        result
    }
}

/// Structured data behind a feature object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FeaturesData {
    Signature(SignatureFeaturesData),
}

/// An object that reports features.
pub trait FeaturesObject {
    fn object_type(&self) -> FeatureObjectType;

    /// Build this object's feature tree and record it in `result`.
    ///
    /// Returns `Ok(None)` when the object has nothing to report.
    fn report_features(&self, result: &mut FeatureExtractionResult)
        -> Result<Option<FeatureTreeNode>>;

    fn data(&self) -> Option<FeaturesData>;
}
