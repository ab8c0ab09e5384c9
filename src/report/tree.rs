//! Snapshot of a model subtree.

use indexmap::IndexMap;
use serde::Serialize;

use crate::model::{ModelObject, PropertyValue};

/// Links are not followed below this many levels.
pub const DEFAULT_DUMP_DEPTH: usize = 64;

/// A model node with its properties and its non-empty links, recursively.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelNodeDump {
    #[serde(rename = "type")]
    pub object_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<&'static str, PropertyValue>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub links: IndexMap<&'static str, Vec<ModelNodeDump>>,
    /// Set when the depth limit cut off non-empty links of this node.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

impl ModelNodeDump {
    /// Dump `node` and everything reachable from it.
    pub fn new(node: &dyn ModelObject) -> Self {
        Self::with_depth(node, DEFAULT_DUMP_DEPTH)
    }

    /// Dump `node`, following links at most `max_depth` levels down.
    pub fn with_depth(node: &dyn ModelObject, max_depth: usize) -> Self {
        let properties = node
            .property_names()
            .iter()
            .map(|name| (*name, node.property(name).unwrap_or(PropertyValue::Null)))
            .collect();

        let mut links = IndexMap::new();
        let mut truncated = false;
        for name in node.link_names() {
            let objects = node.linked_objects(name);
            if objects.is_empty() {
                continue;
            }
            if max_depth == 0 {
                truncated = true;
                continue;
            }
            let children = objects
                .iter()
                .map(|child| Self::with_depth(child.as_ref(), max_depth - 1))
                .collect();
            links.insert(*name, children);
        }

        Self {
            object_type: node.object_type(),
            id: node.id().map(|(num, gen)| format!("{} {} R", num, gen)),
            properties,
            links,
            truncated,
        }
    }

    /// Number of nodes in this dump, including itself.
    pub fn count(&self) -> usize {
        1 + self
            .links
            .values()
            .flatten()
            .map(ModelNodeDump::count)
            .sum::<usize>()
    }

    /// All nodes of the given type, depth-first.
    pub fn find_all(&self, object_type: &str) -> Vec<&ModelNodeDump> {
        let mut found = Vec::new();
        self.collect(object_type, &mut found);
        found
    }

    fn collect<'a>(&'a self, object_type: &str, found: &mut Vec<&'a ModelNodeDump>) {
        if self.object_type == object_type {
            found.push(self);
        }
        for child in self.links.values().flatten() {
            child.collect(object_type, found);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cos::{CosDict, CosObject, MemorySource};
    use crate::model::SaDocument;
    use crate::options::ValidationOptions;
    use std::rc::Rc;

    fn document() -> SaDocument {
        let mut source = MemorySource::new();
        let annot = CosDict::new()
            .with("Type", CosObject::name("Annot"))
            .with("Subtype", CosObject::name("Link"))
            .with("Rect", CosObject::numbers(&[0.0, 0.0, 10.0, 10.0]));
        source.add_page(
            CosDict::new().with("Annots", CosObject::array(vec![annot.into()])),
            b"",
        );
        SaDocument::build(Rc::new(source), ValidationOptions::default()).unwrap()
    }

    #[test]
    fn test_dump_follows_links() {
        let dump = ModelNodeDump::new(&document());

        assert_eq!(dump.object_type, "SAPDFDocument");
        assert_eq!(dump.properties["pageCount"], PropertyValue::Integer(1));
        assert_eq!(dump.links["pages"].len(), 1);
        assert!(!dump.links.contains_key("StructTreeRoot"));
        assert_eq!(dump.find_all("SALinkAnnotation").len(), 1);
        assert_eq!(dump.count(), 3);
    }

    #[test]
    fn test_depth_limit_marks_truncation() {
        let dump = ModelNodeDump::with_depth(&document(), 1);
        let page = &dump.links["pages"][0];
        assert!(page.links.is_empty());
        assert!(page.truncated);
        assert!(!dump.truncated);
    }

    #[test]
    fn test_dump_serialization() {
        let json = serde_json::to_value(ModelNodeDump::new(&document())).unwrap();
        assert_eq!(json["type"], "SAPDFDocument");
        assert_eq!(json["links"]["pages"][0]["type"], "SAPage");
        assert!(json.get("truncated").is_none());
        let annot = &json["links"]["pages"][0]["links"]["annots"][0];
        assert_eq!(annot["properties"]["hasLinkValue"], true);
        assert_eq!(annot["properties"]["Contents"], serde_json::Value::Null);
    }
}
