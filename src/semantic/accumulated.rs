//! Accumulated structural classifier.
//!
//! Classifies structure elements bottom-up: leaf elements from the font
//! size and weight of their text against the document's font statistics,
//! containers from the semantic types accumulated from their children.
//! Each element receives a semantic type and a score of how well that type
//! fits its declared structural role.

use super::fonts::FontStatistics;
use super::SemanticChecker;
use crate::content::ContentChunk;
use crate::error::Result;
use crate::model::{SaStructElem, SaStructTreeRoot, SemanticType, StructRole};

/// Text and image content accumulated over a subtree.
#[derive(Debug, Clone, Copy, Default)]
struct ContentSummary {
    chars: usize,
    bold_chars: usize,
    weighted_size: f64,
    images: usize,
}

impl ContentSummary {
    fn add_chunk(&mut self, chunk: &ContentChunk) {
        match chunk {
            ContentChunk::Text(text) => {
                let chars = text.value.trim().chars().count();
                self.chars += chars;
                self.weighted_size += text.font_size * chars as f64;
                if text.is_bold() {
                    self.bold_chars += chars;
                }
            }
            ContentChunk::Image(_) => self.images += 1,
        }
    }

    fn merge(&mut self, other: &ContentSummary) {
        self.chars += other.chars;
        self.bold_chars += other.bold_chars;
        self.weighted_size += other.weighted_size;
        self.images += other.images;
    }

    fn font_size(&self) -> f64 {
        if self.chars == 0 {
            0.0
        } else {
            self.weighted_size / self.chars as f64
        }
    }

    fn is_bold(&self) -> bool {
        self.chars > 0 && self.bold_chars * 2 > self.chars
    }
}

/// Classifier over the whole structure tree.
#[derive(Debug, Default)]
pub struct AccumulatedChecker {
    stats: FontStatistics,
    classified: usize,
}

impl AccumulatedChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements that received a semantic type in the last run.
    pub fn classified(&self) -> usize {
        self.classified
    }

    fn classify(&mut self, elem: &SaStructElem) -> ContentSummary {
        let mut summary = ContentSummary::default();
        let mut child_types = Vec::new();
        for child in elem.children().iter() {
            let child_summary = self.classify(child);
            summary.merge(&child_summary);
            if let Some(semantic) = child.semantics().semantic_type {
                child_types.push(semantic);
            }
        }
        for chunk in elem.own_chunks() {
            summary.add_chunk(&chunk);
        }

        let semantic = self.semantic_type(elem, &child_types, &summary);
        if semantic.is_some() {
            self.classified += 1;
        }
        elem.set_semantic_type(semantic);
        summary
    }

    fn semantic_type(
        &self,
        elem: &SaStructElem,
        child_types: &[SemanticType],
        summary: &ContentSummary,
    ) -> Option<SemanticType> {
        let all = |wanted: SemanticType| {
            !child_types.is_empty() && child_types.iter().all(|t| *t == wanted)
        };

        if all(SemanticType::TableCell) {
            return Some(SemanticType::TableRow);
        }
        if all(SemanticType::TableRow) {
            return Some(SemanticType::Table);
        }
        if elem.is_table_child() {
            return Some(SemanticType::TableCell);
        }
        if all(SemanticType::ListItem) {
            return Some(SemanticType::List);
        }
        if elem.is_list_child() {
            return Some(SemanticType::ListItem);
        }

        let inline_only = child_types
            .iter()
            .all(|t| matches!(t, SemanticType::Span | SemanticType::Link));
        if !inline_only {
            return Some(SemanticType::Group);
        }

        if summary.chars > 0 {
            let role = elem.role();
            if role == StructRole::Link {
                return Some(SemanticType::Link);
            }
            if role.is_inline() {
                return Some(SemanticType::Span);
            }
            let level = self
                .stats
                .heading_level(summary.font_size(), summary.is_bold());
            return Some(if level > 0 {
                SemanticType::Heading(level)
            } else {
                SemanticType::Paragraph
            });
        }
        if summary.images > 0 {
            return Some(SemanticType::Figure);
        }
        None
    }
}

impl SemanticChecker for AccumulatedChecker {
    fn name(&self) -> &'static str {
        "accumulated"
    }

    fn check_semantic_tree(&mut self, root: &SaStructTreeRoot) -> Result<()> {
        let mut stats = FontStatistics::new();
        root.context().workspace.for_each_chunk(|_, chunk| {
            if let Some(text) = chunk.as_text() {
                stats.add_chunk(text);
            }
        });
        stats.analyze();
        log::debug!(
            "Body font size {:.1}, {} heading sizes",
            stats.body_size,
            stats.heading_sizes.len()
        );
        self.stats = stats;
        self.classified = 0;

        for child in root.children().iter() {
            self.classify(child);
        }
        log::debug!("Classified {} structure elements", self.classified);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ImageChunk, TextChunk};
    use crate::cos::{CosDict, CosObject, MemorySource, ObjectKey};
    use crate::geometry::BoundingBox;
    use crate::model::{ModelContext, ModelObject, PropertyValue};
    use crate::options::ValidationOptions;
    use crate::workspace::Workspace;
    use std::rc::Rc;

    fn text(value: &str, size: f64, font: &str, mcid: i64) -> ContentChunk {
        let mut chunk = TextChunk::new(value, BoundingBox::new(1, 0.0, 0.0, 100.0, size));
        chunk.font_size = size;
        chunk.font_name = font.to_string();
        chunk.mcid = Some(mcid);
        ContentChunk::Text(chunk)
    }

    fn elem(s: &str, page: ObjectKey, k: CosObject) -> CosObject {
        CosDict::new()
            .with("S", CosObject::name(s))
            .with("Pg", CosObject::Reference(page))
            .with("K", k)
            .into()
    }

    fn check(source: MemorySource, workspace: Rc<Workspace>, kids: Vec<CosObject>) -> SaStructTreeRoot {
        let ctx = Rc::new(ModelContext::new(
            Rc::new(source),
            workspace,
            ValidationOptions::default(),
        ));
        let root = SaStructTreeRoot::new(ctx, None, CosDict::new().with("K", CosObject::array(kids)));
        AccumulatedChecker::new().check_semantic_tree(&root).unwrap();
        root
    }

    #[test]
    fn test_heading_and_paragraph_from_font_sizes() {
        let mut source = MemorySource::new();
        let page = source.add_page(CosDict::new(), b"");
        let workspace = Rc::new(Workspace::new());
        workspace.register(
            page,
            vec![
                text("Introduction", 24.0, "Helvetica-Bold", 0),
                text(&"body text ".repeat(40), 11.0, "Helvetica", 1),
            ],
        );

        let root = check(
            source,
            workspace,
            vec![
                elem("H1", page, CosObject::Integer(0)),
                elem("P", page, CosObject::Integer(1)),
            ],
        );

        let children = root.children();
        assert_eq!(children[0].semantics().semantic_type, Some(SemanticType::Heading(1)));
        assert_eq!(children[0].property("correctSemanticScore"), Some(PropertyValue::Real(1.0)));
        assert_eq!(children[1].property("semanticType"), Some(PropertyValue::from("P")));
    }

    #[test]
    fn test_mislabelled_heading_scores_zero() {
        let mut source = MemorySource::new();
        let page = source.add_page(CosDict::new(), b"");
        let workspace = Rc::new(Workspace::new());
        workspace.register(
            page,
            vec![
                text("Big Title", 30.0, "Helvetica", 0),
                text(&"body text ".repeat(40), 10.0, "Helvetica", 1),
            ],
        );

        let root = check(
            source,
            workspace,
            vec![
                elem("P", page, CosObject::Integer(0)),
                elem("P", page, CosObject::Integer(1)),
            ],
        );
        let first = &root.children()[0];
        assert_eq!(first.semantics().semantic_type, Some(SemanticType::Heading(1)));
        assert_eq!(first.semantics().correct_semantic_score, Some(0.0));
    }

    #[test]
    fn test_lists_tables_and_figures() {
        let mut source = MemorySource::new();
        let page = source.add_page(CosDict::new(), b"");
        let workspace = Rc::new(Workspace::new());
        workspace.register(
            page,
            vec![
                text("one", 12.0, "Helvetica", 0),
                text("two", 12.0, "Helvetica", 1),
                text("cell", 12.0, "Helvetica", 2),
                ContentChunk::Image(ImageChunk {
                    bounding_box: BoundingBox::new(1, 0.0, 0.0, 50.0, 50.0),
                    mcid: Some(3),
                }),
            ],
        );

        let list = elem(
            "L",
            page,
            CosObject::array(vec![
                elem("LI", page, CosObject::Integer(0)),
                elem("LI", page, CosObject::Integer(1)),
            ]),
        );
        let table = elem(
            "Table",
            page,
            elem("TR", page, elem("TD", page, CosObject::Integer(2))),
        );
        let figure = elem("Figure", page, CosObject::Integer(3));
        let root = check(source, workspace, vec![list, table, figure]);

        let children = root.children();
        assert_eq!(children[0].semantics().semantic_type, Some(SemanticType::List));
        assert_eq!(
            children[0].children()[0].semantics().semantic_type,
            Some(SemanticType::ListItem)
        );
        assert_eq!(children[1].semantics().semantic_type, Some(SemanticType::Table));
        assert_eq!(children[1].semantics().correct_semantic_score, Some(1.0));
        assert_eq!(children[2].semantics().semantic_type, Some(SemanticType::Figure));
    }

    #[test]
    fn test_empty_element_has_no_semantic_type() {
        let mut source = MemorySource::new();
        let page = source.add_page(CosDict::new(), b"");
        let root = check(
            source,
            Rc::new(Workspace::new()),
            vec![elem("P", page, CosObject::Integer(9))],
        );
        assert_eq!(root.children()[0].property("semanticType"), Some(PropertyValue::Null));
    }
}
