//! Document node and the model-building pipeline.

use std::any::Any;
use std::path::Path;
use std::rc::Rc;

use once_cell::unsync::OnceCell;

use super::page::SaPage;
use super::struct_tree::SaStructTreeRoot;
use super::{LinkCell, LinkedObjects, ModelContext, ModelObject, ModelRef, PropertyValue};
use crate::cos::{CosDict, CosObject, LopdfSource, ObjectSource};
use crate::error::{Error, Result};
use crate::options::{ContrastCheck, ValidationOptions};
use crate::semantic::{AccumulatedChecker, ContrastChecker, SemanticChecker};
use crate::workspace::Workspace;

const DOCUMENT_LINKS: &[&str] = &["pages", "StructTreeRoot"];
const DOCUMENT_PROPERTIES: &[&str] = &["pageCount", "isTagged", "hasFileName"];

/// Name reported to the contrast checker for documents without a file name.
const UNNAMED_DOCUMENT: &str = "<memory>";

/// The root of the validation model.
///
/// Building a document runs the whole semantic pipeline: content chunks of
/// every page are extracted into the workspace, the structure tree is built
/// and the semantic checkers annotate its elements.
pub struct SaDocument {
    ctx: Rc<ModelContext>,
    catalog: CosDict,
    pages: LinkCell<SaPage>,
    struct_tree_root: OnceCell<Option<Rc<SaStructTreeRoot>>>,
    struct_tree_link: OnceCell<LinkedObjects>,
}

impl SaDocument {
    /// Build the model for a PDF file.
    pub fn open<P: AsRef<Path>>(path: P, options: ValidationOptions) -> Result<Self> {
        let source = LopdfSource::load_file(path)?;
        Self::build(Rc::new(source), options)
    }

    /// Build the model for PDF bytes.
    pub fn from_bytes(data: &[u8], options: ValidationOptions) -> Result<Self> {
        let source = LopdfSource::load_bytes(data)?;
        Self::build(Rc::new(source), options)
    }

    /// Build the model over `source` with a fresh workspace.
    pub fn build(source: Rc<dyn ObjectSource>, options: ValidationOptions) -> Result<Self> {
        Self::with_workspace(source, Rc::new(Workspace::new()), options)
    }

    /// Build the model over `source`, reusing `workspace`.
    ///
    /// The workspace is reset first; nothing recorded for a previous
    /// document survives.
    pub fn with_workspace(
        source: Rc<dyn ObjectSource>,
        workspace: Rc<Workspace>,
        options: ValidationOptions,
    ) -> Result<Self> {
        workspace.reset();

        let catalog = source
            .catalog()
            .ok_or_else(|| Error::CannotBuildModel("document has no catalog".into()))?;
        if source
            .get_resolved(&catalog, "Pages")
            .and_then(|p| p.as_dict().cloned())
            .is_none()
        {
            return Err(Error::CannotBuildModel("catalog has no page tree".into()));
        }

        let document = Self {
            ctx: Rc::new(ModelContext::new(source, workspace, options)),
            catalog,
            pages: LinkCell::new(),
            struct_tree_root: OnceCell::new(),
            struct_tree_link: OnceCell::new(),
        };
        document.check_semantics()?;
        Ok(document)
    }

    fn check_semantics(&self) -> Result<()> {
        let pages = self.pages();
        for page in pages.iter() {
            page.parse_chunks()?;
        }
        log::debug!(
            "Extracted {} chunks from {} pages",
            self.ctx.workspace.chunk_count(),
            pages.len()
        );

        let Some(root) = self.struct_tree_root() else {
            log::debug!("Document has no structure tree");
            return Ok(());
        };

        if self.ctx.options.classify_semantics {
            AccumulatedChecker::new().check_semantic_tree(&root)?;
        }

        let name = match (self.ctx.options.contrast_check, self.file_name()) {
            (ContrastCheck::Never, _) => None,
            (_, Some(name)) => Some(name.to_string()),
            (ContrastCheck::Always, None) => Some(UNNAMED_DOCUMENT.to_string()),
            (ContrastCheck::WhenNamed, None) => None,
        };
        if let Some(name) = name {
            ContrastChecker::new(name).check_semantic_tree(&root)?;
        }
        Ok(())
    }

    pub fn context(&self) -> &Rc<ModelContext> {
        &self.ctx
    }

    pub fn workspace(&self) -> &Workspace {
        &self.ctx.workspace
    }

    pub fn file_name(&self) -> Option<&str> {
        self.ctx.source.file_name()
    }

    /// Pages in document order.
    pub fn pages(&self) -> Rc<[Rc<SaPage>]> {
        self.pages.get_or_init(|| self.collect_pages())
    }

    pub fn page_count(&self) -> usize {
        self.ctx.page_keys().len()
    }

    /// The structure tree root, when the catalog has one.
    pub fn struct_tree_root(&self) -> Option<Rc<SaStructTreeRoot>> {
        self.struct_tree_root
            .get_or_init(|| {
                let raw = self.catalog.get("StructTreeRoot")?;
                let dict = self.ctx.source.resolve_dict(raw)?;
                Some(Rc::new(SaStructTreeRoot::new(
                    Rc::clone(&self.ctx),
                    raw.as_reference(),
                    dict,
                )))
            })
            .clone()
    }

    /// Whether the document declares itself tagged (`/MarkInfo /Marked`).
    pub fn is_tagged(&self) -> bool {
        self.ctx
            .source
            .get_resolved(&self.catalog, "MarkInfo")
            .and_then(|m| m.as_dict().cloned())
            .and_then(|m| self.ctx.source.get_resolved(&m, "Marked"))
            .and_then(|m| m.as_bool())
            .unwrap_or(false)
    }

    fn collect_pages(&self) -> Vec<Rc<SaPage>> {
        self.ctx
            .page_keys()
            .iter()
            .filter_map(|key| {
                let dict = self.ctx.source.object(*key)?.as_dict()?.clone();
                Some(Rc::new(SaPage::new(Rc::clone(&self.ctx), *key, dict)))
            })
            .collect()
    }
}

impl ModelObject for SaDocument {
    fn object_type(&self) -> &'static str {
        "SAPDFDocument"
    }

    fn link_names(&self) -> &'static [&'static str] {
        DOCUMENT_LINKS
    }

    fn linked_objects(&self, link: &str) -> LinkedObjects {
        match link {
            "pages" => self.pages.erased(|| self.collect_pages()),
            "StructTreeRoot" => self
                .struct_tree_link
                .get_or_init(|| {
                    self.struct_tree_root()
                        .into_iter()
                        .map(|root| root as ModelRef)
                        .collect()
                })
                .clone(),
            _ => super::empty_links(),
        }
    }

    fn property_names(&self) -> &'static [&'static str] {
        DOCUMENT_PROPERTIES
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "pageCount" => Some(PropertyValue::Integer(self.page_count() as i64)),
            "isTagged" => Some(PropertyValue::Boolean(self.is_tagged())),
            "hasFileName" => Some(PropertyValue::Boolean(self.file_name().is_some())),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl std::fmt::Debug for SaDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaDocument")
            .field("pages", &self.page_count())
            .field("file_name", &self.file_name())
            .field("catalog", &self.catalog.get("Type").map(CosObject::to_string))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cos::MemorySource;

    #[test]
    fn test_missing_catalog() {
        let result = SaDocument::build(Rc::new(MemorySource::empty()), ValidationOptions::default());
        assert!(matches!(result, Err(Error::CannotBuildModel(_))));
    }

    #[test]
    fn test_missing_page_tree() {
        let mut source = MemorySource::empty();
        let catalog = source.add(CosDict::new().with("Type", CosObject::name("Catalog")));
        source.set_root(catalog);
        let result = SaDocument::build(Rc::new(source), ValidationOptions::default());
        assert!(matches!(result, Err(Error::CannotBuildModel(_))));
    }

    #[test]
    fn test_untagged_document() {
        let mut source = MemorySource::new();
        source.add_page(CosDict::new(), b"BT /F1 12 Tf (A) Tj ET");
        let doc = SaDocument::build(Rc::new(source), ValidationOptions::default()).unwrap();

        assert_eq!(doc.page_count(), 1);
        assert!(doc.struct_tree_root().is_none());
        assert!(doc.linked_objects("StructTreeRoot").is_empty());
        assert_eq!(doc.workspace().chunk_count(), 1);
        assert_eq!(doc.property("isTagged"), Some(PropertyValue::Boolean(false)));
        assert_eq!(doc.property("hasFileName"), Some(PropertyValue::Boolean(false)));
    }

    #[test]
    fn test_links_are_cached() {
        let mut source = MemorySource::new();
        source.add_page(CosDict::new(), b"");
        source.set_catalog_entry("StructTreeRoot", CosDict::new().with("Type", CosObject::name("StructTreeRoot")));
        let doc = SaDocument::build(Rc::new(source), ValidationOptions::default()).unwrap();

        let pages = doc.linked_objects("pages");
        assert_eq!(pages.len(), 1);
        assert!(Rc::ptr_eq(&pages, &doc.linked_objects("pages")));
        let root = doc.linked_objects("StructTreeRoot");
        assert_eq!(root.len(), 1);
        assert!(Rc::ptr_eq(&root, &doc.linked_objects("StructTreeRoot")));
        assert!(doc.linked_objects("nope").is_empty());
    }
}
