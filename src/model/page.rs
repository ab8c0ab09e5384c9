//! Page nodes.

use std::any::Any;
use std::rc::Rc;

use once_cell::unsync::OnceCell;

use super::annotation::{annotation_dicts, SaAnnotation};
use super::halftone::PdHalftone;
use super::{LinkCell, LinkedObjects, ModelContext, ModelObject, PropertyValue};
use crate::content::ChunkExtractor;
use crate::cos::{inherited_attribute, CosDict, CosObject, ObjectKey};
use crate::error::{Error, Result};
use crate::geometry::DEFAULT_PAGE_BOX;
use crate::options::ErrorMode;

const PAGE_LINKS: &[&str] = &["annots", "halftones"];
const PAGE_PROPERTIES: &[&str] = &["pageNumber", "annotsCount"];

/// A page of the document.
pub struct SaPage {
    ctx: Rc<ModelContext>,
    key: ObjectKey,
    dict: CosDict,
    page_number: u32,
    crop_box: OnceCell<[f64; 4]>,
    annots: LinkCell<SaAnnotation>,
    halftones: LinkCell<PdHalftone>,
}

impl SaPage {
    pub(crate) fn new(ctx: Rc<ModelContext>, key: ObjectKey, dict: CosDict) -> Self {
        let page_number = ctx.page_number(key).unwrap_or(0);
        Self {
            ctx,
            key,
            dict,
            page_number,
            crop_box: OnceCell::new(),
            annots: LinkCell::new(),
            halftones: LinkCell::new(),
        }
    }

    pub fn key(&self) -> ObjectKey {
        self.key
    }

    /// Page number (1-indexed).
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn dict(&self) -> &CosDict {
        &self.dict
    }

    /// Extract this page's content chunks into the workspace.
    ///
    /// Runs at most once per page per document pass. Undecodable content
    /// fails the call in strict mode and yields no chunks in lenient mode.
    pub fn parse_chunks(&self) -> Result<()> {
        if !self.ctx.workspace.mark_extracted(self.key) {
            return Ok(());
        }
        let extractor = ChunkExtractor::new(&*self.ctx.source)
            .with_max_form_depth(self.ctx.options.max_form_depth);
        match extractor.extract(self.key, self.page_number, &self.dict) {
            Ok(chunks) => {
                self.ctx.workspace.register(self.key, chunks);
                Ok(())
            }
            Err(e) => match self.ctx.options.error_mode {
                ErrorMode::Strict => Err(Error::CannotBuildModel(format!(
                    "page {}: {}",
                    self.page_number, e
                ))),
                ErrorMode::Lenient => {
                    log::warn!("Skipping content of page {}: {}", self.page_number, e);
                    Ok(())
                }
            },
        }
    }

    /// Effective crop box: `/CropBox`, else `/MediaBox`, else US Letter.
    pub fn crop_box(&self) -> [f64; 4] {
        *self
            .crop_box
            .get_or_init(|| crop_box_of(&self.ctx, &self.dict))
    }

    pub fn annotations(&self) -> Rc<[Rc<SaAnnotation>]> {
        self.annots.get_or_init(|| self.collect_annotations())
    }

    /// Halftones set through the page's graphics state parameter dictionaries.
    pub fn halftones(&self) -> Rc<[Rc<PdHalftone>]> {
        self.halftones.get_or_init(|| self.collect_halftones())
    }

    fn collect_annotations(&self) -> Vec<Rc<SaAnnotation>> {
        let crop_box = self.crop_box();
        annotation_dicts(&self.ctx, &self.dict)
            .into_iter()
            .map(|(key, dict)| {
                Rc::new(SaAnnotation::new(
                    Rc::clone(&self.ctx),
                    key,
                    dict,
                    self.key,
                    self.page_number,
                    crop_box,
                ))
            })
            .collect()
    }

    fn collect_halftones(&self) -> Vec<Rc<PdHalftone>> {
        let source = &*self.ctx.source;
        let Some(states) = inherited_attribute(source, &self.dict, "Resources")
            .and_then(|r| r.as_dict().cloned())
            .and_then(|r| source.get_resolved(&r, "ExtGState"))
            .and_then(|g| g.as_dict().cloned())
        else {
            return Vec::new();
        };

        states
            .iter()
            .filter_map(|(_, state)| source.resolve_dict(state))
            .filter_map(|state| {
                let raw = state.get("HT")?.clone();
                let halftone = source.resolve(&raw);
                match &halftone {
                    CosObject::Name(name) if &**name == "Default" => {}
                    h if h.is_dictionary_based() => {}
                    _ => return None,
                }
                Some(Rc::new(PdHalftone::new(
                    Rc::clone(&self.ctx),
                    raw.as_reference(),
                    halftone,
                    None,
                )))
            })
            .collect()
    }
}

/// Crop box of a page dictionary: `/CropBox`, else `/MediaBox` (both
/// inheritable), else US Letter.
pub(crate) fn crop_box_of(ctx: &ModelContext, page: &CosDict) -> [f64; 4] {
    ["CropBox", "MediaBox"]
        .iter()
        .find_map(|key| {
            let rect = inherited_attribute(&*ctx.source, page, key)?.as_number_array()?;
            match rect.as_slice() {
                [x0, y0, x1, y1, ..] => Some([*x0, *y0, *x1, *y1]),
                _ => None,
            }
        })
        .unwrap_or(DEFAULT_PAGE_BOX)
}

impl ModelObject for SaPage {
    fn object_type(&self) -> &'static str {
        "SAPage"
    }

    fn id(&self) -> Option<ObjectKey> {
        Some(self.key)
    }

    fn link_names(&self) -> &'static [&'static str] {
        PAGE_LINKS
    }

    fn linked_objects(&self, link: &str) -> LinkedObjects {
        match link {
            "annots" => self.annots.erased(|| self.collect_annotations()),
            "halftones" => self.halftones.erased(|| self.collect_halftones()),
            _ => super::empty_links(),
        }
    }

    fn property_names(&self) -> &'static [&'static str] {
        PAGE_PROPERTIES
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "pageNumber" => Some(PropertyValue::Integer(i64::from(self.page_number))),
            "annotsCount" => Some(PropertyValue::Integer(self.annotations().len() as i64)),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
