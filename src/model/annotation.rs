//! Annotation nodes.

use std::any::Any;
use std::rc::Rc;

use once_cell::unsync::OnceCell;

use super::factory::VariantTable;
use super::{ModelContext, ModelObject, PropertyValue};
use crate::cos::{CosDict, CosObject, ObjectKey};
use crate::geometry::{escapes_crop_box, BoundingBox};
use crate::semantic::{looks_like_link, text_for};

/// Annotation variant, chosen once from `/Subtype`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationKind {
    Generic,
    Link,
}

static ANNOTATION_KINDS: VariantTable<&str, AnnotationKind> =
    VariantTable::new(&[("Link", AnnotationKind::Link)], AnnotationKind::Generic);

impl AnnotationKind {
    pub fn from_subtype(subtype: Option<&str>) -> Self {
        ANNOTATION_KINDS.select(subtype)
    }

    pub fn object_type(self) -> &'static str {
        match self {
            AnnotationKind::Generic => "SAAnnotation",
            AnnotationKind::Link => "SALinkAnnotation",
        }
    }
}

const ANNOTATION_PROPERTIES: &[&str] = &[
    "textValue",
    "hasLinkValue",
    "isOutsideCropBox",
    "Contents",
    "F",
    "Subtype",
];

const LINK_ANNOTATION_PROPERTIES: &[&str] = &[
    "textValue",
    "hasLinkValue",
    "isOutsideCropBox",
    "Contents",
    "F",
    "Subtype",
    "URI",
];

/// An annotation of a page, with the text shown under its rectangle.
pub struct SaAnnotation {
    ctx: Rc<ModelContext>,
    key: Option<ObjectKey>,
    dict: CosDict,
    kind: AnnotationKind,
    page_key: ObjectKey,
    page_number: u32,
    crop_box: [f64; 4],
    text_value: OnceCell<String>,
}

impl SaAnnotation {
    pub(crate) fn new(
        ctx: Rc<ModelContext>,
        key: Option<ObjectKey>,
        dict: CosDict,
        page_key: ObjectKey,
        page_number: u32,
        crop_box: [f64; 4],
    ) -> Self {
        let kind = AnnotationKind::from_subtype(dict.get_name("Subtype"));
        Self {
            ctx,
            key,
            dict,
            kind,
            page_key,
            page_number,
            crop_box,
            text_value: OnceCell::new(),
        }
    }

    pub fn kind(&self) -> AnnotationKind {
        self.kind
    }

    pub fn subtype(&self) -> Option<&str> {
        self.dict.get_name("Subtype")
    }

    /// The `/Rect` numbers, when present and numeric.
    pub fn rect(&self) -> Option<Vec<f64>> {
        self.ctx.source.get_numbers(&self.dict, "Rect")
    }

    /// Text of the page chunks overlapping the annotation rectangle.
    ///
    /// Empty when the annotation has no usable rectangle.
    pub fn text_value(&self) -> &str {
        self.text_value.get_or_init(|| {
            self.rect()
                .and_then(|rect| BoundingBox::from_rect(self.page_number, &rect))
                .map(|region| text_for(&self.ctx.workspace, Some(self.page_key), &region))
                .unwrap_or_default()
        })
    }

    /// Whether the text under the annotation parses as a URI reference.
    pub fn has_link_value(&self) -> bool {
        looks_like_link(self.text_value())
    }

    /// Whether the rectangle lies entirely outside the page crop box.
    pub fn is_outside_crop_box(&self) -> Option<bool> {
        escapes_crop_box(&self.crop_box, &self.rect()?)
    }

    pub fn contents(&self) -> Option<String> {
        self.ctx
            .source
            .get_resolved(&self.dict, "Contents")
            .and_then(|c| c.as_text())
    }

    /// Annotation flags (`/F`).
    pub fn flags(&self) -> Option<i64> {
        self.ctx
            .source
            .get_resolved(&self.dict, "F")
            .and_then(|f| f.as_i64())
    }

    /// Target of a `/URI` action; only link annotations have one.
    pub fn uri(&self) -> Option<String> {
        if self.kind != AnnotationKind::Link {
            return None;
        }
        let action = self
            .ctx
            .source
            .get_resolved(&self.dict, "A")
            .and_then(|a| a.as_dict().cloned())?;
        if action.get_name("S") != Some("URI") {
            return None;
        }
        self.ctx
            .source
            .get_resolved(&action, "URI")
            .and_then(|u| u.as_text())
    }
}

impl ModelObject for SaAnnotation {
    fn object_type(&self) -> &'static str {
        self.kind.object_type()
    }

    fn id(&self) -> Option<ObjectKey> {
        self.key
    }

    fn property_names(&self) -> &'static [&'static str] {
        match self.kind {
            AnnotationKind::Generic => ANNOTATION_PROPERTIES,
            AnnotationKind::Link => LINK_ANNOTATION_PROPERTIES,
        }
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        let value = match name {
            "textValue" => self.text_value().into(),
            "hasLinkValue" => self.has_link_value().into(),
            "isOutsideCropBox" => self.is_outside_crop_box().into(),
            "Contents" => self.contents().into(),
            "F" => self.flags().into(),
            "Subtype" => self.subtype().into(),
            "URI" if self.kind == AnnotationKind::Link => self.uri().into(),
            _ => return None,
        };
        Some(value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Resolve the `/Annots` of a page into annotation dictionaries.
pub(crate) fn annotation_dicts(ctx: &ModelContext, page: &CosDict) -> Vec<(Option<ObjectKey>, CosDict)> {
    let Some(CosObject::Array(entries)) = ctx.source.get_resolved(page, "Annots") else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let dict = ctx.source.resolve_dict(entry)?;
            Some((entry.as_reference(), dict))
        })
        .collect()
}
