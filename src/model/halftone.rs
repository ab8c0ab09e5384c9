//! Halftone nodes.

use std::any::Any;
use std::rc::Rc;

use super::factory::VariantTable;
use super::{LinkCell, LinkedObjects, ModelContext, ModelObject, PropertyValue};
use crate::cos::{CosObject, ObjectKey};

/// Halftone variant, chosen once from `/HalftoneType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalftoneKind {
    /// Type 1
    Screen,
    /// Type 5, one nested halftone per colorant
    Composite,
    /// Type 6
    Threshold,
    /// Type 10
    AngledThreshold,
    /// Type 16
    ExtendedThreshold,
    Unknown,
}

static HALFTONE_KINDS: VariantTable<i64, HalftoneKind> = VariantTable::new(
    &[
        (1, HalftoneKind::Screen),
        (5, HalftoneKind::Composite),
        (6, HalftoneKind::Threshold),
        (10, HalftoneKind::AngledThreshold),
        (16, HalftoneKind::ExtendedThreshold),
    ],
    HalftoneKind::Unknown,
);

const HALFTONE_LINKS: &[&str] = &["halftones"];
const HALFTONE_PROPERTIES: &[&str] = &[
    "HalftoneType",
    "HalftoneName",
    "colorantName",
    "TransferFunction",
];

/// A halftone dictionary or stream, or the `/Default` halftone name.
pub struct PdHalftone {
    ctx: Rc<ModelContext>,
    key: Option<ObjectKey>,
    object: CosObject,
    colorant_name: Option<String>,
    kind: HalftoneKind,
    halftones: LinkCell<PdHalftone>,
}

impl PdHalftone {
    /// Wrap a resolved halftone object. `key` is its identity when indirect.
    pub(crate) fn new(
        ctx: Rc<ModelContext>,
        key: Option<ObjectKey>,
        object: CosObject,
        colorant_name: Option<String>,
    ) -> Self {
        let kind = HALFTONE_KINDS.select(halftone_type(&ctx, &object).as_ref());
        Self {
            ctx,
            key,
            object,
            colorant_name,
            kind,
            halftones: LinkCell::new(),
        }
    }

    pub fn kind(&self) -> HalftoneKind {
        self.kind
    }

    /// `/HalftoneType`; the `/Default` name counts as type 1.
    pub fn halftone_type(&self) -> Option<i64> {
        halftone_type(&self.ctx, &self.object)
    }

    /// `/HalftoneName`; never present for the `/Default` name.
    pub fn halftone_name(&self) -> Option<String> {
        let dict = self.object.as_dict()?;
        self.ctx
            .source
            .get_resolved(dict, "HalftoneName")
            .and_then(|n| n.as_text())
    }

    /// Colorant this halftone is registered under in its composite parent.
    pub fn colorant_name(&self) -> Option<&str> {
        self.colorant_name.as_deref()
    }

    /// `/TransferFunction`: the name itself for names, otherwise a
    /// serialized form of the object.
    pub fn transfer_function(&self) -> Option<String> {
        let dict = self.object.as_dict()?;
        match self.ctx.source.get_resolved(dict, "TransferFunction")? {
            CosObject::Name(name) => Some(name.to_string()),
            other => Some(other.to_string()),
        }
    }

    /// Nested halftones of a type 5 halftone, in key order.
    pub fn halftones(&self) -> Rc<[Rc<PdHalftone>]> {
        self.halftones.get_or_init(|| self.collect_halftones())
    }

    fn collect_halftones(&self) -> Vec<Rc<PdHalftone>> {
        if self.halftone_type() != Some(5) {
            return Vec::new();
        }
        let Some(dict) = self.object.as_dict() else {
            return Vec::new();
        };
        dict.iter()
            .filter_map(|(colorant, value)| {
                let resolved = self.ctx.source.resolve(value);
                resolved.is_dictionary_based().then(|| {
                    Rc::new(PdHalftone::new(
                        Rc::clone(&self.ctx),
                        value.as_reference(),
                        resolved,
                        Some(colorant.to_string()),
                    ))
                })
            })
            .collect()
    }
}

fn halftone_type(ctx: &ModelContext, object: &CosObject) -> Option<i64> {
    match object {
        CosObject::Name(name) if &**name == "Default" => Some(1),
        _ => {
            let dict = object.as_dict()?;
            ctx.source
                .get_resolved(dict, "HalftoneType")
                .and_then(|t| t.as_i64())
        }
    }
}

impl ModelObject for PdHalftone {
    fn object_type(&self) -> &'static str {
        "PDHalftone"
    }

    fn id(&self) -> Option<ObjectKey> {
        self.key
    }

    fn link_names(&self) -> &'static [&'static str] {
        HALFTONE_LINKS
    }

    fn linked_objects(&self, link: &str) -> LinkedObjects {
        match link {
            "halftones" => self.halftones.erased(|| self.collect_halftones()),
            _ => super::empty_links(),
        }
    }

    fn property_names(&self) -> &'static [&'static str] {
        HALFTONE_PROPERTIES
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        let value = match name {
            "HalftoneType" => self.halftone_type().into(),
            "HalftoneName" => self.halftone_name().into(),
            "colorantName" => self.colorant_name().into(),
            "TransferFunction" => self.transfer_function().into(),
            _ => return None,
        };
        Some(value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
