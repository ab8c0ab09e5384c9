//! Structure tree nodes.
//!
//! The structure tree root and its elements are built lazily from the
//! catalog's `/StructTreeRoot`. Elements carry their standard structural
//! role (resolved through `/RoleMap`), their marked content on the pages
//! and the semantic results written by the checkers.

use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use once_cell::unsync::OnceCell;
use serde::{Serialize, Serializer};

use super::annotation::SaAnnotation;
use super::factory::VariantTable;
use super::page::crop_box_of;
use super::{LinkCell, LinkedObjects, ModelContext, ModelObject, PropertyValue};
use crate::content::ContentChunk;
use crate::cos::{CosDict, CosObject, ObjectKey};
use crate::geometry::BoundingBox;

/// Default nesting limit for structure elements below the tree root.
pub const DEFAULT_MAX_STRUCT_DEPTH: usize = 256;

macro_rules! struct_roles {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Standard structural role of an element.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum StructRole {
            $($variant,)*
            /// A type that does not map to any standard type
            NonStandard,
        }

        static STRUCT_ROLES: VariantTable<&str, StructRole> = VariantTable::new(
            &[$(($name, StructRole::$variant),)*],
            StructRole::NonStandard,
        );

        impl StructRole {
            /// Model type tag of elements with this role (e.g., "SAQuote").
            pub fn object_type(self) -> &'static str {
                match self {
                    $(StructRole::$variant => concat!("SA", $name),)*
                    StructRole::NonStandard => "SANonStandard",
                }
            }
        }
    };
}

struct_roles! {
    Document => "Document",
    DocumentFragment => "DocumentFragment",
    Part => "Part",
    Art => "Art",
    Sect => "Sect",
    Div => "Div",
    Aside => "Aside",
    BlockQuote => "BlockQuote",
    Caption => "Caption",
    Toc => "TOC",
    Toci => "TOCI",
    Index => "Index",
    NonStruct => "NonStruct",
    Private => "Private",
    Title => "Title",
    P => "P",
    H => "H",
    H1 => "H1",
    H2 => "H2",
    H3 => "H3",
    H4 => "H4",
    H5 => "H5",
    H6 => "H6",
    L => "L",
    Li => "LI",
    Lbl => "Lbl",
    LBody => "LBody",
    Table => "Table",
    Tr => "TR",
    Th => "TH",
    Td => "TD",
    THead => "THead",
    TBody => "TBody",
    TFoot => "TFoot",
    Span => "Span",
    Quote => "Quote",
    Note => "Note",
    FeNote => "FENote",
    Reference => "Reference",
    BibEntry => "BibEntry",
    Code => "Code",
    Link => "Link",
    Annot => "Annot",
    Em => "Em",
    Strong => "Strong",
    Sub => "Sub",
    Ruby => "Ruby",
    Warichu => "Warichu",
    Figure => "Figure",
    Formula => "Formula",
    Form => "Form",
    Artifact => "Artifact",
}

impl StructRole {
    /// Role for a standard structure type name.
    pub fn from_name(name: Option<&str>) -> Self {
        STRUCT_ROLES.select(name)
    }

    /// Standard type name; `None` for non-standard roles.
    pub fn name(self) -> Option<&'static str> {
        STRUCT_ROLES.key_of(self).copied()
    }

    pub fn is_standard(self) -> bool {
        self != StructRole::NonStandard
    }

    /// Heading level of `H1`..`H6`.
    pub fn heading_level(self) -> Option<u8> {
        match self {
            StructRole::H1 => Some(1),
            StructRole::H2 => Some(2),
            StructRole::H3 => Some(3),
            StructRole::H4 => Some(4),
            StructRole::H5 => Some(5),
            StructRole::H6 => Some(6),
            _ => None,
        }
    }

    /// Roles whose children count as table children.
    pub fn is_table_part(self) -> bool {
        matches!(
            self,
            StructRole::Table
                | StructRole::THead
                | StructRole::TBody
                | StructRole::TFoot
                | StructRole::Tr
        )
    }

    /// Inline-level roles.
    pub fn is_inline(self) -> bool {
        matches!(
            self,
            StructRole::Span
                | StructRole::Quote
                | StructRole::Note
                | StructRole::FeNote
                | StructRole::Reference
                | StructRole::BibEntry
                | StructRole::Code
                | StructRole::Link
                | StructRole::Annot
                | StructRole::Em
                | StructRole::Strong
                | StructRole::Sub
                | StructRole::Ruby
                | StructRole::Warichu
                | StructRole::Lbl
        )
    }

    /// How well a detected semantic type fits this role, in `0.0..=1.0`.
    ///
    /// `None` for grouping roles that do not constrain their content.
    pub fn semantic_score(self, semantic: SemanticType) -> Option<f64> {
        let score = match (self, semantic) {
            (StructRole::H, SemanticType::Heading(_)) => 1.0,
            (role, SemanticType::Heading(level)) if role.heading_level().is_some() => {
                if role.heading_level() == Some(level) {
                    1.0
                } else {
                    0.5
                }
            }
            (StructRole::P | StructRole::Title | StructRole::Caption | StructRole::LBody, SemanticType::Paragraph) => 1.0,
            (StructRole::L, SemanticType::List) => 1.0,
            (StructRole::Li, SemanticType::ListItem) => 1.0,
            (StructRole::Table, SemanticType::Table) => 1.0,
            (StructRole::Tr, SemanticType::TableRow) => 1.0,
            (StructRole::Td | StructRole::Th, SemanticType::TableCell) => 1.0,
            (StructRole::Figure | StructRole::Formula, SemanticType::Figure) => 1.0,
            (StructRole::Link, SemanticType::Link) => 1.0,
            (role, SemanticType::Span) if role.is_inline() => 1.0,
            (role, _) if role.expects_content() => 0.0,
            _ => return None,
        };
        Some(score)
    }

    fn expects_content(self) -> bool {
        self.heading_level().is_some()
            || self.is_inline()
            || matches!(
                self,
                StructRole::H
                    | StructRole::P
                    | StructRole::Title
                    | StructRole::L
                    | StructRole::Li
                    | StructRole::Table
                    | StructRole::Tr
                    | StructRole::Td
                    | StructRole::Th
                    | StructRole::Figure
                    | StructRole::Formula
            )
    }
}

/// Semantic type detected for an element from its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticType {
    /// Heading with level 1-6
    Heading(u8),
    Paragraph,
    Span,
    Link,
    List,
    ListItem,
    Table,
    TableRow,
    TableCell,
    Figure,
    /// Container of mixed block content
    Group,
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::Heading(level) => write!(f, "H{}", level),
            SemanticType::Paragraph => write!(f, "P"),
            SemanticType::Span => write!(f, "Span"),
            SemanticType::Link => write!(f, "Link"),
            SemanticType::List => write!(f, "L"),
            SemanticType::ListItem => write!(f, "LI"),
            SemanticType::Table => write!(f, "Table"),
            SemanticType::TableRow => write!(f, "TR"),
            SemanticType::TableCell => write!(f, "TD"),
            SemanticType::Figure => write!(f, "Figure"),
            SemanticType::Group => write!(f, "Div"),
        }
    }
}

impl Serialize for SemanticType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Results written onto an element by the semantic checkers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeSemantics {
    pub semantic_type: Option<SemanticType>,
    pub correct_semantic_score: Option<f64>,
    pub contrast_ratio: Option<f64>,
}

/// Custom structure type → mapped type, from `/RoleMap`.
#[derive(Debug, Default)]
struct RoleMap {
    entries: HashMap<String, String>,
}

impl RoleMap {
    fn from_dict(ctx: &ModelContext, root: &CosDict) -> Self {
        let entries = ctx
            .source
            .get_resolved(root, "RoleMap")
            .and_then(|m| m.as_dict().cloned())
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| {
                        let target = ctx.source.resolve(v);
                        Some((k.to_string(), target.as_name()?.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { entries }
    }

    /// Follow the mapping until a standard type is reached.
    fn resolve(&self, name: Option<&str>) -> StructRole {
        let mut current = name;
        let mut seen = HashSet::new();
        while let Some(n) = current {
            let role = StructRole::from_name(Some(n));
            if role.is_standard() || !seen.insert(n) {
                return role;
            }
            current = self.entries.get(n).map(String::as_str);
        }
        StructRole::NonStandard
    }
}

/// An entry of an element's `/K`, in document order.
enum Kid {
    /// Marked content `mcid` on `page`
    Content { page: Option<ObjectKey>, mcid: i64 },
    Element(Rc<SaStructElem>),
    /// Object reference to an annotation
    Annotation(Rc<SaAnnotation>),
}

/// Indirect elements from the tree root down to an element, innermost first.
struct PathLink {
    key: ObjectKey,
    parent: Option<Rc<PathLink>>,
}

fn on_path(path: &Option<Rc<PathLink>>, key: ObjectKey) -> bool {
    let mut current = path.as_deref();
    while let Some(link) = current {
        if link.key == key {
            return true;
        }
        current = link.parent.as_deref();
    }
    false
}

/// Shared state for elements of one tree.
struct TreeShared {
    ctx: Rc<ModelContext>,
    role_map: RoleMap,
}

const ROOT_LINKS: &[&str] = &["children"];
const ROOT_PROPERTIES: &[&str] = &["childrenCount", "hasRoleMap"];

/// The structure tree root.
pub struct SaStructTreeRoot {
    shared: Rc<TreeShared>,
    key: Option<ObjectKey>,
    dict: CosDict,
    children: LinkCell<SaStructElem>,
}

impl SaStructTreeRoot {
    pub(crate) fn new(ctx: Rc<ModelContext>, key: Option<ObjectKey>, dict: CosDict) -> Self {
        let role_map = RoleMap::from_dict(&ctx, &dict);
        Self {
            shared: Rc::new(TreeShared { ctx, role_map }),
            key,
            dict,
            children: LinkCell::new(),
        }
    }

    pub fn context(&self) -> &Rc<ModelContext> {
        &self.shared.ctx
    }

    pub fn has_role_map(&self) -> bool {
        !self.shared.role_map.entries.is_empty()
    }

    /// Top-level structure elements.
    pub fn children(&self) -> Rc<[Rc<SaStructElem>]> {
        self.children.get_or_init(|| self.collect_children())
    }

    /// Visit every element depth-first, parents before children.
    pub fn for_each_element(&self, f: &mut dyn FnMut(&SaStructElem)) {
        let mut stack: Vec<Rc<SaStructElem>> = self.children().iter().rev().cloned().collect();
        while let Some(elem) = stack.pop() {
            f(&elem);
            stack.extend(elem.children().iter().rev().cloned());
        }
    }

    fn collect_children(&self) -> Vec<Rc<SaStructElem>> {
        let path = self.key.map(|key| Rc::new(PathLink { key, parent: None }));
        parse_kids(&self.shared, &self.dict, None, None, &path, 1)
            .into_iter()
            .filter_map(|kid| match kid {
                Kid::Element(elem) => Some(elem),
                _ => None,
            })
            .collect()
    }
}

impl ModelObject for SaStructTreeRoot {
    fn object_type(&self) -> &'static str {
        "SAStructTreeRoot"
    }

    fn id(&self) -> Option<ObjectKey> {
        self.key
    }

    fn link_names(&self) -> &'static [&'static str] {
        ROOT_LINKS
    }

    fn linked_objects(&self, link: &str) -> LinkedObjects {
        match link {
            "children" => self.children.erased(|| self.collect_children()),
            _ => super::empty_links(),
        }
    }

    fn property_names(&self) -> &'static [&'static str] {
        ROOT_PROPERTIES
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "childrenCount" => Some(PropertyValue::Integer(self.children().len() as i64)),
            "hasRoleMap" => Some(PropertyValue::Boolean(self.has_role_map())),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

const ELEM_LINKS: &[&str] = &["children", "annots"];
const ELEM_PROPERTIES: &[&str] = &[
    "standardType",
    "valueS",
    "textValue",
    "isTableChild",
    "isListChild",
    "semanticType",
    "correctSemanticScore",
    "contrastRatio",
];

/// A structure element.
pub struct SaStructElem {
    shared: Rc<TreeShared>,
    key: Option<ObjectKey>,
    dict: CosDict,
    role: StructRole,
    page: Option<ObjectKey>,
    path: Option<Rc<PathLink>>,
    depth: usize,
    is_table_child: bool,
    is_list_child: bool,
    kids: OnceCell<Vec<Kid>>,
    children: LinkCell<SaStructElem>,
    annots: LinkCell<SaAnnotation>,
    text: OnceCell<String>,
    bounding_box: OnceCell<Option<BoundingBox>>,
    semantics: RefCell<NodeSemantics>,
}

impl SaStructElem {
    fn new(
        shared: Rc<TreeShared>,
        key: Option<ObjectKey>,
        dict: CosDict,
        parent_role: Option<StructRole>,
        parent_page: Option<ObjectKey>,
        path: Option<Rc<PathLink>>,
        depth: usize,
    ) -> Self {
        let role = shared.role_map.resolve(dict.get_name("S"));
        let page = dict
            .get("Pg")
            .and_then(CosObject::as_reference)
            .or(parent_page);
        Self {
            shared,
            key,
            dict,
            role,
            page,
            path,
            depth,
            is_table_child: parent_role.is_some_and(StructRole::is_table_part),
            is_list_child: parent_role == Some(StructRole::L),
            kids: OnceCell::new(),
            children: LinkCell::new(),
            annots: LinkCell::new(),
            text: OnceCell::new(),
            bounding_box: OnceCell::new(),
            semantics: RefCell::new(NodeSemantics::default()),
        }
    }

    pub fn role(&self) -> StructRole {
        self.role
    }

    /// The structure type as written (`/S`).
    pub fn structure_type(&self) -> Option<&str> {
        self.dict.get_name("S")
    }

    /// Page the element's content lives on, inherited from the parent.
    pub fn page(&self) -> Option<ObjectKey> {
        self.page
    }

    /// Nesting level below the tree root, starting at 1.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_table_child(&self) -> bool {
        self.is_table_child
    }

    pub fn is_list_child(&self) -> bool {
        self.is_list_child
    }

    pub fn children(&self) -> Rc<[Rc<SaStructElem>]> {
        self.children.get_or_init(|| self.collect_children())
    }

    pub fn annotations(&self) -> Rc<[Rc<SaAnnotation>]> {
        self.annots.get_or_init(|| self.collect_annotations())
    }

    /// Marked-content ids of this element, with their pages.
    pub fn mcids(&self) -> Vec<(Option<ObjectKey>, i64)> {
        self.kids()
            .iter()
            .filter_map(|kid| match kid {
                Kid::Content { page, mcid } => Some((*page, *mcid)),
                _ => None,
            })
            .collect()
    }

    /// Chunks of this element's own marked content, in page order.
    pub fn own_chunks(&self) -> Vec<ContentChunk> {
        let workspace = &self.shared.ctx.workspace;
        let mut chunks = Vec::new();
        for (page, mcid) in self.mcids() {
            let Some(page) = page else { continue };
            chunks.extend(workspace.marked_chunks(page, mcid));
        }
        chunks
    }

    /// Text of the element: own marked content and children, in `/K` order,
    /// separated by spaces.
    pub fn text(&self) -> &str {
        self.text.get_or_init(|| {
            let workspace = &self.shared.ctx.workspace;
            let mut parts: Vec<String> = Vec::new();
            for kid in self.kids() {
                let part = match kid {
                    Kid::Content {
                        page: Some(page),
                        mcid,
                    } => workspace
                        .marked_chunks(*page, *mcid)
                        .iter()
                        .filter_map(ContentChunk::as_text)
                        .map(|t| t.value.as_str())
                        .collect::<String>(),
                    Kid::Element(child) => child.text().to_string(),
                    _ => continue,
                };
                let part = part.trim();
                if !part.is_empty() {
                    parts.push(part.to_string());
                }
            }
            parts.join(" ")
        })
    }

    /// `/BBox` layout attribute, else the union of the content boxes.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        *self.bounding_box.get_or_init(|| {
            self.attribute_bbox().or_else(|| {
                let own = self.own_chunks().into_iter().map(|c| *c.bounding_box());
                let nested = self.children().iter().filter_map(|c| c.bounding_box()).collect::<Vec<_>>();
                own.chain(nested).reduce(|a, b| a.union(&b))
            })
        })
    }

    pub fn semantics(&self) -> NodeSemantics {
        self.semantics.borrow().clone()
    }

    pub(crate) fn set_semantic_type(&self, semantic: Option<SemanticType>) {
        let mut semantics = self.semantics.borrow_mut();
        semantics.semantic_type = semantic;
        semantics.correct_semantic_score = semantic.and_then(|s| self.role.semantic_score(s));
    }

    pub(crate) fn set_contrast_ratio(&self, ratio: Option<f64>) {
        self.semantics.borrow_mut().contrast_ratio = ratio;
    }

    fn kids(&self) -> &[Kid] {
        self.kids.get_or_init(|| {
            parse_kids(
                &self.shared,
                &self.dict,
                Some(self.role),
                self.page,
                &self.path,
                self.depth + 1,
            )
        })
    }

    fn collect_children(&self) -> Vec<Rc<SaStructElem>> {
        self.kids()
            .iter()
            .filter_map(|kid| match kid {
                Kid::Element(elem) => Some(Rc::clone(elem)),
                _ => None,
            })
            .collect()
    }

    fn collect_annotations(&self) -> Vec<Rc<SaAnnotation>> {
        self.kids()
            .iter()
            .filter_map(|kid| match kid {
                Kid::Annotation(annot) => Some(Rc::clone(annot)),
                _ => None,
            })
            .collect()
    }

    fn attribute_bbox(&self) -> Option<BoundingBox> {
        let source = &self.shared.ctx.source;
        let page_number = self
            .page
            .and_then(|p| self.shared.ctx.page_number(p))
            .unwrap_or(0);
        let attributes = match source.get_resolved(&self.dict, "A")? {
            CosObject::Array(items) => items.to_vec(),
            other => vec![other],
        };
        attributes.iter().find_map(|attr| {
            let attr = source.resolve_dict(attr)?;
            let rect = source.get_numbers(&attr, "BBox")?;
            BoundingBox::from_rect(page_number, &rect)
        })
    }
}

impl ModelObject for SaStructElem {
    fn object_type(&self) -> &'static str {
        self.role.object_type()
    }

    fn id(&self) -> Option<ObjectKey> {
        self.key
    }

    fn link_names(&self) -> &'static [&'static str] {
        ELEM_LINKS
    }

    fn linked_objects(&self, link: &str) -> LinkedObjects {
        match link {
            "children" => self.children.erased(|| self.collect_children()),
            "annots" => self.annots.erased(|| self.collect_annotations()),
            _ => super::empty_links(),
        }
    }

    fn property_names(&self) -> &'static [&'static str] {
        ELEM_PROPERTIES
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        let semantics = self.semantics.borrow();
        let value = match name {
            "standardType" => self.role.name().into(),
            "valueS" => self.structure_type().into(),
            "textValue" => self.text().into(),
            "isTableChild" => self.is_table_child.into(),
            "isListChild" => self.is_list_child.into(),
            "semanticType" => semantics.semantic_type.map(|s| s.to_string()).into(),
            "correctSemanticScore" => semantics.correct_semantic_score.into(),
            "contrastRatio" => semantics.contrast_ratio.into(),
            _ => return None,
        };
        Some(value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Parse a `/K` entry (single kid or array) into kids at nesting level
/// `depth`.
///
/// Elements already on the path from the root are skipped, and so are all
/// elements nested deeper than the configured limit.
fn parse_kids(
    shared: &Rc<TreeShared>,
    dict: &CosDict,
    role: Option<StructRole>,
    page: Option<ObjectKey>,
    path: &Option<Rc<PathLink>>,
    depth: usize,
) -> Vec<Kid> {
    let source = &shared.ctx.source;
    let Some(k) = dict.get("K") else {
        return Vec::new();
    };
    let entries: Vec<CosObject> = match source.resolve(k) {
        CosObject::Array(items) => items.to_vec(),
        CosObject::Null => Vec::new(),
        _ => vec![k.clone()],
    };

    let max_depth = shared.ctx.options.max_struct_depth;
    let mut truncated = false;
    let mut kids = Vec::new();
    for entry in &entries {
        let key = entry.as_reference();
        match source.resolve(entry) {
            CosObject::Integer(mcid) => kids.push(Kid::Content { page, mcid }),
            resolved => {
                let Some(kid) = resolved.as_dict() else {
                    continue;
                };
                match kid.type_name() {
                    Some("MCR") => {
                        let Some(mcid) = source.get_resolved(kid, "MCID").and_then(|m| m.as_i64()) else {
                            continue;
                        };
                        let page = kid.get("Pg").and_then(CosObject::as_reference).or(page);
                        kids.push(Kid::Content { page, mcid });
                    }
                    Some("OBJR") => {
                        if let Some(annot) = object_reference(shared, kid, page) {
                            kids.push(Kid::Annotation(annot));
                        }
                    }
                    _ => {
                        if depth > max_depth {
                            truncated = true;
                            continue;
                        }
                        if key.is_some_and(|k| on_path(path, k)) {
                            log::debug!("Skipping structure element {:?} already on the path", key);
                            continue;
                        }
                        let child_path = match key {
                            Some(key) => Some(Rc::new(PathLink {
                                key,
                                parent: path.clone(),
                            })),
                            None => path.clone(),
                        };
                        kids.push(Kid::Element(Rc::new(SaStructElem::new(
                            Rc::clone(shared),
                            key,
                            kid.clone(),
                            role,
                            page,
                            child_path,
                            depth,
                        ))));
                    }
                }
            }
        }
    }
    if truncated {
        log::warn!(
            "Structure elements nested deeper than {} levels skipped",
            max_depth
        );
    }
    kids
}

/// Annotation targeted by an object reference dictionary.
fn object_reference(
    shared: &Rc<TreeShared>,
    objr: &CosDict,
    page: Option<ObjectKey>,
) -> Option<Rc<SaAnnotation>> {
    let ctx = &shared.ctx;
    let target = objr.get("Obj")?;
    let annot = ctx.source.resolve_dict(target)?;
    if !annot.contains_key("Rect") && annot.type_name() != Some("Annot") {
        return None;
    }
    let page_key = objr
        .get("Pg")
        .and_then(CosObject::as_reference)
        .or_else(|| annot.get("P").and_then(CosObject::as_reference))
        .or(page)?;
    let page_number = ctx.page_number(page_key).unwrap_or(0);
    let crop_box = ctx
        .source
        .object(page_key)
        .and_then(|p| p.as_dict().cloned())
        .map(|p| crop_box_of(&**ctx, &p))
        .unwrap_or(crate::geometry::DEFAULT_PAGE_BOX);
    Some(Rc::new(SaAnnotation::new(
        Rc::clone(ctx),
        target.as_reference(),
        annot,
        page_key,
        page_number,
        crop_box,
    )))
}
