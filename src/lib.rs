//! # sapdf
//!
//! Semantic validation model for PDF documents.
//!
//! This library wraps the raw object graph of a PDF into a typed model tree
//! that accessibility rules can navigate by link and property name. Building
//! a document extracts the positioned text and image content of every page,
//! builds the logical structure tree and annotates its elements with
//! semantic types and contrast ratios.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sapdf::{open_file, ModelObject};
//!
//! fn main() -> sapdf::Result<()> {
//!     let doc = open_file("document.pdf")?;
//!
//!     for page in doc.linked_objects("pages").iter() {
//!         for annot in page.linked_objects("annots").iter() {
//!             println!("{:?}", annot.property("textValue"));
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Lazy model tree**: links are resolved on first access and cached
//! - **Content chunks**: positioned text and images, per page, including form XObjects
//! - **Text association**: text under annotation rectangles and URI detection
//! - **Structure tree**: role-mapped structure elements with semantic classification
//! - **Feature reporting**: serializable signature feature trees
//! - **Batch summaries**: parallel processing of many files with Rayon

pub mod content;
pub mod cos;
pub mod error;
pub mod features;
pub mod geometry;
pub mod model;
pub mod options;
pub mod report;
pub mod semantic;
pub mod workspace;

// Re-export commonly used types
pub use cos::{CosDict, CosObject, LopdfSource, MemorySource, ObjectKey, ObjectSource};
pub use error::{Error, Result};
pub use features::{FeatureExtractionResult, FeatureTreeNode, FeaturesObject};
pub use model::{
    AnnotationKind, LinkedObjects, ModelObject, ModelRef, PropertyValue, SaAnnotation,
    SaDocument, SaPage, SaStructElem, SaStructTreeRoot, SemanticType,
};
pub use options::{ContrastCheck, ErrorMode, ValidationOptions};
pub use report::{DocumentSummary, JsonFormat, ModelNodeDump};
pub use workspace::Workspace;

use std::io::Read;
use std::path::Path;
use std::rc::Rc;

/// Build the validation model for a PDF file with default options.
///
/// # Example
///
/// ```no_run
/// use sapdf::open_file;
///
/// let doc = open_file("document.pdf").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn open_file<P: AsRef<Path>>(path: P) -> Result<SaDocument> {
    SaDocument::open(path, ValidationOptions::default())
}

/// Build the validation model for a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use sapdf::{open_file_with_options, ContrastCheck, ValidationOptions};
///
/// let options = ValidationOptions::new()
///     .strict()
///     .with_contrast_check(ContrastCheck::Always);
/// let doc = open_file_with_options("document.pdf", options).unwrap();
/// ```
pub fn open_file_with_options<P: AsRef<Path>>(path: P, options: ValidationOptions) -> Result<SaDocument> {
    SaDocument::open(path, options)
}

/// Build the validation model for PDF bytes.
pub fn open_bytes(data: &[u8]) -> Result<SaDocument> {
    SaDocument::from_bytes(data, ValidationOptions::default())
}

/// Build the validation model for a PDF read from `reader`.
pub fn open_reader<R: Read>(reader: R, options: ValidationOptions) -> Result<SaDocument> {
    let source = LopdfSource::load_reader(reader)?;
    SaDocument::build(Rc::new(source), options)
}

/// Dump the model tree of a PDF file as JSON.
///
/// # Example
///
/// ```no_run
/// use sapdf::{tree_json, JsonFormat};
///
/// let json = tree_json("document.pdf", JsonFormat::Pretty).unwrap();
/// println!("{}", json);
/// ```
pub fn tree_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = open_file(path)?;
    report::to_json(&ModelNodeDump::new(&doc), format)
}

/// Summarize a PDF file.
pub fn summarize<P: AsRef<Path>>(path: P) -> Result<DocumentSummary> {
    report::summarize_file(path, &ValidationOptions::default())
}
