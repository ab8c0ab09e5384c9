//! Raw PDF object layer.
//!
//! The validation model never parses PDF bytes itself. It reads the object
//! graph through [`ObjectSource`], which is implemented on top of lopdf
//! ([`LopdfSource`]) and by a plain in-memory graph ([`MemorySource`]).

mod content;
mod lopdf_source;
mod memory;
mod object;
mod source;

pub use content::{decode_content, ContentOp};
pub use lopdf_source::LopdfSource;
pub use memory::MemorySource;
pub use object::{decode_text_simple, CosDict, CosObject, CosStream, ObjectKey};
pub use source::{inherited_attribute, page_content_ops, ObjectSource};
