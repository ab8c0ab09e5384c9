//! Reports over the validation model.
//!
//! The model tree itself is not serializable (it is lazy and shared); a
//! report takes a snapshot of it, either as a full tree dump or as a
//! per-document summary that can cross thread boundaries.

mod json;
mod summary;
mod tree;

pub use json::{to_json, JsonFormat};
pub use summary::{summarize_file, summarize_files, DocumentSummary, FileSummary};
pub use tree::{ModelNodeDump, DEFAULT_DUMP_DEPTH};
