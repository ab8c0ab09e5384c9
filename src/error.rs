//! Error types for sapdf library.

use std::io;
use thiserror::Error;

/// Result type alias for sapdf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building or inspecting a validation model.
///
/// Optional data that is simply missing from a document (no structure tree,
/// no annotations, no signature) is never reported through this type.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted and requires a password.
    #[error("Document is encrypted")]
    Encrypted,

    /// The PDF structure is corrupted or malformed.
    #[error("Corrupted PDF structure: {0}")]
    Corrupted(String),

    /// The raw object graph is unusable, so no model tree can be built.
    #[error("Cannot build validation model: {0}")]
    CannotBuildModel(String),

    /// Required data of a feature object is malformed.
    #[error("Feature parsing error: {0}")]
    FeatureParsing(String),

    /// Error during report rendering (JSON).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
