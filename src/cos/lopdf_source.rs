//! [`ObjectSource`] backed by `lopdf`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use lopdf::Document as LopdfDocument;

use super::content::convert_object;
use super::object::{decode_text_simple, CosDict, CosObject, ObjectKey};
use super::source::ObjectSource;
use crate::error::{Error, Result};

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Concrete [`ObjectSource`] backed by `lopdf::Document`.
///
/// Indirect objects are converted (and their streams decompressed) on first
/// lookup and cached; the lopdf document is kept for font-encoding aware
/// text decoding.
pub struct LopdfSource {
    doc: LopdfDocument,
    objects: RefCell<HashMap<ObjectKey, CosObject>>,
    file_name: Option<String>,
}

impl LopdfSource {
    /// Load from a file path. The file name is recorded for reporting.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let mut source = Self::load_bytes(&data)?;
        source.file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        Ok(source)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        check_header(data)?;
        let doc = LopdfDocument::load_mem(data).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(Self::from_document(doc))
    }

    /// Load from a reader.
    pub fn load_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::load_bytes(&data)
    }

    /// Wrap an already parsed lopdf document.
    pub fn from_document(doc: LopdfDocument) -> Self {
        log::debug!("Loaded {} indirect objects", doc.objects.len());
        Self {
            doc,
            objects: RefCell::new(HashMap::new()),
            file_name: None,
        }
    }

    /// Set the name reported by [`ObjectSource::file_name`].
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Number of indirect objects converted so far.
    pub fn converted_count(&self) -> usize {
        self.objects.borrow().len()
    }
}

impl ObjectSource for LopdfSource {
    fn object(&self, key: ObjectKey) -> Option<CosObject> {
        if let Some(obj) = self.objects.borrow().get(&key) {
            return Some(obj.clone());
        }
        let obj = convert_object(self.doc.objects.get(&key)?);
        self.objects.borrow_mut().insert(key, obj.clone());
        Some(obj)
    }

    fn catalog(&self) -> Option<CosDict> {
        let root = self.doc.trailer.get(b"Root").ok()?;
        self.resolve_dict(&convert_object(root))
    }

    fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    fn page_keys(&self) -> Vec<ObjectKey> {
        self.doc.get_pages().into_values().collect()
    }

    fn decode_text(&self, font: Option<ObjectKey>, bytes: &[u8]) -> String {
        if let Some(font_dict) = font.and_then(|key| self.doc.get_dictionary(key).ok()) {
            if let Ok(enc) = font_dict.get_font_encoding(&self.doc) {
                if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                    return text;
                }
            }
        }
        decode_text_simple(bytes)
    }
}

fn check_header(data: &[u8]) -> Result<()> {
    // Some producers put junk before the header; lopdf tolerates that as well.
    let window = &data[..data.len().min(1024)];
    if !window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }
    Ok(())
}
