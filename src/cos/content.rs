//! Content stream operations.

use lopdf::Object;

use super::object::{CosDict, CosObject, CosStream};
use crate::error::{Error, Result};

/// A single operation from a PDF content stream.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<CosObject>,
}

impl ContentOp {
    /// Numeric operand at `index`.
    pub fn number(&self, index: usize) -> Option<f64> {
        self.operands.get(index).and_then(CosObject::as_f64)
    }

    /// All operands as numbers; non-numeric operands are skipped.
    pub fn numbers(&self) -> Vec<f64> {
        self.operands.iter().filter_map(CosObject::as_f64).collect()
    }
}

/// Parse raw (decompressed) content stream bytes into a sequence of operations.
pub fn decode_content(data: &[u8]) -> Result<Vec<ContentOp>> {
    let content =
        lopdf::content::Content::decode(data).map_err(|e| Error::PdfParse(e.to_string()))?;

    Ok(content
        .operations
        .into_iter()
        .map(|op| ContentOp {
            operator: op.operator,
            operands: op.operands.iter().map(convert_object).collect(),
        })
        .collect())
}

/// Convert a `lopdf::Object` into a [`CosObject`].
///
/// References are kept as references. Streams carry their decompressed
/// data when a filter can be applied, the raw bytes otherwise; lopdf leaves
/// image streams encoded.
pub(crate) fn convert_object(obj: &Object) -> CosObject {
    match obj {
        Object::Null => CosObject::Null,
        Object::Boolean(b) => CosObject::Boolean(*b),
        Object::Integer(i) => CosObject::Integer(*i),
        Object::Real(r) => CosObject::Real(f64::from(*r)),
        Object::Name(n) => CosObject::name(String::from_utf8_lossy(n)),
        Object::String(b, _) => CosObject::string(b),
        Object::Array(arr) => CosObject::array(arr.iter().map(convert_object).collect()),
        Object::Dictionary(dict) => CosObject::Dictionary(convert_dictionary(dict)),
        Object::Stream(stream) => {
            let data = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            CosObject::Stream(CosStream::new(convert_dictionary(&stream.dict), data))
        }
        Object::Reference(id) => CosObject::Reference(*id),
    }
}

fn convert_dictionary(dict: &lopdf::Dictionary) -> CosDict {
    dict.iter()
        .map(|(key, value)| (String::from_utf8_lossy(key).into_owned(), convert_object(value)))
        .collect()
}
