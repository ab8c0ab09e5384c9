//! Raw PDF object values.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

/// Indirect object identifier: (object number, generation number).
pub type ObjectKey = (u32, u16);

/// A raw PDF object as exposed by the object layer.
///
/// Composite payloads are reference counted, so cloning a `CosObject` never
/// copies the underlying graph.
#[derive(Debug, Clone, PartialEq)]
pub enum CosObject {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Name(Rc<str>),
    String(Rc<[u8]>),
    Array(Rc<[CosObject]>),
    Dictionary(CosDict),
    Stream(CosStream),
    Reference(ObjectKey),
}

impl CosObject {
    /// Create a name object.
    pub fn name(name: impl AsRef<str>) -> Self {
        CosObject::Name(Rc::from(name.as_ref()))
    }

    /// Create a string object from raw bytes.
    pub fn string(bytes: impl AsRef<[u8]>) -> Self {
        CosObject::String(Rc::from(bytes.as_ref()))
    }

    /// Create an array object.
    pub fn array(items: Vec<CosObject>) -> Self {
        CosObject::Array(Rc::from(items))
    }

    /// Create a numeric array, e.g. a rectangle.
    pub fn numbers(values: &[f64]) -> Self {
        Self::array(values.iter().map(|v| CosObject::Real(*v)).collect())
    }

    /// Create a stream object.
    pub fn stream(dict: CosDict, data: impl AsRef<[u8]>) -> Self {
        CosObject::Stream(CosStream::new(dict, data))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CosObject::Null)
    }

    /// Whether the object carries a dictionary (plain dictionary or stream).
    pub fn is_dictionary_based(&self) -> bool {
        matches!(self, CosObject::Dictionary(_) | CosObject::Stream(_))
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            CosObject::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CosObject::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CosObject::Integer(i) => Some(*i),
            CosObject::Real(r) if r.fract() == 0.0 => Some(*r as i64),
            _ => None,
        }
    }

    /// Numeric value of an integer or real object.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CosObject::Integer(i) => Some(*i as f64),
            CosObject::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            CosObject::String(b) => Some(b),
            _ => None,
        }
    }

    /// Decode a PDF text string (UTF-16BE with BOM, UTF-8, or PDFDocEncoding).
    pub fn as_text(&self) -> Option<String> {
        self.as_bytes().map(decode_text_simple)
    }

    pub fn as_array(&self) -> Option<&[CosObject]> {
        match self {
            CosObject::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Dictionary of a dictionary or stream object.
    pub fn as_dict(&self) -> Option<&CosDict> {
        match self {
            CosObject::Dictionary(d) => Some(d),
            CosObject::Stream(s) => Some(&s.dict),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&CosStream> {
        match self {
            CosObject::Stream(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<ObjectKey> {
        match self {
            CosObject::Reference(key) => Some(*key),
            _ => None,
        }
    }

    /// Numbers of a numeric array; `None` if any element is not a number.
    pub fn as_number_array(&self) -> Option<Vec<f64>> {
        self.as_array()?.iter().map(CosObject::as_f64).collect()
    }
}

impl From<CosDict> for CosObject {
    fn from(dict: CosDict) -> Self {
        CosObject::Dictionary(dict)
    }
}

impl From<ObjectKey> for CosObject {
    fn from(key: ObjectKey) -> Self {
        CosObject::Reference(key)
    }
}

impl From<i64> for CosObject {
    fn from(value: i64) -> Self {
        CosObject::Integer(value)
    }
}

impl From<f64> for CosObject {
    fn from(value: f64) -> Self {
        CosObject::Real(value)
    }
}

impl From<bool> for CosObject {
    fn from(value: bool) -> Self {
        CosObject::Boolean(value)
    }
}

impl fmt::Display for CosObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CosObject::Null => write!(f, "null"),
            CosObject::Boolean(b) => write!(f, "{}", b),
            CosObject::Integer(i) => write!(f, "{}", i),
            CosObject::Real(r) => write!(f, "{}", r),
            CosObject::Name(n) => write!(f, "/{}", n),
            CosObject::String(b) => write!(f, "({})", decode_text_simple(b)),
            CosObject::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            CosObject::Dictionary(d) => write!(f, "{}", d),
            CosObject::Stream(s) => write!(f, "{} stream", s.dict),
            CosObject::Reference((num, gen)) => write!(f, "{} {} R", num, gen),
        }
    }
}

/// An insertion-ordered PDF dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CosDict(Rc<IndexMap<String, CosObject>>);

impl CosDict {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&CosObject> {
        self.0.get(key)
    }

    /// Name value of `key`, if it is a direct name.
    pub fn get_name(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(CosObject::as_name)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CosObject)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return a copy of this dictionary with `key` set to `value`.
    pub fn with(&self, key: impl Into<String>, value: impl Into<CosObject>) -> Self {
        let mut map = (*self.0).clone();
        map.insert(key.into(), value.into());
        CosDict(Rc::new(map))
    }

    /// Type name of the dictionary (`/Type`).
    pub fn type_name(&self) -> Option<&str> {
        self.get_name("Type")
    }
}

impl<K: Into<String>> FromIterator<(K, CosObject)> for CosDict {
    fn from_iter<I: IntoIterator<Item = (K, CosObject)>>(iter: I) -> Self {
        CosDict(Rc::new(
            iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }
}

impl fmt::Display for CosDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<<")?;
        for (key, value) in self.iter() {
            write!(f, " /{} {}", key, value)?;
        }
        write!(f, " >>")
    }
}

/// A stream: its dictionary plus decoded (decompressed) data.
#[derive(Debug, Clone, PartialEq)]
pub struct CosStream {
    pub dict: CosDict,
    pub data: Rc<[u8]>,
}

impl CosStream {
    pub fn new(dict: CosDict, data: impl AsRef<[u8]>) -> Self {
        Self {
            dict,
            data: Rc::from(data.as_ref()),
        }
    }
}

/// Simple text decoding fallback when no font encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // Try UTF-16BE first (BOM marker)
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|c| {
                if c.len() == 2 {
                    Some(u16::from_be_bytes([c[0], c[1]]))
                } else {
                    None
                }
            })
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Fallback: Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
