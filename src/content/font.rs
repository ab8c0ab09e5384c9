//! Glyph advance metrics for chunk geometry.

use crate::cos::{CosDict, CosObject, ObjectKey, ObjectSource};

/// Width used when a simple font declares no usable `/Widths` entry.
const DEFAULT_SIMPLE_WIDTH: f64 = 500.0;

/// Width used when a composite font declares no `/DW`.
const DEFAULT_COMPOSITE_WIDTH: f64 = 1000.0;

/// Horizontal metrics of one font resource, in thousandths of an em.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    /// Resource name on the page (e.g., "F1")
    pub resource_name: String,
    /// Indirect font dictionary, when the resource entry is a reference
    pub object_key: Option<ObjectKey>,
    /// Base font name (e.g., "Helvetica-Bold")
    pub base_font: String,
    /// Bytes per character code (1 for simple fonts, 2 for Type0)
    pub code_length: usize,
    first_char: i64,
    widths: Vec<f64>,
    default_width: f64,
}

impl FontMetrics {
    /// Metrics for an unknown font resource.
    pub fn fallback(resource_name: &str) -> Self {
        Self {
            resource_name: resource_name.to_string(),
            object_key: None,
            base_font: resource_name.to_string(),
            code_length: 1,
            first_char: 0,
            widths: Vec::new(),
            default_width: DEFAULT_SIMPLE_WIDTH,
        }
    }

    /// Read metrics from a font dictionary.
    pub fn from_dict<S: ObjectSource + ?Sized>(source: &S, resource_name: &str, font: &CosDict) -> Self {
        let base_font = font
            .get_name("BaseFont")
            .unwrap_or("Unknown")
            .to_string();

        if font.get_name("Subtype") == Some("Type0") {
            let default_width = source
                .get_resolved(font, "DescendantFonts")
                .and_then(|d| d.as_array().and_then(|a| a.first().cloned()))
                .and_then(|d| source.resolve_dict(&d))
                .and_then(|d| source.get_resolved(&d, "DW"))
                .and_then(|w| w.as_f64())
                .unwrap_or(DEFAULT_COMPOSITE_WIDTH);
            return Self {
                resource_name: resource_name.to_string(),
            object_key: None,
                base_font,
                code_length: 2,
                first_char: 0,
                widths: Vec::new(),
                default_width,
            };
        }

        let first_char = source
            .get_resolved(font, "FirstChar")
            .and_then(|c| c.as_i64())
            .unwrap_or(0);
        let widths = source
            .get_resolved(font, "Widths")
            .and_then(|w| match w {
                CosObject::Array(items) => Some(
                    items
                        .iter()
                        .map(|item| source.resolve(item).as_f64().unwrap_or(0.0))
                        .collect(),
                ),
                _ => None,
            })
            .unwrap_or_default();
        let default_width = source
            .get_resolved(font, "FontDescriptor")
            .and_then(|d| source.resolve_dict(&d))
            .and_then(|d| d.get("MissingWidth").and_then(CosObject::as_f64))
            .unwrap_or(DEFAULT_SIMPLE_WIDTH);

        Self {
            resource_name: resource_name.to_string(),
            object_key: None,
            base_font,
            code_length: 1,
            first_char,
            widths,
            default_width,
        }
    }

    /// Advance width of one character code, in thousandths of an em.
    pub fn width(&self, code: u32) -> f64 {
        let index = i64::from(code) - self.first_char;
        if index >= 0 {
            if let Some(w) = self.widths.get(index as usize) {
                if *w > 0.0 {
                    return *w;
                }
            }
        }
        self.default_width
    }

    /// Split a shown string into character codes.
    pub fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.code_length == 2 {
            bytes
                .chunks(2)
                .map(|c| match c {
                    [hi, lo] => (u32::from(*hi) << 8) | u32::from(*lo),
                    [single] => u32::from(*single),
                    _ => 0,
                })
                .collect()
        } else {
            bytes.iter().map(|b| u32::from(*b)).collect()
        }
    }
}
