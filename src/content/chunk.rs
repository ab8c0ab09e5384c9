//! Content chunk types.

use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;

/// A positioned fragment of page content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentChunk {
    /// A run of text shown by one text-showing operator
    Text(TextChunk),
    /// An image XObject placement
    Image(ImageChunk),
}

impl ContentChunk {
    pub fn bounding_box(&self) -> &BoundingBox {
        match self {
            ContentChunk::Text(t) => &t.bounding_box,
            ContentChunk::Image(i) => &i.bounding_box,
        }
    }

    /// Marked-content id of the enclosing marked-content sequence.
    pub fn mcid(&self) -> Option<i64> {
        match self {
            ContentChunk::Text(t) => t.mcid,
            ContentChunk::Image(i) => i.mcid,
        }
    }

    pub fn as_text(&self) -> Option<&TextChunk> {
        match self {
            ContentChunk::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ContentChunk::Text(_))
    }
}

/// A run of text with its position and style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Decoded text (may be empty)
    pub value: String,
    pub bounding_box: BoundingBox,
    /// Base font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Effective font size in points
    pub font_size: f64,
    /// Fill colour as RGB components in 0..=1
    pub fill_color: [f64; 3],
    pub mcid: Option<i64>,
}

impl TextChunk {
    /// Create a black text chunk outside any marked content.
    pub fn new(value: impl Into<String>, bounding_box: BoundingBox) -> Self {
        Self {
            value: value.into(),
            bounding_box,
            font_name: String::new(),
            font_size: bounding_box.height(),
            fill_color: [0.0, 0.0, 0.0],
            mcid: None,
        }
    }

    /// Whether the font name suggests a bold face.
    pub fn is_bold(&self) -> bool {
        let name = self.font_name.to_lowercase();
        name.contains("bold") || name.contains("black") || name.contains("heavy")
    }
}

/// An image drawn on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageChunk {
    pub bounding_box: BoundingBox,
    pub mcid: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_chunk_bold_detection() {
        let mut chunk = TextChunk::new("Title", BoundingBox::new(1, 0.0, 0.0, 50.0, 12.0));
        chunk.font_name = "Helvetica-Bold".to_string();
        assert!(chunk.is_bold());

        chunk.font_name = "Times-Roman".to_string();
        assert!(!chunk.is_bold());
    }

    #[test]
    fn test_chunk_accessors() {
        let bbox = BoundingBox::new(2, 0.0, 0.0, 10.0, 10.0);
        let image = ContentChunk::Image(ImageChunk {
            bounding_box: bbox,
            mcid: Some(4),
        });
        assert!(!image.is_text());
        assert!(image.as_text().is_none());
        assert_eq!(image.mcid(), Some(4));
        assert_eq!(image.bounding_box().page_number, 2);
    }
}
