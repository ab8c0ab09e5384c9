//! Contrast ratio checker.
//!
//! Computes the WCAG contrast ratio of every element's text fill colour
//! against a white background and records the lowest ratio found in the
//! element's subtree.

use super::SemanticChecker;
use crate::error::Result;
use crate::model::{SaStructElem, SaStructTreeRoot};

/// Background assumed behind all text.
const BACKGROUND: [f64; 3] = [1.0, 1.0, 1.0];

/// Relative luminance of an sRGB colour with components in `0..=1`.
pub fn relative_luminance(rgb: [f64; 3]) -> f64 {
    let channel = |c: f64| {
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * channel(rgb[0]) + 0.7152 * channel(rgb[1]) + 0.0722 * channel(rgb[2])
}

/// Contrast ratio between two colours, from 1.0 to 21.0.
pub fn contrast_ratio(foreground: [f64; 3], background: [f64; 3]) -> f64 {
    let a = relative_luminance(foreground);
    let b = relative_luminance(background);
    let (lighter, darker) = if a >= b { (a, b) } else { (b, a) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Contrast checker for one named document.
#[derive(Debug)]
pub struct ContrastChecker {
    document_name: String,
    checked: usize,
}

impl ContrastChecker {
    pub fn new(document_name: impl Into<String>) -> Self {
        Self {
            document_name: document_name.into(),
            checked: 0,
        }
    }

    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    /// Number of elements that received a contrast ratio in the last run.
    pub fn checked(&self) -> usize {
        self.checked
    }

    fn check_element(&mut self, elem: &SaStructElem) -> Option<f64> {
        let own = elem
            .own_chunks()
            .iter()
            .filter_map(|chunk| chunk.as_text())
            .filter(|text| !text.value.trim().is_empty())
            .map(|text| contrast_ratio(text.fill_color, BACKGROUND))
            .reduce(f64::min);

        let mut lowest = own;
        for child in elem.children().iter() {
            if let Some(ratio) = self.check_element(child) {
                lowest = Some(lowest.map_or(ratio, |l| l.min(ratio)));
            }
        }

        if lowest.is_some() {
            self.checked += 1;
        }
        elem.set_contrast_ratio(lowest);
        lowest
    }
}

impl SemanticChecker for ContrastChecker {
    fn name(&self) -> &'static str {
        "contrast"
    }

    fn check_semantic_tree(&mut self, root: &SaStructTreeRoot) -> Result<()> {
        self.checked = 0;
        for child in root.children().iter() {
            self.check_element(child);
        }
        log::debug!(
            "{}: contrast ratio computed for {} structure elements",
            self.document_name,
            self.checked
        );
        Ok(())
    }
}
