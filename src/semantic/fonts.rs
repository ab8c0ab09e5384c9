//! Font size statistics for heading detection.

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::content::TextChunk;

/// Body size assumed when no text was observed.
const DEFAULT_BODY_SIZE: f64 = 12.0;

/// Font statistics of one document.
#[derive(Debug, Clone, Default)]
pub struct FontStatistics {
    /// Body text font size (most common)
    pub body_size: f64,
    /// Font sizes larger than body (potential headings), largest first
    pub heading_sizes: Vec<f64>,
    /// Observed font sizes (tenths of a point) weighted by character count
    pub size_histogram: HashMap<i64, usize>,
}

impl FontStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a font size observation covering `chars` characters.
    pub fn add_size(&mut self, size: f64, chars: usize) {
        if chars == 0 || !size.is_finite() {
            return;
        }
        let key = (size * 10.0).round() as i64; // Round to 0.1 precision
        *self.size_histogram.entry(key).or_insert(0) += chars;
    }

    pub fn add_chunk(&mut self, chunk: &TextChunk) {
        self.add_size(chunk.font_size, chunk.value.trim().chars().count());
    }

    /// Calculate body size and heading sizes.
    pub fn analyze(&mut self) {
        // Most common size; ties go to the smaller size
        let Some((body_key, _)) = self
            .size_histogram
            .iter()
            .max_by_key(|(key, count)| (**count, Reverse(**key)))
        else {
            self.body_size = DEFAULT_BODY_SIZE;
            self.heading_sizes.clear();
            return;
        };
        self.body_size = *body_key as f64 / 10.0;

        let mut larger_sizes: Vec<f64> = self
            .size_histogram
            .keys()
            .map(|k| *k as f64 / 10.0)
            .filter(|size| *size > self.body_size + 0.5)
            .collect();
        larger_sizes.sort_by(|a, b| b.total_cmp(a));
        self.heading_sizes = larger_sizes;
    }

    /// Heading level for a font size (1-6, or 0 for body text).
    ///
    /// Bold text only needs to be slightly larger than body text.
    pub fn heading_level(&self, font_size: f64, is_bold: bool) -> u8 {
        let margin = if is_bold { 0.5 } else { 1.5 };
        if font_size < self.body_size + margin {
            return 0;
        }

        for (i, heading_size) in self.heading_sizes.iter().enumerate() {
            if font_size >= heading_size - 0.5 {
                return (i + 1).min(6) as u8;
            }
        }

        // Larger than body but smaller than known heading sizes
        5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(observations: &[(f64, usize)]) -> FontStatistics {
        let mut stats = FontStatistics::new();
        for (size, chars) in observations {
            stats.add_size(*size, *chars);
        }
        stats.analyze();
        stats
    }

    #[test]
    fn test_body_size_is_most_common() {
        let stats = stats(&[(12.0, 500), (24.0, 20), (18.0, 30)]);
        assert_eq!(stats.body_size, 12.0);
        assert_eq!(stats.heading_sizes, vec![24.0, 18.0]);
    }

    #[test]
    fn test_heading_levels() {
        let stats = stats(&[(12.0, 500), (24.0, 20), (18.0, 30)]);
        assert_eq!(stats.heading_level(24.0, false), 1);
        assert_eq!(stats.heading_level(18.0, false), 2);
        assert_eq!(stats.heading_level(12.0, false), 0);
        assert_eq!(stats.heading_level(13.0, false), 0);
    }

    #[test]
    fn test_empty_statistics() {
        let stats = stats(&[]);
        assert_eq!(stats.body_size, DEFAULT_BODY_SIZE);
        assert!(stats.heading_sizes.is_empty());
    }

    #[test]
    fn test_ties_prefer_smaller_size() {
        let stats = stats(&[(10.0, 100), (14.0, 100)]);
        assert_eq!(stats.body_size, 10.0);
    }
}
