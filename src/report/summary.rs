//! Per-document summaries and batch processing.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

use crate::error::Result;
use crate::features::signatures;
use crate::model::{AnnotationKind, SaDocument};
use crate::options::ValidationOptions;

/// Counts taken from a built validation model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub file_name: Option<String>,
    pub page_count: usize,
    pub is_tagged: bool,
    pub chunk_count: usize,
    pub annotation_count: usize,
    pub link_annotation_count: usize,
    /// Annotations whose underlying text looks like a URI
    pub link_text_annotation_count: usize,
    pub annotations_outside_crop_box: usize,
    pub structure_element_count: usize,
    pub classified_element_count: usize,
    /// Elements whose semantic type contradicts their structural role
    pub mismatched_element_count: usize,
    pub lowest_contrast_ratio: Option<f64>,
    pub signature_count: usize,
}

impl DocumentSummary {
    pub fn from_document(doc: &SaDocument) -> Self {
        let mut summary = Self {
            file_name: doc.file_name().map(str::to_string),
            page_count: doc.page_count(),
            is_tagged: doc.is_tagged(),
            chunk_count: doc.workspace().chunk_count(),
            signature_count: signatures(&*doc.context().source).len(),
            ..Self::default()
        };

        for page in doc.pages().iter() {
            for annot in page.annotations().iter() {
                summary.annotation_count += 1;
                if annot.kind() == AnnotationKind::Link {
                    summary.link_annotation_count += 1;
                }
                if !annot.text_value().is_empty() && annot.has_link_value() {
                    summary.link_text_annotation_count += 1;
                }
                if annot.is_outside_crop_box() == Some(true) {
                    summary.annotations_outside_crop_box += 1;
                }
            }
        }

        if let Some(root) = doc.struct_tree_root() {
            root.for_each_element(&mut |elem| {
                let semantics = elem.semantics();
                summary.structure_element_count += 1;
                if semantics.semantic_type.is_some() {
                    summary.classified_element_count += 1;
                }
                if semantics.correct_semantic_score == Some(0.0) {
                    summary.mismatched_element_count += 1;
                }
                if let Some(ratio) = semantics.contrast_ratio {
                    summary.lowest_contrast_ratio = Some(
                        summary
                            .lowest_contrast_ratio
                            .map_or(ratio, |lowest| lowest.min(ratio)),
                    );
                }
            });
        }
        summary
    }
}

/// Outcome for one file of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<DocumentSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileSummary {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Build the model for one file and summarize it.
pub fn summarize_file<P: AsRef<Path>>(path: P, options: &ValidationOptions) -> Result<DocumentSummary> {
    let doc = SaDocument::open(path, options.clone())?;
    Ok(DocumentSummary::from_document(&doc))
}

/// Summarize many files, in parallel when `options.parallel` is set.
///
/// Each file gets its own object source and workspace; results keep the
/// order of `paths`.
pub fn summarize_files<P: AsRef<Path> + Sync>(paths: &[P], options: &ValidationOptions) -> Vec<FileSummary> {
    let run = |path: &P| {
        let path = path.as_ref();
        match summarize_file(path, options) {
            Ok(summary) => FileSummary {
                path: path.to_path_buf(),
                summary: Some(summary),
                error: None,
            },
            Err(e) => {
                log::warn!("Failed to build model for {}: {}", path.display(), e);
                FileSummary {
                    path: path.to_path_buf(),
                    summary: None,
                    error: Some(e.to_string()),
                }
            }
        }
    };

    if options.parallel {
        paths.par_iter().map(run).collect()
    } else {
        paths.iter().map(run).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cos::{CosDict, CosObject, MemorySource};
    use std::rc::Rc;

    #[test]
    fn test_summary_counts_annotations() {
        let mut source = MemorySource::new();
        let inside = CosDict::new()
            .with("Subtype", CosObject::name("Link"))
            .with("Rect", CosObject::numbers(&[0.0, 0.0, 200.0, 50.0]));
        let outside = CosDict::new()
            .with("Subtype", CosObject::name("Text"))
            .with("Rect", CosObject::numbers(&[700.0, 900.0, 720.0, 920.0]));
        source.add_page(
            CosDict::new().with("Annots", CosObject::array(vec![inside.into(), outside.into()])),
            b"BT /F1 12 Tf 10 10 Td (www.example.org) Tj ET",
        );
        let doc = SaDocument::build(Rc::new(source), ValidationOptions::default()).unwrap();
        let summary = DocumentSummary::from_document(&doc);

        assert_eq!(summary.page_count, 1);
        assert_eq!(summary.chunk_count, 1);
        assert_eq!(summary.annotation_count, 2);
        assert_eq!(summary.link_annotation_count, 1);
        assert_eq!(summary.link_text_annotation_count, 1);
        assert_eq!(summary.annotations_outside_crop_box, 1);
        assert_eq!(summary.structure_element_count, 0);
        assert_eq!(summary.lowest_contrast_ratio, None);
    }

    #[test]
    fn test_missing_files_are_reported() {
        let paths = ["/nonexistent/a.pdf", "/nonexistent/b.pdf"];
        let results = summarize_files(&paths, &ValidationOptions::default().sequential());

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| !r.is_ok() && r.summary.is_none()));
        assert_eq!(results[1].path, PathBuf::from("/nonexistent/b.pdf"));
    }
}
