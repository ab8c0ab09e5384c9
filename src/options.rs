//! Validation model options.

use crate::content::DEFAULT_MAX_FORM_DEPTH;
use crate::model::DEFAULT_MAX_STRUCT_DEPTH;

/// Options for building a validation model.
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// When to run the contrast checker
    pub contrast_check: ContrastCheck,

    /// Whether to run the accumulated semantic classifier
    pub classify_semantics: bool,

    /// Nesting limit for form XObjects during chunk extraction
    pub max_form_depth: usize,

    /// Nesting limit for structure elements below the tree root
    pub max_struct_depth: usize,

    /// Whether batch operations may use parallel processing
    pub parallel: bool,
}

impl ValidationOptions {
    /// Create new validation options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable strict mode (fail on undecodable content).
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Set the contrast checker policy.
    pub fn with_contrast_check(mut self, policy: ContrastCheck) -> Self {
        self.contrast_check = policy;
        self
    }

    /// Enable or disable the semantic classifier.
    pub fn with_semantics(mut self, classify: bool) -> Self {
        self.classify_semantics = classify;
        self
    }

    /// Set the form XObject nesting limit.
    pub fn with_max_form_depth(mut self, depth: usize) -> Self {
        self.max_form_depth = depth;
        self
    }

    /// Set the structure element nesting limit.
    pub fn with_max_struct_depth(mut self, depth: usize) -> Self {
        self.max_struct_depth = depth;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            contrast_check: ContrastCheck::WhenNamed,
            classify_semantics: true,
            max_form_depth: DEFAULT_MAX_FORM_DEPTH,
            max_struct_depth: DEFAULT_MAX_STRUCT_DEPTH,
            parallel: true,
        }
    }
}

/// Error handling mode during model building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on undecodable page content
    Strict,
    /// Log undecodable page content and continue without its chunks
    #[default]
    Lenient,
}

/// When the contrast checker runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContrastCheck {
    /// Only when the document has a source file name
    #[default]
    WhenNamed,
    /// Always; unnamed documents are reported as `<memory>`
    Always,
    /// Never
    Never,
}
