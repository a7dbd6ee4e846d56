//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [archive] Section Defaults
// ============================================================================

pub mod archive {
    pub fn html_suffix() -> String {
        crate::archive::DEFAULT_HTML_SUFFIX.into()
    }
}

// ============================================================================
// [style] Section Defaults
// ============================================================================

pub mod style {
    use std::path::PathBuf;

    pub fn allowed() -> Vec<String> {
        vec!["font-style:italic".into(), "font-weight:700".into()]
    }

    pub fn stylesheet() -> Option<PathBuf> {
        None
    }
}

// ============================================================================
// [output] Section Defaults
// ============================================================================

pub mod output {
    use std::path::PathBuf;

    pub fn dir() -> PathBuf {
        "out".into()
    }
}
