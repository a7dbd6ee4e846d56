//! `[archive]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[archive]` section in docs2email.toml - how the export is decomposed.
///
/// # Example
/// ```toml
/// [archive]
/// html_suffix = ".html"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Suffix of the document entry (ASCII case-insensitive).
    #[serde(default = "defaults::archive::html_suffix")]
    #[educe(Default = defaults::archive::html_suffix())]
    pub html_suffix: String,
}
