//! `[style]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[style]` section in docs2email.toml - the two constant style sets.
///
/// # Example
/// ```toml
/// [style]
/// allowed = ["font-style:italic", "font-weight:700"]
/// stylesheet = "~/mail/newsletter.css"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct StyleConfig {
    /// Inline declarations that survive the style filter.
    #[serde(default = "defaults::style::allowed")]
    #[educe(Default = defaults::style::allowed())]
    pub allowed: Vec<String>,

    /// Stylesheet replacing the built-in rule set.
    #[serde(default = "defaults::style::stylesheet")]
    #[educe(Default = defaults::style::stylesheet())]
    pub stylesheet: Option<PathBuf>,
}
