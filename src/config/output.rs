//! `[output]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[output]` section in docs2email.toml - where `convert` writes its result.
///
/// # Example
/// ```toml
/// [output]
/// dir = "out"
/// minify = false
/// manifest = true
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory receiving the html document and its assets.
    #[serde(default = "defaults::output::dir")]
    #[educe(Default = defaults::output::dir())]
    pub dir: PathBuf,

    /// Minify the final html.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub minify: bool,

    /// Write a json description of the inline attachments.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub manifest: bool,
}
