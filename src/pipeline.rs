//! Export archive to email body conversion.
//!
//! ```text
//! raw zip ─► Archive ─► DocumentBundle ─► sanitize ─► clean passes ─► inline styles ─► cid: rewrite
//! ```
//!
//! Every stage consumes the full output of the previous one. A run is a pure
//! function of the raw bytes and [`PipelineOptions`]; nothing is shared
//! between runs except the immutable options.

use crate::archive::{Archive, DEFAULT_HTML_SUFFIX};
use crate::attachment::{InlineAttachment, inline_attachments};
use crate::clean::{AllowedStyles, clean_fragment};
use crate::error::PipelineError;
use crate::inline::{StyleRuleSet, inline_styles};
use crate::log;
use crate::rewrite::rewrite_asset_refs;
use crate::sanitize::sanitize;
use std::collections::BTreeMap;

/// Constant inputs shared by every conversion run.
#[derive(Debug)]
pub struct PipelineOptions {
    pub rules: StyleRuleSet,
    pub allowed_styles: AllowedStyles,
    pub html_suffix: String,
}

impl PipelineOptions {
    /// Built-in stylesheet, default allowed styles and `.html` suffix.
    pub fn builtin() -> Result<Self, PipelineError> {
        Ok(Self {
            rules: StyleRuleSet::builtin()?,
            allowed_styles: AllowedStyles::default(),
            html_suffix: DEFAULT_HTML_SUFFIX.to_owned(),
        })
    }
}

/// Result handed to the message builder.
#[derive(Debug, Clone)]
pub struct EmailBody {
    /// Name of the document entry the html came from.
    pub html_entry: String,
    /// Complete document with inlined styles and `cid:` asset references.
    pub html: String,
    /// Every archive entry except the document itself.
    pub assets: BTreeMap<String, Vec<u8>>,
}

impl EmailBody {
    pub fn attachments(&self) -> Vec<InlineAttachment> {
        inline_attachments(&self.assets)
    }
}

/// Run the whole conversion on raw archive bytes.
pub fn convert(raw: &[u8], options: &PipelineOptions) -> Result<EmailBody, PipelineError> {
    let archive = Archive::read(raw)?;
    let bundle = archive.classify(&options.html_suffix)?;
    log!("archive"; "document `{}`", bundle.html_entry);

    log!("clean"; "sanitizing and cleaning html");
    let html = render_html(&bundle.html(), options)?;

    let (html, rewritten) = rewrite_asset_refs(&html, bundle.asset_names());
    log!("rewrite"; "{} asset reference(s) rewritten to cid:", rewritten);

    let html_entry = bundle.html_entry.clone();
    let assets = bundle.attachments();
    log!("archive"; "{} attachment(s)", assets.len());

    Ok(EmailBody {
        html_entry,
        html,
        assets,
    })
}

/// Sanitize, clean and inline one exported html document.
pub fn render_html(html: &str, options: &PipelineOptions) -> Result<String, PipelineError> {
    let fragment = sanitize(html);
    let fragment = clean_fragment(&fragment, &options.allowed_styles);
    log!("inline"; "applying {} style rule(s)", options.rules.rule_count());
    inline_styles(&fragment, &options.rules)
}

// ============================================================================
// Tests
// ============================================================================
