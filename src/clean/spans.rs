//! Bare span collapsing.

use regex::Regex;
use std::sync::LazyLock;

/// A span with no attributes and no child elements.
static RE_EMPTY_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<span\s*>([^<]*)</span>").unwrap());

/// Replace attribute-less, text-only spans by their text.
pub fn clean_spans(html: &str) -> String {
    RE_EMPTY_SPAN.replace_all(html, "$1").into_owned()
}
