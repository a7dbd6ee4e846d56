//! Reviewer comment removal.
//!
//! The export carries reviewer comments as footnote-style anchors in the body
//! (`<sup><a href="#cmnt1" id="cmnt_ref1">[a]</a></sup>`) plus a trailing
//! section opened by a bare "Comments" paragraph. Both are matched in their
//! sanitized form, where anchors have gained `rel="nofollow"`.

use regex::Regex;
use std::sync::LazyLock;

/// Inline anchor linking to one comment entry.
static RE_ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r##"<sup><a href="#cmnt\d+" id="cmnt_ref\d+" rel="nofollow">\[\w+\]</a></sup>"##)
        .unwrap()
});

/// Start of the trailing comments block, through to the end of the document.
static RE_COMMENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<p><span>Comments</span></p><div><p>.*$").unwrap());

/// Remove comment anchors and the trailing comments section.
pub fn clean_comments(html: &str) -> String {
    let html = RE_ANCHOR.replace_all(html, "");
    RE_COMMENTS.replace(&html, "").into_owned()
}
