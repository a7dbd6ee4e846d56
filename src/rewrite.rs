//! Asset reference rewriting.
//!
//! Every literal occurrence of an asset's archive name becomes `cid:<name>`,
//! wherever it appears in the document. This relies on the exporter's asset
//! names being unique, path shaped, and absent from body text; a coincidental
//! textual match is rewritten too.

use crate::log;
use regex::{Captures, RegexBuilder};
use std::collections::BTreeSet;

/// Content reference scheme for inline attachments.
pub const CID_SCHEME: &str = "cid:";

/// Rewrite all occurrences of each name to its content reference.
///
/// All names are matched in one left-to-right pass, longest first at each
/// position, so a name contained in a longer one never rewrites inside the
/// longer name's references and replaced text is never scanned again.
/// Returns the rewritten document and how many distinct names were found.
pub fn rewrite_asset_refs<'a, I>(html: &str, names: I) -> (String, usize)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut names: Vec<&str> = names.into_iter().filter(|n| !n.is_empty()).collect();
    if names.is_empty() {
        return (html.to_owned(), 0);
    }
    names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    names.dedup();

    let pattern = names
        .iter()
        .map(|name| regex::escape(name))
        .collect::<Vec<_>>()
        .join("|");
    let re = match RegexBuilder::new(&pattern).size_limit(usize::MAX).build() {
        Ok(re) => re,
        Err(err) => {
            log!("rewrite"; "cannot match {} asset names: {}", names.len(), err);
            return (html.to_owned(), 0);
        }
    };

    let mut found = BTreeSet::new();
    let rewritten = re
        .replace_all(html, |caps: &Captures<'_>| {
            let name = &caps[0];
            found.insert(name.to_owned());
            format!("{CID_SCHEME}{name}")
        })
        .into_owned();
    (rewritten, found.len())
}
