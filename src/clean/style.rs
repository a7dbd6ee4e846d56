//! Inline style filtering.
//!
//! The exporter attaches positional and typographic declarations to nearly
//! every run of text and encodes bold/italic as span styles instead of
//! `<b>`/`<i>`. Only declarations in the allowed set survive.

use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Matches a whole `style="..."` attribute.
static RE_STYLE_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"style="([^"]*)""#).unwrap());

/// Declarations permitted to stay in inline `style` attributes.
///
/// Entries are kept normalized as `property:value` (lowercase property, no
/// surrounding whitespace) and compared whole; a declaration is either kept
/// verbatim or dropped, never partially merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedStyles {
    declarations: BTreeSet<String>,
}

impl Default for AllowedStyles {
    fn default() -> Self {
        Self {
            declarations: ["font-style:italic", "font-weight:700"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl AllowedStyles {
    /// Build from `property:value` strings. Returns the first entry that is
    /// not a declaration.
    pub fn from_declarations<I, S>(declarations: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let declarations = declarations
            .into_iter()
            .map(|decl| normalize_declaration(decl.as_ref()).ok_or_else(|| decl.as_ref().to_owned()))
            .collect::<Result<_, _>>()?;
        Ok(Self { declarations })
    }

    #[cfg(test)]
    pub fn contains(&self, declaration: &str) -> bool {
        normalize_declaration(declaration).is_some_and(|decl| self.declarations.contains(&decl))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.declarations.iter().map(String::as_str)
    }
}

/// Normalize `" Font-Weight : 700 "` to `"font-weight:700"`.
fn normalize_declaration(declaration: &str) -> Option<String> {
    let (property, value) = declaration.split_once(':')?;
    let property = property.trim().to_ascii_lowercase();
    let value = value.trim();
    if property.is_empty() || value.is_empty() {
        return None;
    }
    Some(format!("{property}:{value}"))
}

/// Rewrite every `style` attribute down to its allowed declarations.
///
/// An attribute with nothing left is removed entirely; the whitespace that
/// preceded it stays, leaving e.g. `<span >` for the span pass to collapse.
pub fn clean_styles(html: &str, allowed: &AllowedStyles) -> String {
    RE_STYLE_ATTR
        .replace_all(html, |caps: &Captures<'_>| {
            let kept: Vec<String> = caps[1]
                .split(';')
                .filter_map(normalize_declaration)
                .filter(|decl| allowed.declarations.contains(decl))
                .collect();
            if kept.is_empty() {
                String::new()
            } else {
                format!(r#"style="{}""#, kept.join(";"))
            }
        })
        .into_owned()
}
