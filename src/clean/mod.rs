//! Cleanup passes over sanitized export markup.
//!
//! Each pass is a narrow textual rewrite tuned to the exporter's output
//! shapes, not a general html transform. A pass that matches nothing leaves
//! its input unchanged. The passes interact, so [`clean_fragment`] applies
//! them in a fixed order:
//!
//! 1. [`clean_styles`]   - drop every inline declaration outside the allowed set
//! 2. [`clean_comments`] - drop reviewer comment anchors and the trailing comments block
//! 3. [`clean_spans`]    - unwrap attribute-less spans holding only text
//! 4. [`clean_headers`]  - unwrap a styled span spanning a whole heading

mod comments;
mod headers;
mod spans;
mod style;

pub use comments::clean_comments;
pub use headers::clean_headers;
pub use spans::clean_spans;
pub use style::{AllowedStyles, clean_styles};

/// Run all cleanup passes in order.
///
/// Styles go first because stripping them is what leaves spans bare; comment
/// markup goes before span collapsing since removing it changes which spans
/// end up empty; headers go last so their wrapper span never reaches the
/// inliner where it would override heading rules.
pub fn clean_fragment(html: &str, allowed: &AllowedStyles) -> String {
    let html = clean_styles(html, allowed);
    let html = clean_comments(&html);
    let html = clean_spans(&html);
    clean_headers(&html)
}
