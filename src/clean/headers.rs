//! Heading wrapper removal.
//!
//! Headings come with their typography on a nested span, which would beat the
//! heading rules once styles are inlined.

use regex::Regex;
use std::sync::LazyLock;

/// A heading with an id whose whole text sits in one attributed span.
static RE_HEADER_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(<h\d id="[^"]+">)<span[^>]+>([^<]*)</span>(</h\d>)"#).unwrap()
});

/// Drop the span wrapping a heading's text.
pub fn clean_headers(html: &str) -> String {
    RE_HEADER_SPAN.replace_all(html, "${1}${2}${3}").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_styled_header_span() {
        assert_eq!(
            clean_headers(r#"<h1 id="x"><span style="font-weight:700">Title</span></h1>"#),
            r#"<h1 id="x">Title</h1>"#
        );
    }

    #[test]
    fn test_all_heading_levels() {
        for level in 1..=6 {
            let html = format!(r#"<h{level} id="h.{level}"><span class="c1">T</span></h{level}>"#);
            assert_eq!(
                clean_headers(&html),
                format!(r#"<h{level} id="h.{level}">T</h{level}>"#)
            );
        }
    }

    #[test]
    fn test_partial_span_untouched() {
        let html = r#"<h2 id="x">Intro <span style="font-style:italic">here</span></h2>"#;
        assert_eq!(clean_headers(html), html);
    }

    #[test]
    fn test_heading_without_id_untouched() {
        let html = r#"<h3><span style="font-weight:700">T</span></h3>"#;
        assert_eq!(clean_headers(html), html);
    }

    #[test]
    fn test_paragraph_untouched() {
        let html = r#"<p id="x"><span style="font-weight:700">T</span></p>"#;
        assert_eq!(clean_headers(html), html);
    }
}
