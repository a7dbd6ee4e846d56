//! Html minification for the final email body.
//!
//! Enabled by `[output] minify` or `--minify`.

use crate::config::Config;
use std::borrow::Cow;

/// Minify html based on config.
///
/// Returns `Cow::Borrowed` if minify disabled, `Cow::Owned` if minified.
pub fn minify<'a>(html: &'a [u8], config: &Config) -> Cow<'a, [u8]> {
    if config.output.minify {
        Cow::Owned(minify_html_inner(html))
    } else {
        Cow::Borrowed(html)
    }
}

/// Minify html using `minify_html` crate. Closing tags are kept.
fn minify_html_inner(html: &[u8]) -> Vec<u8> {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = false;
    cfg.remove_bangs = true;
    cfg.remove_processing_instructions = true;
    minify_html::minify(html, &cfg)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_minify(enabled: bool) -> Config {
        let mut config = Config::default();
        config.output.minify = enabled;
        config
    }

    #[test]
    fn test_minify_html_basic() {
        let html = b"<html>\n  <head>\n  </head>\n  <body>\n    <p>Hello</p>\n  </body>\n</html>";
        let result = minify(html, &config_with_minify(true));
        let result_str = String::from_utf8_lossy(&result);

        assert!(!result_str.contains("\n  "));
        assert!(result_str.contains("<p>Hello</p>"));
    }

    #[test]
    fn test_minify_keeps_inline_styles() {
        let html = br#"<html><head></head><body><div class="body" style="max-width:750px;margin:auto"><p>Hi</p></div></body></html>"#;
        let result = minify(html, &config_with_minify(true));
        let result_str = String::from_utf8_lossy(&result);

        assert!(result_str.contains("max-width:750px"));
        assert!(result_str.contains("Hi"));
        assert!(result_str.contains("</p>"));
    }

    #[test]
    fn test_minify_html_enabled() {
        let html = b"<html>\n  <body>\n  </body>\n</html>";

        let minified = minify(html, &config_with_minify(true));
        let not_minified = minify(html, &config_with_minify(false));

        assert!(minified.len() < not_minified.len());
        assert_eq!(&*not_minified, html);
    }

    #[test]
    fn test_minify_html_disabled() {
        let html = b"<html>\n  <body>\n  </body>\n</html>";
        let result = minify(html, &config_with_minify(false));

        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(&*result, html);
    }
}
