//! Allow-list sanitization of the exported markup.
//!
//! Keeps the tags and attributes that user generated content may safely carry
//! in an email, plus `style` on `<span>` (the exporter encodes bold and italic
//! as styled spans). Everything else is dropped silently: disallowed wrappers
//! lose their tags but keep their text, `script`/`style`/`title` and friends
//! lose their contents too. Sanitization never fails; malformed input yields a
//! truncated fragment.

use crate::log;
use crate::utils::xml::{XmlWriter, create_xml_reader, create_xml_writer, filter_elem, tag_name};
use quick_xml::escape::unescape;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::name::QName;
use std::borrow::Cow;

/// Sanitize an html document or fragment down to the email-safe subset.
pub fn sanitize(html: &str) -> String {
    let mut reader = create_xml_reader(html.as_bytes());
    let mut writer = create_xml_writer(html.len());

    loop {
        match reader.read_event() {
            Ok(Event::Start(elem)) => {
                let name = tag_name(&elem);
                if skips_content(&name) {
                    if reader.read_to_end(QName(elem.name().as_ref())).is_err() {
                        break;
                    }
                } else if is_allowed_element(&name) {
                    write_allowed(&mut writer, &elem, &name, false);
                }
            }
            Ok(Event::Empty(elem)) => {
                let name = tag_name(&elem);
                if is_allowed_element(&name) {
                    write_allowed(&mut writer, &elem, &name, true);
                }
            }
            Ok(Event::End(elem)) => {
                let name = elem.name().as_ref().to_ascii_lowercase();
                if is_allowed_element(&name) {
                    let end = BytesEnd::new(String::from_utf8_lossy(&name).into_owned());
                    writer.write_event(Event::End(end)).ok();
                }
            }
            Ok(Event::Comment(_) | Event::DocType(_) | Event::PI(_) | Event::Decl(_)) => {}
            Ok(Event::Eof) => break,
            Ok(event) => {
                writer.write_event(event).ok();
            }
            Err(e) => {
                log!(
                    "sanitize";
                    "markup error at byte {}, truncating: {}",
                    reader.error_position(),
                    e
                );
                break;
            }
        }
    }

    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes)
        .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}

fn write_allowed(writer: &mut XmlWriter, elem: &BytesStart<'_>, name: &[u8], empty: bool) {
    let mut has_href = false;
    let mut cleaned = filter_elem(elem, |key, value| {
        if !is_allowed_attr(name, key) {
            return None;
        }
        if is_url_attr(key) && !is_safe_url(&value) {
            return None;
        }
        if key == b"class" && !is_token_list(&value) {
            return None;
        }
        if key == b"href" {
            has_href = true;
        }
        Some(value.into_owned().into())
    });
    if name == b"a" && has_href {
        cleaned.push_attribute(("rel", "nofollow"));
    }

    let event = if empty {
        Event::Empty(cleaned)
    } else {
        Event::Start(cleaned)
    };
    writer.write_event(event).ok();
}

// ============================================================================
// Policy
// ============================================================================

/// Elements dropped together with everything inside them.
fn skips_content(name: &[u8]) -> bool {
    matches!(
        name,
        b"script"
            | b"style"
            | b"title"
            | b"noscript"
            | b"iframe"
            | b"object"
            | b"embed"
            | b"noembed"
            | b"noframes"
            | b"frameset"
            | b"template"
    )
}

fn is_allowed_element(name: &[u8]) -> bool {
    matches!(
        name,
        b"a" | b"abbr"
            | b"acronym"
            | b"address"
            | b"article"
            | b"aside"
            | b"b"
            | b"bdi"
            | b"bdo"
            | b"big"
            | b"blockquote"
            | b"br"
            | b"caption"
            | b"center"
            | b"cite"
            | b"code"
            | b"col"
            | b"colgroup"
            | b"dd"
            | b"del"
            | b"details"
            | b"dfn"
            | b"div"
            | b"dl"
            | b"dt"
            | b"em"
            | b"figcaption"
            | b"figure"
            | b"footer"
            | b"h1"
            | b"h2"
            | b"h3"
            | b"h4"
            | b"h5"
            | b"h6"
            | b"header"
            | b"hgroup"
            | b"hr"
            | b"i"
            | b"img"
            | b"ins"
            | b"kbd"
            | b"li"
            | b"mark"
            | b"nav"
            | b"ol"
            | b"p"
            | b"pre"
            | b"q"
            | b"rp"
            | b"rt"
            | b"ruby"
            | b"s"
            | b"samp"
            | b"section"
            | b"small"
            | b"span"
            | b"strike"
            | b"strong"
            | b"sub"
            | b"summary"
            | b"sup"
            | b"table"
            | b"tbody"
            | b"td"
            | b"tfoot"
            | b"th"
            | b"thead"
            | b"time"
            | b"tr"
            | b"tt"
            | b"u"
            | b"ul"
            | b"var"
            | b"wbr"
    )
}

fn is_allowed_attr(element: &[u8], attr: &[u8]) -> bool {
    if matches!(attr, b"dir" | b"id" | b"lang" | b"title" | b"class") {
        return true;
    }
    match element {
        b"a" => matches!(attr, b"href" | b"hreflang" | b"name"),
        b"img" => matches!(attr, b"src" | b"alt" | b"width" | b"height" | b"align"),
        b"span" => attr == b"style",
        b"td" | b"th" => matches!(
            attr,
            b"abbr" | b"align" | b"colspan" | b"headers" | b"rowspan" | b"valign" | b"scope"
        ),
        b"table" => matches!(attr, b"summary" | b"align" | b"width"),
        b"col" | b"colgroup" => matches!(attr, b"span" | b"width" | b"align"),
        b"ol" => matches!(attr, b"type" | b"start" | b"reversed"),
        b"ul" => attr == b"type",
        b"li" => attr == b"value",
        b"blockquote" | b"q" | b"del" | b"ins" => attr == b"cite",
        b"time" => attr == b"datetime",
        _ => false,
    }
}

fn is_url_attr(attr: &[u8]) -> bool {
    matches!(attr, b"href" | b"src" | b"cite")
}

/// Relative urls, fragments and the http(s)/mailto schemes are accepted.
fn is_safe_url(raw: &[u8]) -> bool {
    let Ok(raw) = std::str::from_utf8(raw) else {
        return false;
    };
    let Ok(url) = unescape(raw) else {
        return false;
    };
    let url: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect();

    let scheme_end = url.find(':');
    let path_start = url.find(['/', '?', '#']);
    match (scheme_end, path_start) {
        (None, _) => true,
        (Some(colon), Some(path)) if path < colon => true,
        (Some(colon), _) => {
            let scheme = url[..colon].to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto")
        }
    }
}

/// Space separated tokens of letters, digits, `-` and `_`.
fn is_token_list(value: &Cow<'_, [u8]>) -> bool {
    !value.is_empty()
        && value
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b' ' | b'\t'))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_document_wrappers_and_head() {
        let html = r#"<html><head><meta content="text/html; charset=UTF-8" http-equiv="content-type"><title>Doc</title><style type="text/css">.c1{color:red}</style></head><body class="c5"><p>Hello</p></body></html>"#;
        assert_eq!(sanitize(html), "<p>Hello</p>");
    }

    #[test]
    fn test_drops_script_with_contents() {
        let html = "<p>a</p><script>alert('x')</script><p>b</p>";
        assert_eq!(sanitize(html), "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_unknown_wrapper_keeps_text() {
        let html = "<p><font color=\"red\">warm</font></p>";
        assert_eq!(sanitize(html), "<p>warm</p>");
    }

    #[test]
    fn test_style_allowed_only_on_span() {
        let html = r#"<p style="margin:0"><span style="font-weight:700">Bold</span></p>"#;
        assert_eq!(
            sanitize(html),
            r#"<p><span style="font-weight:700">Bold</span></p>"#
        );
    }

    #[test]
    fn test_event_handlers_removed() {
        let html = r#"<img src="images/image1.png" onerror="x()" alt="pic">"#;
        assert_eq!(sanitize(html), r#"<img src="images/image1.png" alt="pic">"#);
    }

    #[test]
    fn test_links_get_nofollow() {
        let html = r##"<sup><a href="#cmnt1" id="cmnt_ref1">[a]</a></sup>"##;
        assert_eq!(
            sanitize(html),
            r##"<sup><a href="#cmnt1" id="cmnt_ref1" rel="nofollow">[a]</a></sup>"##
        );
    }

    #[test]
    fn test_anchor_without_href_has_no_rel() {
        let html = r#"<a id="t.0"></a>"#;
        assert_eq!(sanitize(html), r#"<a id="t.0"></a>"#);
    }

    #[test]
    fn test_unsafe_urls_dropped() {
        let html = r#"<a href="javascript:alert(1)">x</a><a href="JaVaScRiPt&#58;alert(1)">y</a>"#;
        assert_eq!(sanitize(html), "<a>x</a><a>y</a>");
    }

    #[test]
    fn test_safe_urls_kept() {
        assert!(is_safe_url(b"images/image1.png"));
        assert!(is_safe_url(b"#cmnt1"));
        assert!(is_safe_url(b"https://www.google.com/url?q=https://example.com"));
        assert!(is_safe_url(b"mailto:alice@example.com"));
        assert!(is_safe_url(b"./a:b"));
        assert!(!is_safe_url(b"data:text/html,hi"));
        assert!(!is_safe_url(b"vbscript:x"));
    }

    #[test]
    fn test_class_tokens_checked() {
        let html = r#"<p class="title c3">T</p><p class="x;y">U</p>"#;
        assert_eq!(sanitize(html), r#"<p class="title c3">T</p><p>U</p>"#);
    }

    #[test]
    fn test_comments_removed_and_entities_kept() {
        let html = "<p>a<!-- hidden -->&amp;b&nbsp;c</p>";
        assert_eq!(sanitize(html), "<p>a&amp;b&nbsp;c</p>");
    }

    #[test]
    fn test_void_elements_pass_through() {
        let html = "<p>line<br>next</p><hr>";
        assert_eq!(sanitize(html), "<p>line<br>next</p><hr>");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize(""), "");
    }
}
