//! Style inlining.
//!
//! The cleaned fragment is wrapped in a fixed skeleton whose head declares the
//! style rule set and whose body holds the fragment in a `div.body` container.
//! The document is parsed once, every element gets its matching declarations
//! merged into its own `style` attribute, and the tree is written back out.

mod css;

pub use css::StyleRuleSet;

use crate::error::PipelineError;
use scraper::{ElementRef, Html, Node};

/// Class of the container the fragment is placed in.
pub const BODY_CLASS: &str = "body";

/// Elements that never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Inline `rules` into `fragment`, producing a complete standalone document.
///
/// Fails if the fragment does not stay inside its container once parsed,
/// e.g. because stray closing tags break out of it.
pub fn inline_styles(fragment: &str, rules: &StyleRuleSet) -> Result<String, PipelineError> {
    let skeleton = format!(
        r#"<html><head><style>{}</style></head><body><div class="{BODY_CLASS}">{fragment}</div></body></html>"#,
        rules.source()
    );
    let document = Html::parse_document(&skeleton);
    let root = document.root_element();
    check_container(root)?;

    let mut out = String::with_capacity(skeleton.len() * 2);
    write_element(&mut out, root, rules);
    Ok(out)
}

/// The body must hold exactly the container, plus whitespace at most.
fn check_container(root: ElementRef<'_>) -> Result<(), PipelineError> {
    let body = root
        .children()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "body")
        .ok_or_else(|| PipelineError::Inlining("document has no body".into()))?;

    let mut containers = 0;
    for child in body.children() {
        match child.value() {
            Node::Element(el) if el.name() == "div" && el.classes().any(|c| c == BODY_CLASS) => {
                containers += 1;
            }
            Node::Element(el) => {
                return Err(PipelineError::Inlining(format!(
                    "`<{}>` escaped the body container",
                    el.name()
                )));
            }
            Node::Text(text) if !text.trim().is_empty() => {
                return Err(PipelineError::Inlining(
                    "text escaped the body container".into(),
                ));
            }
            _ => {}
        }
    }

    match containers {
        1 => Ok(()),
        n => Err(PipelineError::Inlining(format!(
            "expected one body container, found {n}"
        ))),
    }
}

fn write_element(out: &mut String, element: ElementRef<'_>, rules: &StyleRuleSet) {
    let el = element.value();
    let name = el.name();

    // The skeleton stylesheet is consumed here; only rules that could not be
    // inlined survive into the output.
    if name == "style" {
        if !rules.residual().is_empty() {
            out.push_str("<style>");
            out.push_str(rules.residual());
            out.push_str("</style>");
        }
        return;
    }

    let style = rules
        .computed_style(&element)
        .iter()
        .map(|(property, value)| format!("{property}:{value}"))
        .collect::<Vec<_>>()
        .join(";");

    out.push('<');
    out.push_str(name);
    let mut style_written = false;
    for (key, value) in el.attrs() {
        if key == "style" {
            if !style.is_empty() {
                write_attr(out, key, &style);
            }
            style_written = true;
        } else {
            write_attr(out, key, value);
        }
    }
    if !style_written && !style.is_empty() {
        write_attr(out, "style", &style);
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&name) {
        return;
    }

    for child in element.children() {
        match child.value() {
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    write_element(out, child, rules);
                }
            }
            Node::Text(text) => escape_into(out, text, false),
            _ => {}
        }
    }

    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn write_attr(out: &mut String, key: &str, value: &str) {
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    escape_into(out, value, true);
    out.push('"');
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
