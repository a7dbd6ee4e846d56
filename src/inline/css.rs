//! Style rule set: the constant stylesheet applied to every email.
//!
//! Only what the inliner needs is parsed: rule blocks, comma separated
//! selector lists and `property: value [!important]` declarations. Rules whose
//! selectors cannot be resolved per element (pseudo-classes, at-rules) are kept
//! aside verbatim and emitted as a residual `<style>` block.

use crate::error::PipelineError;
use scraper::{ElementRef, Selector};

/// Stylesheet compiled into the binary.
pub const BUILTIN_CSS: &str = include_str!("../embed/css/email.css");

/// One `property: value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

/// Selector specificity as `(ids, classes, types)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity(pub u32, pub u32, pub u32);

#[derive(Debug)]
struct StyleRule {
    selector: Selector,
    specificity: Specificity,
    /// Position in the stylesheet; later rules win ties.
    order: usize,
    declarations: Vec<Declaration>,
}

/// Parsed, immutable stylesheet. Built once and shared by reference.
#[derive(Debug)]
pub struct StyleRuleSet {
    source: String,
    rules: Vec<StyleRule>,
    residual: String,
}

impl StyleRuleSet {
    /// The stylesheet embedded at build time.
    pub fn builtin() -> Result<Self, PipelineError> {
        Self::parse(BUILTIN_CSS)
    }

    pub fn parse(css: &str) -> Result<Self, PipelineError> {
        let source = strip_comments(css);
        let mut rules = Vec::new();
        let mut residual = String::new();
        let mut order = 0;

        for block in split_blocks(&source)? {
            if block.prelude.starts_with('@') {
                residual.push_str(block.raw);
                residual.push('\n');
                continue;
            }

            let declarations = parse_declarations(block.body);
            for selector_text in split_top_level(block.prelude, ',') {
                let selector_text = selector_text.trim();
                if selector_text.is_empty() {
                    continue;
                }
                if !is_inlinable(selector_text) {
                    residual.push_str(&format!("{selector_text} {{{}}}\n", block.body.trim()));
                    continue;
                }
                let selector = Selector::parse(selector_text).map_err(|e| {
                    PipelineError::Inlining(format!("invalid selector `{selector_text}`: {e:?}"))
                })?;
                rules.push(StyleRule {
                    selector,
                    specificity: specificity(selector_text),
                    order,
                    declarations: declarations.clone(),
                });
                order += 1;
            }
        }

        Ok(Self {
            source,
            rules,
            residual,
        })
    }

    /// Stylesheet text as declared in the document head.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Rules that stay in a `<style>` block instead of being inlined.
    pub fn residual(&self) -> &str {
        &self.residual
    }

    /// Number of inlinable selector rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Effective declarations for `element`, merged with its own `style`.
    ///
    /// Stylesheet declarations apply by ascending specificity then source
    /// order; inline declarations override them, and `!important` stylesheet
    /// declarations override inline ones. Properties keep the position of
    /// their first appearance.
    pub fn computed_style(&self, element: &ElementRef<'_>) -> Vec<(String, String)> {
        let mut matched: Vec<&StyleRule> = self
            .rules
            .iter()
            .filter(|rule| rule.selector.matches(element))
            .collect();
        matched.sort_by_key(|rule| (rule.specificity, rule.order));

        let inline = element
            .value()
            .attr("style")
            .map(parse_declarations)
            .unwrap_or_default();

        let mut cascade = Cascade::default();
        for rule in &matched {
            for decl in rule.declarations.iter().filter(|d| !d.important) {
                cascade.set(decl);
            }
        }
        for decl in &inline {
            cascade.set(decl);
        }
        for rule in &matched {
            for decl in rule.declarations.iter().filter(|d| d.important) {
                cascade.set(decl);
            }
        }
        cascade.entries
    }
}

#[derive(Default)]
struct Cascade {
    entries: Vec<(String, String)>,
}

impl Cascade {
    fn set(&mut self, decl: &Declaration) {
        match self.entries.iter_mut().find(|(p, _)| *p == decl.property) {
            Some(entry) => entry.1 = decl.value.clone(),
            None => self
                .entries
                .push((decl.property.clone(), decl.value.clone())),
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

struct Block<'a> {
    prelude: &'a str,
    body: &'a str,
    raw: &'a str,
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

/// Split a stylesheet into top-level `prelude { body }` blocks.
fn split_blocks(css: &str) -> Result<Vec<Block<'_>>, PipelineError> {
    let mut blocks = Vec::new();
    let mut start = 0;
    let mut open = None;
    let mut depth = 0usize;

    for (i, c) in css.char_indices() {
        match c {
            '{' => {
                if depth == 0 {
                    open = Some(i);
                }
                depth += 1;
            }
            '}' => {
                if depth == 0 {
                    return Err(PipelineError::Inlining(format!(
                        "unbalanced `}}` at byte {i} of stylesheet"
                    )));
                }
                depth -= 1;
                if depth == 0
                    && let Some(open) = open.take()
                {
                    blocks.push(Block {
                        prelude: css[start..open].trim(),
                        body: &css[open + 1..i],
                        raw: css[start..=i].trim(),
                    });
                    start = i + 1;
                }
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(PipelineError::Inlining("unterminated rule in stylesheet".into()));
    }
    Ok(blocks)
}

/// Split on `sep` outside quotes, parentheses and brackets.
fn split_top_level(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth -= 1,
            (None, c) if c == sep && depth <= 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Parse a declaration block or an inline `style` value.
pub fn parse_declarations(block: &str) -> Vec<Declaration> {
    split_top_level(block, ';')
        .into_iter()
        .filter_map(parse_declaration)
        .collect()
}

fn parse_declaration(raw: &str) -> Option<Declaration> {
    let (property, value) = raw.split_once(':')?;
    let property = property.trim().to_ascii_lowercase();
    let mut value = value.trim();
    let mut important = false;

    if let Some(bang) = value.rfind('!')
        && value[bang + 1..].trim().eq_ignore_ascii_case("important")
    {
        important = true;
        value = value[..bang].trim_end();
    }

    if property.is_empty() || value.is_empty() {
        return None;
    }
    Some(Declaration {
        property,
        value: value.to_owned(),
        important,
    })
}

/// Selectors with pseudo-classes or pseudo-elements depend on state or
/// generated content and cannot be written onto an element.
fn is_inlinable(selector: &str) -> bool {
    let mut in_brackets = false;
    for c in selector.chars() {
        match c {
            '[' => in_brackets = true,
            ']' => in_brackets = false,
            ':' if !in_brackets => return false,
            _ => {}
        }
    }
    true
}

/// Specificity of a selector without pseudo-classes.
fn specificity(selector: &str) -> Specificity {
    let mut spec = Specificity::default();
    let mut chars = selector.chars().peekable();
    // Type selectors start a compound: at the beginning or after a combinator.
    let mut compound_start = true;

    while let Some(c) = chars.next() {
        match c {
            '#' => {
                spec.0 += 1;
                skip_ident(&mut chars);
                compound_start = false;
            }
            '.' => {
                spec.1 += 1;
                skip_ident(&mut chars);
                compound_start = false;
            }
            '[' => {
                spec.1 += 1;
                for c in chars.by_ref() {
                    if c == ']' {
                        break;
                    }
                }
                compound_start = false;
            }
            ' ' | '>' | '+' | '~' => compound_start = true,
            '*' => compound_start = false,
            c if compound_start && (c.is_ascii_alphabetic() || c == '-' || c == '_') => {
                spec.2 += 1;
                skip_ident(&mut chars);
                compound_start = false;
            }
            _ => {}
        }
    }
    spec
}

fn skip_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    while chars
        .peek()
        .is_some_and(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
    {
        chars.next();
    }
}

// ============================================================================
// Tests
// ============================================================================
