//! A small CSS selector subset for locating host fields.
//!
//! Supported: tag names, `*`, `.class`, `[attr]`, `[attr="value"]`, compound
//! combinations of those, the descendant combinator (whitespace) and selector
//! lists separated by commas.

use super::{Document, Node};
use crate::{Error, Result};

/// One `[attr]` or `[attr=value]` test.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrTest {
    name: String,
    value: Option<String>,
}

/// A compound selector: everything between two combinators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

impl Compound {
    fn matches(&self, node: &Node) -> bool {
        let Some(tag) = node.tag() else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|t| t != tag) {
            return false;
        }
        if !self.classes.iter().all(|c| node.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|test| match (&test.value, node.attr(&test.name)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(want), Some(have)) => want == have,
        })
    }
}

/// Compounds joined by descendant combinators, left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    parts: Vec<Compound>,
}

impl Complex {
    fn matches(&self, doc: &Document, id: u64) -> bool {
        let Some((last, rest)) = self.parts.split_last() else {
            return false;
        };
        let Some(node) = doc.get(id) else {
            return false;
        };
        if !last.matches(node) {
            return false;
        }
        // Nearest-ancestor greedy matching is exact for descendant-only chains.
        let mut remaining = rest.iter().rev().peekable();
        for ancestor in doc.ancestors(id) {
            let Some(part) = remaining.peek() else {
                break;
            };
            if doc.get(ancestor).is_some_and(|n| part.matches(n)) {
                remaining.next();
            }
        }
        remaining.peek().is_none()
    }
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self> {
        let fail = |reason: &str| Error::Selector {
            selector: source.to_string(),
            reason: reason.to_string(),
        };

        let mut alternatives = Vec::new();
        for alternative in split_top_level(source) {
            let alternative = alternative.trim();
            if alternative.is_empty() {
                return Err(fail("empty selector in list"));
            }
            let parts = split_compounds(alternative)
                .into_iter()
                .map(|part| parse_compound(part).map_err(|reason| fail(&reason)))
                .collect::<Result<Vec<_>>>()?;
            alternatives.push(Complex { parts });
        }
        if alternatives.is_empty() {
            return Err(fail("empty selector"));
        }
        Ok(Self {
            source: source.to_string(),
            alternatives,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the node with `id` matches any alternative.
    pub fn matches(&self, doc: &Document, id: u64) -> bool {
        self.alternatives.iter().any(|alt| alt.matches(doc, id))
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Split on commas that are not inside brackets or quotes.
fn split_top_level(source: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut quote = None;
    let mut start = 0;
    for (i, ch) in source.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                out.push(&source[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&source[start..]);
    out
}

/// Split a complex selector on whitespace outside brackets.
fn split_compounds(source: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    for (i, ch) in source.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    out.push(&source[s..i]);
                }
                continue;
            }
            _ => {}
        }
        start.get_or_insert(i);
    }
    if let Some(s) = start {
        out.push(&source[s..]);
    }
    out
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_')
}

type Chars<'a> = std::iter::Peekable<std::str::CharIndices<'a>>;

fn take_ident(chars: &mut Chars<'_>) -> String {
    let mut ident = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if !is_ident_char(c) {
            break;
        }
        ident.push(c);
        chars.next();
    }
    ident
}

fn parse_compound(source: &str) -> std::result::Result<Compound, String> {
    let mut compound = Compound::default();
    let mut chars = source.char_indices().peekable();

    match chars.peek() {
        Some(&(_, '*')) => {
            chars.next();
        }
        Some(&(_, c)) if is_ident_char(c) => {
            compound.tag = Some(take_ident(&mut chars).to_ascii_lowercase());
        }
        _ => {}
    }

    while let Some((_, ch)) = chars.next() {
        match ch {
            '.' => {
                let class = take_ident(&mut chars);
                if class.is_empty() {
                    return Err("expected class name after '.'".into());
                }
                compound.classes.push(class);
            }
            '[' => {
                let name = take_ident(&mut chars);
                if name.is_empty() {
                    return Err("expected attribute name after '['".into());
                }
                let value = match chars.next() {
                    Some((_, ']')) => None,
                    Some((_, '=')) => {
                        let value = match chars.peek() {
                            Some(&(_, q @ ('"' | '\''))) => {
                                chars.next();
                                let mut value = String::new();
                                loop {
                                    match chars.next() {
                                        Some((_, c)) if c == q => break,
                                        Some((_, c)) => value.push(c),
                                        None => return Err("unterminated quoted value".into()),
                                    }
                                }
                                value
                            }
                            _ => take_ident(&mut chars),
                        };
                        match chars.next() {
                            Some((_, ']')) => Some(value),
                            _ => return Err("expected ']'".into()),
                        }
                    }
                    _ => return Err("expected ']' or '='".into()),
                };
                compound.attrs.push(AttrTest { name, value });
            }
            other => return Err(format!("unexpected character {other:?}")),
        }
    }
    Ok(compound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_document;

    fn doc() -> Document {
        parse_document(
            r#"<body>
                <div class="umb-property" data-element="property">
                    <div class="umb-property-editor">
                        <label for="title">Title</label>
                    </div>
                    <small class="control-description">Help</small>
                </div>
            </body>"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse(".a,").is_err());
        assert!(Selector::parse("[data-x").is_err());
        assert!(Selector::parse("div > p").is_err());
    }

    #[test]
    fn test_class_and_attribute_matching() {
        let doc = doc();
        let property = Selector::parse(r#"[data-element="property"]"#).unwrap();
        let hits = doc.find_all(doc.root(), &property);
        assert_eq!(hits.len(), 1);
        assert!(doc.get(hits[0]).unwrap().has_class("umb-property"));

        let wrong_value = Selector::parse("[data-element=block]").unwrap();
        assert!(doc.find_all(doc.root(), &wrong_value).is_empty());
    }

    #[test]
    fn test_descendant_combinator() {
        let doc = doc();
        let sel = Selector::parse(".umb-property-editor label").unwrap();
        let label = doc.find_first(doc.root(), &sel).expect("label under editor");
        assert_eq!(doc.get(label).unwrap().tag(), Some("label"));

        let miss = Selector::parse(".umb-property-editor .control-description").unwrap();
        assert!(doc.find_first(doc.root(), &miss).is_none());
    }

    #[test]
    fn test_selector_list_matches_any() {
        let doc = doc();
        let sel = Selector::parse("label[for], .control-description").unwrap();
        assert_eq!(doc.find_all(doc.root(), &sel).len(), 2);
    }
}
