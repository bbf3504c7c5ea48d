//! Markup loading and serialization for host documents.
//!
//! Pages are read as XHTML-style markup with `quick-xml`; `class` and
//! `style` attributes land in the node's class list and style map.

use crate::dom::{Document, NodeKind};
use crate::Result;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Elements serialized without a closing tag.
const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

/// Phrasing elements; whitespace between two of them is content.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "br", "code", "em", "i", "img", "kbd", "label", "mark", "q", "s", "small", "span", "strong",
    "sub", "sup", "u",
];

/// Parse a whole page into a fresh document.
pub fn parse_document(markup: &str) -> Result<Document> {
    let mut doc = Document::new();
    let root = doc.root();
    parse_fragment_into(&mut doc, root, markup)?;
    // Loading is not an observable change.
    doc.take_mutations();
    Ok(doc)
}

/// Parse a page from disk.
pub fn parse_document_file(path: &std::path::Path) -> Result<Document> {
    let contents = std::fs::read_to_string(path)?;
    parse_document(&contents)
}

/// Parse `markup` and append the resulting nodes under `parent`.
///
/// Returns the IDs of the top-level nodes created.
pub fn parse_fragment_into(doc: &mut Document, parent: u64, markup: &str) -> Result<Vec<u64>> {
    let mut reader = Reader::from_str(markup);
    let mut stack = vec![parent];
    let mut top_level = Vec::new();
    // Whitespace-only text held until the next event shows whether it
    // separates inline content.
    let mut held_space: Option<(u64, String)> = None;

    loop {
        let event = reader.read_event()?;
        let current = *stack.last().unwrap_or(&parent);
        if let Some((at, space)) = held_space.take() {
            if at == current && continues_inline(&event) && ends_inline(doc, current) {
                let id = doc.create_text(&space);
                doc.append_child(current, id)?;
                if stack.len() == 1 {
                    top_level.push(id);
                }
            }
        }
        match event {
            Event::Start(start) => {
                let id = element_from_start(doc, &start)?;
                doc.append_child(current, id)?;
                if stack.len() == 1 {
                    top_level.push(id);
                }
                stack.push(id);
            }
            Event::Empty(start) => {
                let id = element_from_start(doc, &start)?;
                doc.append_child(current, id)?;
                if stack.len() == 1 {
                    top_level.push(id);
                }
            }
            Event::End(_) => {
                if stack.len() > 1 {
                    stack.pop();
                }
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                if text.trim().is_empty() {
                    held_space = Some((current, text.into_owned()));
                } else {
                    let id = doc.create_text(&text);
                    doc.append_child(current, id)?;
                    if stack.len() == 1 {
                        top_level.push(id);
                    }
                }
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data).into_owned();
                let id = doc.create_text(&text);
                doc.append_child(current, id)?;
                if stack.len() == 1 {
                    top_level.push(id);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(top_level)
}

fn is_inline_tag(name: &[u8]) -> bool {
    INLINE_TAGS.iter().any(|tag| tag.as_bytes().eq_ignore_ascii_case(name))
}

fn continues_inline(event: &Event<'_>) -> bool {
    match event {
        Event::Start(start) | Event::Empty(start) => is_inline_tag(start.name().as_ref()),
        Event::Text(text) => text.iter().any(|b| !b.is_ascii_whitespace()),
        Event::CData(_) => true,
        _ => false,
    }
}

/// Whether the last child of `parent` is text or a phrasing element.
fn ends_inline(doc: &Document, parent: u64) -> bool {
    let Some(&last) = doc.children(parent).last() else {
        return false;
    };
    match doc.get(last).map(|node| &node.kind) {
        Some(NodeKind::Text(_)) => true,
        Some(NodeKind::Element(tag)) => is_inline_tag(tag.as_bytes()),
        None => false,
    }
}

fn element_from_start(doc: &mut Document, start: &BytesStart<'_>) -> Result<u64> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let id = doc.create_element(&tag);
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.push((key, value));
    }
    if let Some(node) = doc.get_mut(id) {
        for (key, value) in attrs {
            match key.as_str() {
                "class" => value.split_whitespace().for_each(|c| node.add_class(c)),
                "style" => node.apply_style_attr(&value),
                _ => node.set_attr(&key, &value),
            }
        }
    }
    Ok(id)
}

/// Serialize the children of `id`.
pub fn inner_markup(doc: &Document, id: u64) -> String {
    let mut out = String::new();
    for &child in doc.children(id) {
        write_node(doc, child, &mut out);
    }
    out
}

/// Serialize `id` itself and its subtree.
pub fn outer_markup(doc: &Document, id: u64) -> String {
    let mut out = String::new();
    write_node(doc, id, &mut out);
    out
}

fn write_node(doc: &Document, id: u64, out: &mut String) {
    let Some(node) = doc.get(id) else { return };
    let tag = match &node.kind {
        NodeKind::Text(text) => {
            out.push_str(&escape(text.as_str()));
            return;
        }
        NodeKind::Element(tag) => tag,
    };
    if tag == crate::dom::ROOT_TAG {
        for &child in &node.children {
            write_node(doc, child, out);
        }
        return;
    }

    out.push('<');
    out.push_str(tag);
    if !node.classes.is_empty() {
        push_attr(out, "class", &node.classes.join(" "));
    }
    for (key, value) in &node.attributes {
        push_attr(out, key, value);
    }
    if !node.style.is_empty() {
        push_attr(out, "style", &node.style_attr());
    }
    if VOID_TAGS.contains(&tag.as_str()) {
        out.push_str(" />");
        return;
    }
    out.push('>');
    for &child in &node.children {
        write_node(doc, child, out);
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn push_attr(out: &mut String, key: &str, value: &str) {
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push('"');
}
