//! Node - a single element or text run in the host document.

use crate::geometry::Rect;
use std::collections::BTreeMap;

/// What a node holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An element with a lowercase tag name.
    Element(String),
    /// A text run.
    Text(String),
}

/// A node in the document tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique node ID.
    pub id: u64,
    /// Element tag or text payload.
    pub kind: NodeKind,
    /// Parent node ID.
    pub parent_id: Option<u64>,
    /// Child node IDs in document order.
    pub children: Vec<u64>,
    /// Class list in insertion order, without duplicates.
    pub classes: Vec<String>,
    /// Attributes other than `class` and `style`.
    pub attributes: BTreeMap<String, String>,
    /// Inline style declarations.
    pub style: BTreeMap<String, String>,
    /// Layout box in viewport coordinates, supplied by the host.
    pub rect: Rect,
}

impl Node {
    pub(crate) fn new(id: u64, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            parent_id: None,
            children: Vec::new(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            style: BTreeMap::new(),
            rect: Rect::default(),
        }
    }

    /// Tag name, or `None` for text nodes.
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element(tag) => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element(_))
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    pub fn style_value(&self, property: &str) -> Option<&str> {
        self.style.get(property).map(String::as_str)
    }

    pub fn set_style(&mut self, property: &str, value: &str) {
        self.style.insert(property.to_string(), value.to_string());
    }

    pub fn remove_style(&mut self, property: &str) {
        self.style.remove(property);
    }

    /// Parse a `style` attribute value into the style map.
    pub fn apply_style_attr(&mut self, declarations: &str) {
        for decl in declarations.split(';') {
            let Some((prop, value)) = decl.split_once(':') else {
                continue;
            };
            let prop = prop.trim();
            if !prop.is_empty() {
                self.set_style(prop, value.trim());
            }
        }
    }

    /// Serialize the style map back to a `style` attribute value.
    pub fn style_attr(&self) -> String {
        self.style
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
