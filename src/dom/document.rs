//! Document - registry of all nodes in the host page.

use super::{Node, NodeKind, Selector};
use crate::geometry::Rect;
use crate::{Error, Result};
use std::collections::HashMap;

/// Tag of the synthetic root node.
pub const ROOT_TAG: &str = "#document";

/// One structural change, as seen by a child-list observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// Parent whose child list changed.
    pub target: u64,
    /// Roots of subtrees inserted under `target`.
    pub added: Vec<u64>,
    /// Every node of the subtrees removed from `target`.
    pub removed: Vec<u64>,
}

/// Registry of all nodes, plus the pending mutation log.
#[derive(Debug)]
pub struct Document {
    nodes: HashMap<u64, Node>,
    root: u64,
    next_id: u64,
    mutations: Vec<MutationRecord>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(1, Node::new(1, NodeKind::Element(ROOT_TAG.to_string())));
        Self {
            nodes,
            root: 1,
            next_id: 2,
            mutations: Vec::new(),
        }
    }

    pub fn root(&self) -> u64 {
        self.root
    }

    fn alloc(&mut self, kind: NodeKind) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(id, Node::new(id, kind));
        id
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> u64 {
        self.alloc(NodeKind::Element(tag.to_ascii_lowercase()))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> u64 {
        self.alloc(NodeKind::Text(text.to_string()))
    }

    pub fn get(&self, id: u64) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    fn node(&self, id: u64) -> Result<&Node> {
        self.nodes.get(&id).ok_or(Error::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: u64) -> Result<&mut Node> {
        self.nodes.get_mut(&id).ok_or(Error::NodeNotFound(id))
    }

    pub fn contains(&self, id: u64) -> bool {
        self.nodes.contains_key(&id)
    }

    /// All node IDs, in no particular order.
    pub fn iter_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.nodes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn parent(&self, id: u64) -> Option<u64> {
        self.nodes.get(&id).and_then(|n| n.parent_id)
    }

    pub fn children(&self, id: u64) -> &[u64] {
        self.nodes.get(&id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Detach `id` from its parent without dropping it.
    fn detach(&mut self, id: u64) -> Option<u64> {
        let parent = self.nodes.get_mut(&id)?.parent_id.take()?;
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|&c| c != id);
        }
        Some(parent)
    }

    /// Append `child` as the last child of `parent`, moving it if attached.
    pub fn append_child(&mut self, parent: u64, child: u64) -> Result<()> {
        self.node(parent)?;
        self.node(child)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(Error::Other(format!("cannot append {child} inside itself")));
        }
        if let Some(old_parent) = self.detach(child) {
            self.mutations.push(MutationRecord {
                target: old_parent,
                added: Vec::new(),
                removed: vec![child],
            });
        }
        self.node_mut(child)?.parent_id = Some(parent);
        self.node_mut(parent)?.children.push(child);
        self.mutations.push(MutationRecord {
            target: parent,
            added: vec![child],
            removed: Vec::new(),
        });
        Ok(())
    }

    /// Insert `node` as the next sibling of `reference`.
    pub fn insert_after(&mut self, reference: u64, node: u64) -> Result<()> {
        let parent = self
            .parent(reference)
            .ok_or_else(|| Error::Other(format!("node {reference} has no parent")))?;
        self.append_child(parent, node)?;
        let siblings = &mut self.node_mut(parent)?.children;
        siblings.pop();
        let index = siblings
            .iter()
            .position(|&c| c == reference)
            .map_or(siblings.len(), |i| i + 1);
        siblings.insert(index, node);
        Ok(())
    }

    /// Remove `id` and its whole subtree. Returns every removed node ID.
    pub fn remove(&mut self, id: u64) -> Result<Vec<u64>> {
        if id == self.root {
            return Err(Error::Other("cannot remove the document root".into()));
        }
        self.node(id)?;
        let parent = self.detach(id);
        let mut removed = vec![id];
        removed.extend(self.descendants(id));
        for gone in &removed {
            self.nodes.remove(gone);
        }
        if let Some(target) = parent {
            self.mutations.push(MutationRecord {
                target,
                added: Vec::new(),
                removed: removed.clone(),
            });
        }
        Ok(removed)
    }

    /// Remove all children of `id`.
    pub fn clear_children(&mut self, id: u64) -> Result<()> {
        for child in self.node(id)?.children.clone() {
            self.remove(child)?;
        }
        Ok(())
    }

    /// Drain the mutation log.
    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.mutations)
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: u64) -> impl Iterator<Item = u64> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: u64, id: u64) -> bool {
        id == ancestor || self.ancestors(id).any(|a| a == ancestor)
    }

    /// Descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: u64) -> Vec<u64> {
        let mut out = Vec::new();
        let mut stack: Vec<u64> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        out
    }

    /// Siblings before `id`, nearest first.
    pub fn preceding_siblings(&self, id: u64) -> Vec<u64> {
        let Some(parent) = self.parent(id) else {
            return Vec::new();
        };
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&c| c == id).unwrap_or(0);
        siblings[..index].iter().rev().copied().collect()
    }

    /// Nearest inclusive ancestor matching `selector`.
    pub fn closest(&self, id: u64, selector: &Selector) -> Option<u64> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&candidate| selector.matches(self, candidate))
    }

    /// First descendant of `scope` matching `selector`, in document order.
    pub fn find_first(&self, scope: u64, selector: &Selector) -> Option<u64> {
        self.descendants(scope)
            .into_iter()
            .find(|&candidate| selector.matches(self, candidate))
    }

    /// All descendants of `scope` matching `selector`, in document order.
    pub fn find_all(&self, scope: u64, selector: &Selector) -> Vec<u64> {
        self.descendants(scope)
            .into_iter()
            .filter(|&candidate| selector.matches(self, candidate))
            .collect()
    }

    /// Concatenated text of `id` and its descendants.
    pub fn text_content(&self, id: u64) -> String {
        let mut out = String::new();
        for node in std::iter::once(id).chain(self.descendants(id)) {
            if let Some(Node { kind: NodeKind::Text(text), .. }) = self.nodes.get(&node) {
                out.push_str(text);
            }
        }
        out
    }

    pub fn has_class(&self, id: u64, class: &str) -> bool {
        self.nodes.get(&id).is_some_and(|n| n.has_class(class))
    }

    pub fn add_class(&mut self, id: u64, class: &str) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.add_class(class);
        }
    }

    pub fn remove_class(&mut self, id: u64, class: &str) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.remove_class(class);
        }
    }

    pub fn attr(&self, id: u64, name: &str) -> Option<&str> {
        self.nodes.get(&id).and_then(|n| n.attr(name))
    }

    pub fn set_attr(&mut self, id: u64, name: &str, value: &str) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.set_attr(name, value);
        }
    }

    pub fn style_value(&self, id: u64, property: &str) -> Option<&str> {
        self.nodes.get(&id).and_then(|n| n.style_value(property))
    }

    pub fn set_style(&mut self, id: u64, property: &str, value: &str) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.set_style(property, value);
        }
    }

    pub fn rect(&self, id: u64) -> Rect {
        self.nodes.get(&id).map(|n| n.rect).unwrap_or_default()
    }

    /// Record the host's layout box for `id`.
    pub fn set_rect(&mut self, id: u64, rect: Rect) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.rect = rect;
        }
    }

    /// First element with the given tag anywhere in the document.
    pub fn first_by_tag(&self, tag: &str) -> Option<u64> {
        self.descendants(self.root)
            .into_iter()
            .find(|&id| self.nodes.get(&id).and_then(Node::tag) == Some(tag))
    }

    /// Element carrying `id="..."`.
    pub fn element_by_id(&self, html_id: &str) -> Option<u64> {
        self.descendants(self.root)
            .into_iter()
            .find(|&id| self.attr(id, "id") == Some(html_id))
    }
}
