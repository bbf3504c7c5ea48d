//! Node tree dump and diagnostic utilities.

use crate::classes;
use crate::dom::{Document, Node, NodeKind};
use crate::engine::Engine;
use std::fmt::Write;

/// Dump the engine's document tree to stdout.
pub fn print_node_tree(engine: &Engine, filter: Option<&str>, visible_only: bool) {
    print_summary(engine);
    println!("\n=== Node Tree ===\n");
    print!("{}", format_node_tree(engine.doc(), filter, visible_only));
}

/// Counts of indicators and the tooltip state, on stderr.
fn print_summary(engine: &Engine) {
    let doc = engine.doc();
    let count = |class: &str| doc.iter_ids().filter(|&id| doc.has_class(id, class)).count();
    eprintln!(
        "Indicators: {}, Processed: {}, Kept visible: {}",
        count(classes::INDICATOR),
        count(classes::PROCESSED),
        count(classes::KEEP_VISIBLE)
    );
    eprintln!("Tooltip: {}", engine.visibility().name());
}

/// Render the tree under the document root, one node per line.
///
/// With a `filter`, only lines whose tag or classes contain it are printed
/// (their children are still walked). With `visible_only`, hidden subtrees
/// are skipped entirely.
pub fn format_node_tree(doc: &Document, filter: Option<&str>, visible_only: bool) -> String {
    let mut out = String::new();
    let filter = filter.map(str::to_lowercase);
    for &child in doc.children(doc.root()) {
        write_subtree(doc, child, 0, filter.as_deref(), visible_only, &mut out);
    }
    out
}

fn write_subtree(doc: &Document, id: u64, depth: usize, filter: Option<&str>, visible_only: bool, out: &mut String) {
    let Some(node) = doc.get(id) else { return };
    let hidden = is_hidden(node);
    if visible_only && hidden {
        return;
    }
    let line = format_node_line(node, hidden);
    let matches_filter = filter.map(|f| line.to_lowercase().contains(f)).unwrap_or(true);
    if matches_filter {
        let _ = writeln!(out, "{}{}", "  ".repeat(depth), line);
    }
    for &child in &node.children {
        write_subtree(doc, child, depth + 1, filter, visible_only, out);
    }
}

/// Format a single node: `tag.class1.class2 #id [hidden] text="..."`.
fn format_node_line(node: &Node, hidden: bool) -> String {
    match &node.kind {
        NodeKind::Text(text) => format!("{:?}", truncate(text.trim(), 48)),
        NodeKind::Element(tag) => {
            let mut line = tag.clone();
            for class in &node.classes {
                line.push('.');
                line.push_str(class);
            }
            let _ = write!(line, " #{}", node.id);
            if hidden {
                line.push_str(" [hidden]");
            }
            if let Some(ident) = node.attr(classes::ID_ATTR) {
                let _ = write!(line, " id={ident}");
            }
            if !node.style.is_empty() {
                let _ = write!(line, " style={:?}", node.style_attr());
            }
            line
        }
    }
}

fn is_hidden(node: &Node) -> bool {
    node.has_class(classes::HIDDEN)
        || node.style_value("visibility") == Some("hidden")
        || node.style_value("display") == Some("none")
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_document;

    #[test]
    fn test_tree_marks_hidden_and_indents_children() {
        let doc = parse_document(
            r#"<div class="outer"><p class="fieldhint-hidden">gone</p><span style="color: red">x</span></div>"#,
        )
        .unwrap();
        let dump = format_node_tree(&doc, None, false);
        let lines: Vec<&str> = dump.lines().collect();
        assert!(lines[0].starts_with("div.outer #"), "got {:?}", lines[0]);
        assert!(lines[1].starts_with("  p.fieldhint-hidden #") && lines[1].ends_with("[hidden]"));
        assert_eq!(lines[2].trim(), "\"gone\"");
        assert!(lines[3].contains("style=\"color: red\""), "got {:?}", lines[3]);
    }

    #[test]
    fn test_visible_only_skips_hidden_subtrees() {
        let doc = parse_document(r#"<div><p style="display: none">gone</p><b>kept</b></div>"#).unwrap();
        let dump = format_node_tree(&doc, None, true);
        assert!(!dump.contains("gone"));
        assert!(dump.contains("kept"));
    }

    #[test]
    fn test_long_text_is_truncated() {
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("abc", 3), "abc");
    }
}
