//! Tree serialization with a reversible entity placeholder scheme.
//!
//! Input text keeps `&name;` entities raw. A plain serializer would
//! escape their `&` into `&amp;`, corrupting them on the way out, so
//! entity-shaped sequences are rewritten to a private-use placeholder
//! before escaping and restored on the assembled output.

use std::sync::LazyLock;

use regex::Regex;

use super::{NodeKind, Tree};

/// Placeholder prefix for a protected entity; U+E000 never occurs in
/// converter output.
const ENTITY_PLACEHOLDER: char = '\u{E000}';

static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&([a-zA-Z][a-zA-Z0-9]*);").unwrap());

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\u{E000}([a-zA-Z][a-zA-Z0-9]*);").unwrap());

/// Serialize a tree back to markup.
pub fn serialize(tree: &Tree) -> String {
    let mut out = String::new();
    for &child in &tree.get(tree.root()).children {
        serialize_node(tree, child, &mut out);
    }
    restore_entities(&out)
}

fn serialize_node(tree: &Tree, id: super::NodeId, out: &mut String) {
    let node = tree.get(id);
    match node.kind {
        NodeKind::Document => {
            for &child in &node.children {
                serialize_node(tree, child, out);
            }
        }
        NodeKind::Doctype => {
            out.push_str("<!");
            out.push_str(&node.text);
            out.push('>');
        }
        NodeKind::Comment => {
            out.push_str("<!--");
            out.push_str(&node.text);
            out.push_str("-->");
        }
        NodeKind::Text => {
            out.push_str(&escape_text(&node.text));
        }
        NodeKind::Element => {
            out.push('<');
            out.push_str(&node.tag);
            for (name, value) in &node.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
            if node.children.is_empty() && is_void(&node.tag) {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for &child in &node.children {
                serialize_node(tree, child, out);
            }
            out.push_str("</");
            out.push_str(&node.tag);
            out.push('>');
        }
    }
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "br" | "hr" | "img" | "input" | "link" | "meta")
}

fn escape_text(text: &str) -> String {
    let protected = protect_entities(text);
    protected
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

/// Rewrite `&name;` to the placeholder form so escaping leaves it alone.
fn protect_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, format!("{}$1;", ENTITY_PLACEHOLDER))
        .into_owned()
}

/// Restore placeholders to their `&name;` entity form.
fn restore_entities(text: &str) -> String {
    PLACEHOLDER_RE.replace_all(text, "&$1;").into_owned()
}
