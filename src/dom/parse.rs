//! Lenient parser for the converter's HTML subset.
//!
//! Converter output is machine-generated and regular: elements with
//! quoted attributes, `<style>` blocks with raw rule text, comments,
//! and a doctype. Entities in text are kept raw so the annotated copy
//! round-trips byte-faithfully.

use super::{NodeId, Tree};
use crate::error::{Error, Result};

/// Elements that never have children.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

/// Elements whose content is raw text until the matching close tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script"];

/// Parse converter markup into a [`Tree`].
pub fn parse(input: &str) -> Result<Tree> {
    let mut tree = Tree::new();
    let mut stack: Vec<NodeId> = vec![tree.root()];
    let bytes = input.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] == b'<' {
            if input[pos..].starts_with("<!--") {
                let end = input[pos + 4..]
                    .find("-->")
                    .map(|i| pos + 4 + i)
                    .ok_or_else(|| Error::Dom("unterminated comment".to_string()))?;
                let comment = tree.create_comment(&input[pos + 4..end]);
                tree.append_child(*stack.last().unwrap(), comment);
                pos = end + 3;
            } else if input[pos..].starts_with("<!") {
                let end = input[pos..]
                    .find('>')
                    .map(|i| pos + i)
                    .ok_or_else(|| Error::Dom("unterminated doctype".to_string()))?;
                let doctype = tree.create_doctype(&input[pos + 2..end]);
                tree.append_child(*stack.last().unwrap(), doctype);
                pos = end + 1;
            } else if input[pos..].starts_with("</") {
                let end = input[pos..]
                    .find('>')
                    .map(|i| pos + i)
                    .ok_or_else(|| Error::Dom("unterminated close tag".to_string()))?;
                let name = input[pos + 2..end].trim().to_ascii_lowercase();
                close_tag(&tree, &mut stack, &name);
                pos = end + 1;
            } else {
                let end = input[pos..]
                    .find('>')
                    .map(|i| pos + i)
                    .ok_or_else(|| Error::Dom("unterminated open tag".to_string()))?;
                let raw = &input[pos + 1..end];
                let self_closing = raw.ends_with('/');
                let raw = raw.trim_end_matches('/');
                let (name, attrs) = parse_open_tag(raw)?;

                let element = tree.create_element(&name);
                for (attr_name, attr_value) in attrs {
                    tree.set_attr(element, &attr_name, &attr_value);
                }
                tree.append_child(*stack.last().unwrap(), element);
                pos = end + 1;

                if RAW_TEXT_ELEMENTS.contains(&name.as_str()) && !self_closing {
                    let close = format!("</{}", name);
                    let close_at = input[pos..]
                        .to_ascii_lowercase()
                        .find(&close)
                        .map(|i| pos + i)
                        .ok_or_else(|| Error::Dom(format!("unterminated <{}>", name)))?;
                    if close_at > pos {
                        let text = tree.create_text(&input[pos..close_at]);
                        tree.append_child(element, text);
                    }
                    let close_end = input[close_at..]
                        .find('>')
                        .map(|i| close_at + i)
                        .ok_or_else(|| Error::Dom(format!("unterminated </{}>", name)))?;
                    pos = close_end + 1;
                } else if !self_closing && !VOID_ELEMENTS.contains(&name.as_str()) {
                    stack.push(element);
                }
            }
        } else {
            let end = input[pos..].find('<').map(|i| pos + i).unwrap_or(input.len());
            let raw = &input[pos..end];
            if !raw.is_empty() {
                let text = tree.create_text(raw);
                tree.append_child(*stack.last().unwrap(), text);
            }
            pos = end;
        }
    }

    Ok(tree)
}

/// Pop the stack down to the nearest matching open element.
///
/// A close tag with no matching open element is ignored (lenient).
fn close_tag(tree: &Tree, stack: &mut Vec<NodeId>, name: &str) {
    if let Some(at) = stack
        .iter()
        .rposition(|&id| tree.get(id).tag == name)
    {
        stack.truncate(at.max(1));
    }
}

fn parse_open_tag(raw: &str) -> Result<(String, Vec<(String, String)>)> {
    let raw = raw.trim();
    let name_end = raw
        .find(|c: char| c.is_whitespace())
        .unwrap_or(raw.len());
    let name = raw[..name_end].to_ascii_lowercase();
    if name.is_empty() {
        return Err(Error::Dom("empty tag name".to_string()));
    }

    let mut attrs = Vec::new();
    let rest = raw[name_end..].trim();
    let bytes = rest.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }
        let attr_start = pos;
        while pos < bytes.len() && bytes[pos] != b'=' && !bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let attr_name = rest[attr_start..pos].to_ascii_lowercase();
        if attr_name.is_empty() {
            pos += 1;
            continue;
        }
        if pos < bytes.len() && bytes[pos] == b'=' {
            pos += 1;
            let value = if pos < bytes.len() && (bytes[pos] == b'"' || bytes[pos] == b'\'') {
                let quote = bytes[pos];
                pos += 1;
                let value_start = pos;
                while pos < bytes.len() && bytes[pos] != quote {
                    pos += 1;
                }
                let value = &rest[value_start..pos];
                pos += 1; // skip closing quote
                value
            } else {
                let value_start = pos;
                while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() {
                    pos += 1;
                }
                &rest[value_start..pos]
            };
            attrs.push((attr_name, value.to_string()));
        } else {
            attrs.push((attr_name, String::new()));
        }
    }

    Ok((name, attrs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeKind;

    #[test]
    fn test_parse_simple_document() {
        let tree = parse(
            r#"<!DOCTYPE html><html><body><div class="t h3 x1 y2 fs2 ff1">Hello</div></body></html>"#,
        )
        .unwrap();

        let elements = tree.elements();
        let tags: Vec<&str> = elements.iter().map(|&id| tree.get(id).tag.as_str()).collect();
        assert_eq!(tags, vec!["html", "body", "div"]);

        let div = elements[2];
        assert_eq!(tree.attr(div, "class"), Some("t h3 x1 y2 fs2 ff1"));
        assert_eq!(tree.text_content(div), "Hello");
    }

    #[test]
    fn test_parse_style_raw_text() {
        let tree = parse("<style>.h3{height:24px;}\n.x1{left:50px;}</style>").unwrap();
        let style = tree.elements()[0];
        assert_eq!(tree.get(style).tag, "style");
        assert!(tree.text_content(style).contains(".x1{left:50px;}"));
    }

    #[test]
    fn test_parse_nested_and_self_closing() {
        let tree = parse(r#"<div id="pf1" class="pf h9" data-page-no="1"><div class="t">a<span>b</span></div><br/></div>"#).unwrap();
        let elements = tree.elements();
        assert_eq!(elements.len(), 4);
        let outer = elements[0];
        assert_eq!(tree.attr(outer, "data-page-no"), Some("1"));
        assert_eq!(tree.text_content(outer), "ab");
    }

    #[test]
    fn test_entities_kept_raw() {
        let tree = parse("<div>Fischer &amp; Krause&nbsp;2003</div>").unwrap();
        let div = tree.elements()[0];
        assert_eq!(tree.text_content(div), "Fischer &amp; Krause&nbsp;2003");
    }

    #[test]
    fn test_stray_close_tag_ignored() {
        let tree = parse("<div>a</span>b</div>").unwrap();
        let div = tree.elements()[0];
        assert_eq!(tree.text_content(div), "ab");
    }

    #[test]
    fn test_unterminated_tag_is_error() {
        assert!(matches!(parse("<div class="), Err(Error::Dom(_))));
    }

    #[test]
    fn test_comment_preserved() {
        let tree = parse("<div><!-- generated --></div>").unwrap();
        let div = tree.elements()[0];
        let children = &tree.get(div).children;
        assert_eq!(children.len(), 1);
        assert_eq!(tree.get(children[0]).kind, NodeKind::Comment);
    }
}
