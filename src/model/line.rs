//! The line record: one positional text unit in the input tree.

use serde::Serialize;

use super::{kind_of_token, AttrKind, LINE_MARKER, PAGE_MARKER};
use crate::dom::{NodeId, Tree};

/// Why a line was excluded from body-text classification.
///
/// A filtered line is skipped by the structure automaton but stays
/// addressable for structural scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FilterStatus {
    /// Line participates in classification
    #[default]
    Kept,
    /// Running head or page number outside the text body bounds
    RunningHeadOrPageNumber,
    /// Footnote index or footnote text
    Footnote,
    /// Table or figure body content around a caption
    TableOrFigureBody,
}

impl FilterStatus {
    /// Value written back to the line node's `filtered` attribute.
    pub fn attr_value(self) -> &'static str {
        match self {
            FilterStatus::Kept => "false",
            FilterStatus::RunningHeadOrPageNumber => "true1",
            FilterStatus::Footnote => "true2",
            FilterStatus::TableOrFigureBody => "true3",
        }
    }

    /// Whether the line is excluded from classification.
    pub fn is_filtered(self) -> bool {
        self != FilterStatus::Kept
    }
}

/// One text line of the input tree with its decoded class tokens.
#[derive(Debug, Clone)]
pub struct Line {
    /// Position in document order; doubles as the consumer cursor index
    pub id: usize,
    /// The node this line was built from
    pub node: NodeId,
    /// Page number from the enclosing page container
    pub page_no: String,
    /// Raw class tokens in source order
    pub class_tokens: Vec<String>,
    /// Concatenated text content
    pub text: String,
    /// Filtering status, mutated in place by the noise filters
    pub filtered: FilterStatus,
    /// Height token of the structural parent, when it has one
    pub parent_height_class: Option<String>,
    /// Bottom token of the structural parent, when it has one
    pub parent_bottom_class: Option<String>,
}

impl Line {
    /// The line's token of a given kind, if present.
    ///
    /// A text line carries at most one token per kind; the first match
    /// wins.
    pub fn token(&self, kind: AttrKind) -> Option<&str> {
        self.class_tokens
            .iter()
            .find(|t| kind_of_token(t) == Some(kind))
            .map(|t| t.as_str())
    }

    /// Trimmed text content.
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    /// Whether the trimmed text is purely numeric (a footnote index or
    /// page number candidate).
    pub fn is_numeric(&self) -> bool {
        let trimmed = self.trimmed();
        !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit())
    }

    /// Collect all text lines of a tree in document order.
    ///
    /// Page numbers come from the nearest enclosing page container; the
    /// structural parent's height and bottom tokens are recorded for
    /// the parent-offset correction.
    pub fn collect(tree: &Tree) -> Vec<Line> {
        let mut lines = Vec::new();
        let mut page_no = String::new();

        for id in tree.elements() {
            let node = tree.get(id);
            let class = match node.attr("class") {
                Some(c) => c,
                None => continue,
            };
            let tokens: Vec<&str> = class.split_whitespace().collect();

            if tokens.iter().any(|&t| t == PAGE_MARKER) {
                page_no = node.attr("data-page-no").unwrap_or("").to_string();
                continue;
            }
            if !tokens.iter().any(|&t| t == LINE_MARKER) {
                continue;
            }

            let (parent_height_class, parent_bottom_class) = match tree.parent(id) {
                Some(parent) => parent_tokens(tree, parent),
                None => (None, None),
            };

            lines.push(Line {
                id: lines.len(),
                node: id,
                page_no: page_no.clone(),
                class_tokens: tokens.iter().map(|t| t.to_string()).collect(),
                text: tree.text_content(id),
                filtered: FilterStatus::Kept,
                parent_height_class,
                parent_bottom_class,
            });
        }

        lines
    }
}

fn parent_tokens(tree: &Tree, parent: NodeId) -> (Option<String>, Option<String>) {
    let class = match tree.attr(parent, "class") {
        Some(c) => c,
        None => return (None, None),
    };
    // the page container's height token is not a parent correction
    if class.split_whitespace().any(|t| t == PAGE_MARKER) {
        return (None, None);
    }
    let mut height = None;
    let mut bottom = None;
    for token in class.split_whitespace() {
        match kind_of_token(token) {
            Some(AttrKind::Height) if height.is_none() => height = Some(token.to_string()),
            Some(AttrKind::Bottom) if bottom.is_none() => bottom = Some(token.to_string()),
            _ => {}
        }
    }
    (height, bottom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse;

    fn sample_tree() -> Tree {
        parse(concat!(
            r#"<div id="pf1" class="pf w0 h9" data-page-no="1">"#,
            r#"<div class="c x0 y5 h2"><div class="t h3 x1 y4 fs2 ff1">First line</div></div>"#,
            r#"<div class="t h3 x1 y3 fs2 ff1">Second line</div>"#,
            r#"</div>"#,
            r#"<div id="pf2" class="pf w0 h9" data-page-no="2">"#,
            r#"<div class="t h3 x1 y4 fs2 ff1">42</div>"#,
            r#"</div>"#,
        ))
        .unwrap()
    }

    #[test]
    fn test_collect_lines() {
        let tree = sample_tree();
        let lines = Line::collect(&tree);

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].id, 0);
        assert_eq!(lines[0].page_no, "1");
        assert_eq!(lines[0].text, "First line");
        assert_eq!(lines[2].page_no, "2");
        assert!(lines.iter().all(|l| l.filtered == FilterStatus::Kept));
    }

    #[test]
    fn test_parent_tokens_recorded() {
        let tree = sample_tree();
        let lines = Line::collect(&tree);

        // first line sits inside a positioned container
        assert_eq!(lines[0].parent_height_class.as_deref(), Some("h2"));
        assert_eq!(lines[0].parent_bottom_class.as_deref(), Some("y5"));
        // second line's parent is the page container itself
        assert_eq!(lines[1].parent_height_class, None);
        assert_eq!(lines[1].parent_bottom_class, None);
    }

    #[test]
    fn test_token_lookup() {
        let tree = sample_tree();
        let lines = Line::collect(&tree);

        assert_eq!(lines[0].token(AttrKind::FontSize), Some("fs2"));
        assert_eq!(lines[0].token(AttrKind::Bottom), Some("y4"));
        assert_eq!(lines[0].token(AttrKind::FontFamily), Some("ff1"));
    }

    #[test]
    fn test_is_numeric() {
        let tree = sample_tree();
        let lines = Line::collect(&tree);
        assert!(!lines[0].is_numeric());
        assert!(lines[2].is_numeric());
    }

    #[test]
    fn test_filter_status_attr_values() {
        assert_eq!(FilterStatus::Kept.attr_value(), "false");
        assert_eq!(FilterStatus::Footnote.attr_value(), "true2");
        assert!(!FilterStatus::Kept.is_filtered());
        assert!(FilterStatus::TableOrFigureBody.is_filtered());
    }
}
