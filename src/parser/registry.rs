//! Attribute registry: token frequencies and style-rule pixel values.

use std::collections::HashMap;

use crate::dom::Tree;
use crate::error::{Error, Result};
use crate::model::{kind_of_token, AttrKind, Line};

/// Document-wide token statistics, built fresh per parse.
///
/// `counts` holds the occurrence count of every positional class token
/// across all text lines; `values` holds the token-to-pixel mapping
/// declared by the document's style rules, restricted to tokens that
/// occur on lines (first declaration wins). The unrestricted mapping is
/// kept alongside for structural nodes such as page containers, whose
/// tokens never occur on a text line.
#[derive(Debug, Default)]
pub struct AttributeRegistry {
    counts: HashMap<AttrKind, HashMap<String, u32>>,
    values: HashMap<AttrKind, HashMap<String, f32>>,
    all_values: HashMap<AttrKind, HashMap<String, f32>>,
}

impl AttributeRegistry {
    /// Build both registries with two forward scans: one over every
    /// line's class tokens, one over the style-rule text.
    pub fn build(tree: &Tree, lines: &[Line]) -> Self {
        let mut registry = Self::default();
        registry.build_counts(lines);
        registry.build_values(tree);
        registry
    }

    fn build_counts(&mut self, lines: &[Line]) {
        for line in lines {
            for token in &line.class_tokens {
                if let Some(kind) = kind_of_token(token) {
                    *self
                        .counts
                        .entry(kind)
                        .or_default()
                        .entry(token.clone())
                        .or_insert(0) += 1;
                }
            }
        }
    }

    fn build_values(&mut self, tree: &Tree) {
        for id in tree.elements() {
            if tree.get(id).tag != "style" {
                continue;
            }
            let css = tree.text_content(id);
            self.scan_rules(&css);
        }
        // retain only tokens that also occur on lines
        for kind in AttrKind::ALL {
            let counts = self.counts.entry(kind).or_default();
            let all = self.all_values.entry(kind).or_default();
            let retained = self.values.entry(kind).or_default();
            for (token, value) in all.iter() {
                if counts.contains_key(token) {
                    retained.entry(token.clone()).or_insert(*value);
                }
            }
        }
    }

    fn scan_rules(&mut self, css: &str) {
        for rule in css.split('}') {
            let (selector, body) = match rule.split_once('{') {
                Some(parts) => parts,
                None => continue,
            };
            let selector = selector.trim();
            let token = match selector.strip_prefix('.') {
                Some(t) if !t.contains([' ', ',', '.', ':']) => t,
                _ => continue,
            };
            let kind = match kind_of_token(token) {
                Some(k) => k,
                None => continue,
            };
            for declaration in body.split(';') {
                let (property, raw) = match declaration.split_once(':') {
                    Some(parts) => parts,
                    None => continue,
                };
                if !matches!(property.trim(), "height" | "font-size" | "bottom" | "left") {
                    continue;
                }
                let raw = raw.trim();
                // the two trailing characters are the unit, assumed px
                if raw.len() < 2 {
                    continue;
                }
                let numeric = &raw[..raw.len() - 2];
                if let Ok(value) = numeric.parse::<f32>() {
                    self.all_values
                        .entry(kind)
                        .or_default()
                        .entry(token.to_string())
                        .or_insert(value);
                }
            }
        }
    }

    /// Occurrence count of a token on text lines.
    pub fn count(&self, kind: AttrKind, token: &str) -> u32 {
        self.counts
            .get(&kind)
            .and_then(|m| m.get(token))
            .copied()
            .unwrap_or(0)
    }

    /// Resolve a line token to its pixel value.
    ///
    /// A missing mapping means the converter emitted a class with no
    /// style rule; that is a data-integrity error reported with the
    /// offending token and line.
    pub fn value_of(&self, kind: AttrKind, token: &str, line_id: usize) -> Result<f32> {
        self.values
            .get(&kind)
            .and_then(|m| m.get(token))
            .copied()
            .ok_or_else(|| Error::MissingStyleValue {
                token: token.to_string(),
                line_id,
            })
    }

    /// Pixel value of any declared token, line-borne or structural.
    pub fn raw_value_of(&self, kind: AttrKind, token: &str) -> Option<f32> {
        self.all_values.get(&kind).and_then(|m| m.get(token)).copied()
    }

    /// Tokens of a kind sorted by descending frequency.
    ///
    /// Equal counts are ordered deterministically: the token with the
    /// larger pixel value first, then the lexicographically larger
    /// token.
    pub fn sorted_by_frequency(&self, kind: AttrKind) -> Vec<(&str, u32)> {
        let mut tokens: Vec<(&str, u32)> = self
            .counts
            .get(&kind)
            .map(|m| m.iter().map(|(t, c)| (t.as_str(), *c)).collect())
            .unwrap_or_default();
        tokens.sort_by(|(token_a, count_a), (token_b, count_b)| {
            count_b.cmp(count_a).then_with(|| {
                let value_a = self.raw_value_of(kind, token_a).unwrap_or(f32::MIN);
                let value_b = self.raw_value_of(kind, token_b).unwrap_or(f32::MIN);
                value_b
                    .partial_cmp(&value_a)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| token_b.cmp(token_a))
            })
        });
        tokens
    }

    /// The single most frequent token of a kind.
    pub fn most_frequent(&self, kind: AttrKind) -> Option<&str> {
        self.sorted_by_frequency(kind).first().map(|(t, _)| *t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse;

    fn sample() -> (Tree, Vec<Line>) {
        let tree = parse(concat!(
            "<style>",
            ".h3{height:24px;}",
            ".h9{height:1100px;}",
            ".fs2{font-size:12px;}",
            ".fs5{font-size:28px;}",
            ".y4{bottom:700px;}",
            ".y3{bottom:680.5px;}",
            ".x1{left:50px;}",
            ".x2{left:300px;}",
            ".x9{left:999px;}",
            "</style>",
            r#"<div class="pf h9" data-page-no="1">"#,
            r#"<div class="t h3 x1 y4 fs2 ff1">a</div>"#,
            r#"<div class="t h3 x1 y3 fs2 ff1">b</div>"#,
            r#"<div class="t h3 x2 y3 fs5 ff1">c</div>"#,
            "</div>",
        ))
        .unwrap();
        let lines = Line::collect(&tree);
        (tree, lines)
    }

    #[test]
    fn test_counts() {
        let (tree, lines) = sample();
        let registry = AttributeRegistry::build(&tree, &lines);

        assert_eq!(registry.count(AttrKind::Left, "x1"), 2);
        assert_eq!(registry.count(AttrKind::Left, "x2"), 1);
        assert_eq!(registry.count(AttrKind::FontSize, "fs2"), 2);
        assert_eq!(registry.count(AttrKind::Height, "h9"), 0);
    }

    #[test]
    fn test_values_restricted_to_line_tokens() {
        let (tree, lines) = sample();
        let registry = AttributeRegistry::build(&tree, &lines);

        assert_eq!(registry.value_of(AttrKind::Left, "x1", 0).unwrap(), 50.0);
        assert_eq!(registry.value_of(AttrKind::Bottom, "y3", 0).unwrap(), 680.5);
        // x9 is declared but occurs on no line
        assert!(matches!(
            registry.value_of(AttrKind::Left, "x9", 7),
            Err(Error::MissingStyleValue { ref token, line_id: 7 }) if token == "x9"
        ));
        // structural page-container height stays reachable
        assert_eq!(registry.raw_value_of(AttrKind::Height, "h9"), Some(1100.0));
    }

    #[test]
    fn test_first_declaration_wins() {
        let tree = parse(concat!(
            "<style>.fs2{font-size:12px;}.fs2{font-size:99px;}</style>",
            r#"<div class="t fs2">a</div>"#,
        ))
        .unwrap();
        let lines = Line::collect(&tree);
        let registry = AttributeRegistry::build(&tree, &lines);
        assert_eq!(registry.value_of(AttrKind::FontSize, "fs2", 0).unwrap(), 12.0);
    }

    #[test]
    fn test_frequency_sort_tie_break() {
        let tree = parse(concat!(
            "<style>.x1{left:50px;}.x2{left:300px;}</style>",
            r#"<div class="t x1">a</div>"#,
            r#"<div class="t x2">b</div>"#,
        ))
        .unwrap();
        let lines = Line::collect(&tree);
        let registry = AttributeRegistry::build(&tree, &lines);

        // equal counts resolve to the larger pixel value first
        let sorted = registry.sorted_by_frequency(AttrKind::Left);
        assert_eq!(sorted[0].0, "x2");
        assert_eq!(sorted[1].0, "x1");
    }

    #[test]
    fn test_other_unit_is_misparsed_silently() {
        // a non-px unit loses its last two characters; 1.5em parses as
        // 1.5 and 10pt parses as 10
        let tree = parse(concat!(
            "<style>.y1{bottom:10pt;}</style>",
            r#"<div class="t y1">a</div>"#,
        ))
        .unwrap();
        let lines = Line::collect(&tree);
        let registry = AttributeRegistry::build(&tree, &lines);
        assert_eq!(registry.value_of(AttrKind::Bottom, "y1", 0).unwrap(), 10.0);
    }
}
