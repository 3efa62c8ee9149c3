//! Class-token kinds.
//!
//! The converter encodes every typographic fact as a short class token
//! whose prefix names the attribute kind: `h3` (height), `fs2` (font
//! size), `y4a` (bottom), `x12` (left), `ff1` (font family). The bare
//! token `t` marks a text line and `pf` marks a page container.

use serde::Serialize;

/// Class token marking a text line.
pub const LINE_MARKER: &str = "t";

/// Class token marking a page container.
pub const PAGE_MARKER: &str = "pf";

/// Attribute kind encoded in a class-token prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AttrKind {
    /// Line height (`h` prefix)
    Height,
    /// Font size (`fs` prefix)
    FontSize,
    /// Bottom / baseline position (`y` prefix)
    Bottom,
    /// Left position (`x` prefix)
    Left,
    /// Font family (`ff` prefix)
    FontFamily,
}

impl AttrKind {
    /// All kinds, in a fixed order.
    pub const ALL: [AttrKind; 5] = [
        AttrKind::Height,
        AttrKind::FontSize,
        AttrKind::Bottom,
        AttrKind::Left,
        AttrKind::FontFamily,
    ];

    /// The token prefix for this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            AttrKind::Height => "h",
            AttrKind::FontSize => "fs",
            AttrKind::Bottom => "y",
            AttrKind::Left => "x",
            AttrKind::FontFamily => "ff",
        }
    }
}

/// Classify a raw class token by its prefix.
///
/// Two-letter prefixes are tried before one-letter prefixes so `fs2`
/// and `ff1` are not misread as height tokens. The markers `t` and
/// `pf` and anything else unrecognized return `None`.
pub fn kind_of_token(token: &str) -> Option<AttrKind> {
    let rest_is_code = |rest: &str| {
        !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric())
    };

    if let Some(rest) = token.strip_prefix("fs") {
        if rest_is_code(rest) {
            return Some(AttrKind::FontSize);
        }
    }
    if let Some(rest) = token.strip_prefix("ff") {
        if rest_is_code(rest) {
            return Some(AttrKind::FontFamily);
        }
    }
    if let Some(rest) = token.strip_prefix('h') {
        if rest_is_code(rest) {
            return Some(AttrKind::Height);
        }
    }
    if let Some(rest) = token.strip_prefix('y') {
        if rest_is_code(rest) {
            return Some(AttrKind::Bottom);
        }
    }
    if let Some(rest) = token.strip_prefix('x') {
        if rest_is_code(rest) {
            return Some(AttrKind::Left);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_of_token() {
        assert_eq!(kind_of_token("h3"), Some(AttrKind::Height));
        assert_eq!(kind_of_token("fs2"), Some(AttrKind::FontSize));
        assert_eq!(kind_of_token("y4a"), Some(AttrKind::Bottom));
        assert_eq!(kind_of_token("x12"), Some(AttrKind::Left));
        assert_eq!(kind_of_token("ff1"), Some(AttrKind::FontFamily));
    }

    #[test]
    fn test_markers_are_not_kinds() {
        assert_eq!(kind_of_token("t"), None);
        assert_eq!(kind_of_token("pf"), None);
        assert_eq!(kind_of_token("pc"), None);
    }

    #[test]
    fn test_prefix_precedence() {
        // fs/ff must win over h/f single-letter reads
        assert_eq!(kind_of_token("fs10"), Some(AttrKind::FontSize));
        assert_eq!(kind_of_token("ff0"), Some(AttrKind::FontFamily));
        // bare prefixes carry no code
        assert_eq!(kind_of_token("h"), None);
        assert_eq!(kind_of_token("fs"), None);
    }
}
