//! Block consumers: lookahead routines that absorb a run of lines into
//! one logical block.
//!
//! Every consumer advances the shared document-order cursor while its
//! continuation predicate holds and leaves it one position before the
//! first line that does not belong to the block, so the outer loop's
//! increment lands on the correct next line.

use super::layout::{corrected_bottom, LayoutParameters};
use super::references;
use super::{AttributeRegistry, ParseOptions};
use crate::dict::{HyphenationDictionary, PatternTable};
use crate::error::Result;
use crate::model::{AttrKind, Line};

/// The shared document-order cursor.
#[derive(Debug, Clone, Copy)]
pub struct Cursor {
    /// Current line index
    pub pos: usize,
}

impl Cursor {
    /// Start at the first line.
    pub fn new() -> Self {
        Self { pos: 0 }
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view over the line sequence shared by the automaton and
/// every consumer.
pub struct Scan<'a> {
    pub lines: &'a [Line],
    pub registry: &'a AttributeRegistry,
    pub params: &'a LayoutParameters,
    pub options: &'a ParseOptions,
    pub patterns: &'a PatternTable,
    /// Per line: whether a descendant node carries the body font class
    pub body_descendant: &'a [bool],
}

impl<'a> Scan<'a> {
    /// Parent-corrected bottom value of a line.
    pub fn bottom(&self, i: usize) -> Result<f32> {
        corrected_bottom(self.registry, &self.lines[i], self.options)
    }

    /// Left position of a line; lines without a left token read as 0.
    pub fn left(&self, i: usize) -> Result<f32> {
        match self.lines[i].token(AttrKind::Left) {
            Some(token) => self
                .registry
                .value_of(AttrKind::Left, token, self.lines[i].id),
            None => Ok(0.0),
        }
    }

    /// Font-size pixel value of a line, if it declares one.
    pub fn font_size(&self, i: usize) -> Result<Option<f32>> {
        match self.lines[i].token(AttrKind::FontSize) {
            Some(token) => Ok(Some(self.registry.value_of(
                AttrKind::FontSize,
                token,
                self.lines[i].id,
            )?)),
            None => Ok(None),
        }
    }

    /// Vertical distance between two lines.
    pub fn gap(&self, a: usize, b: usize) -> Result<f32> {
        Ok((self.bottom(a)? - self.bottom(b)?).abs())
    }

    /// Whether a vertical distance reads as the same visual line.
    pub fn is_same_visual_line(&self, gap: f32) -> bool {
        gap < self.params.avg_line_gap as f32
    }

    /// Whether a line is eligible as body text: body font, a descendant
    /// carrying the body font class, or sitting on the same visual line
    /// as its predecessor.
    pub fn is_body_eligible(&self, i: usize) -> Result<bool> {
        if self.params.is_body_font(&self.lines[i]) || self.body_descendant[i] {
            return Ok(true);
        }
        if i > 0 {
            let gap = self.gap(i - 1, i)?;
            return Ok(self.is_same_visual_line(gap));
        }
        Ok(false)
    }

    /// The x position of the column nearest to `left`.
    pub fn nearest_column_x(&self, left: f32) -> f32 {
        if self.params.column_count == 1 {
            return self.params.column_x[0];
        }
        let [first, second] = self.params.column_x;
        if (left - first).abs() <= (left - second).abs() {
            first
        } else {
            second
        }
    }
}

/// Join consumed lines into per-line `<div>` fragments with
/// hyphenation-aware stitching.
///
/// The last token of each line is held back; when it ends in a hyphen,
/// the dictionary is consulted for the concatenation with the next
/// line's first token. A known compound joins into the single
/// dictionary word with no line break; an unknown one keeps the hyphen,
/// gains a `<false-hyphen/>` marker, and breaks normally.
pub fn stitch_block(lines: &[(usize, String)], dict: &HyphenationDictionary) -> String {
    let mut out = String::new();
    let mut skip_first = false;

    for (i, (id, text)) in lines.iter().enumerate() {
        let mut tokens: Vec<&str> = text.split_whitespace().collect();
        if skip_first && !tokens.is_empty() {
            tokens.remove(0);
        }
        skip_first = false;

        let mut content = tokens.join(" ");
        if let Some(&last) = tokens.last() {
            if let Some(head) = last.strip_suffix('-') {
                if !head.is_empty() {
                    if let Some(next_first) = lines
                        .get(i + 1)
                        .and_then(|(_, t)| t.split_whitespace().next())
                    {
                        let joined = format!("{head}{next_first}");
                        if dict.contains(&joined) {
                            content.truncate(content.len() - last.len());
                            content.push_str(&joined);
                            skip_first = true;
                        } else {
                            content.push_str("<false-hyphen/>");
                        }
                    }
                }
            }
        }

        out.push_str(&format!("<div id=\"{id}\">{content}</div>"));
    }
    out
}

/// Snapshot a line for stitching.
fn take(scan: &Scan, i: usize) -> (usize, String) {
    (scan.lines[i].id, scan.lines[i].trimmed().to_string())
}

/// Multi-line title consumer.
///
/// Stricter than the text consumers: a continuation line must keep the
/// opening line's font family and size exactly.
pub fn consume_title(scan: &Scan, cursor: &mut Cursor) -> Result<Vec<(usize, String)>> {
    let start = cursor.pos;
    let opening = &scan.lines[start];
    let font_size = opening.token(AttrKind::FontSize).map(str::to_string);
    let font_family = opening.token(AttrKind::FontFamily).map(str::to_string);
    let limit =
        scan.params.avg_line_gap as f32 + scan.options.thresholds.two_line_title_gap;

    let mut consumed = vec![take(scan, start)];
    let mut last = start;
    let mut j = start + 1;
    while j < scan.lines.len() {
        let next = &scan.lines[j];
        if next.filtered.is_filtered()
            || next.token(AttrKind::FontSize).map(str::to_string) != font_size
            || next.token(AttrKind::FontFamily).map(str::to_string) != font_family
            || scan.gap(last, j)? > limit
        {
            break;
        }
        consumed.push(take(scan, j));
        last = j;
        j += 1;
    }
    cursor.pos = last;
    Ok(consumed)
}

/// Caption consumer for figure and table captions.
pub fn consume_caption(scan: &Scan, cursor: &mut Cursor) -> Result<Vec<(usize, String)>> {
    let stop_find = ["figure_caption", "table_caption"];
    let stop_full = ["references_title"];
    consume_text_block(scan, cursor, &stop_find, &stop_full)
}

/// Generic text-block consumer for abstract, categories, general
/// terms, keywords, and acknowledgements.
///
/// `stop_find` patterns stop the block when found anywhere in a line;
/// `stop_full` patterns stop it only on a whole-line match.
pub fn consume_text_block(
    scan: &Scan,
    cursor: &mut Cursor,
    stop_find: &[&str],
    stop_full: &[&str],
) -> Result<Vec<(usize, String)>> {
    let start = cursor.pos;
    let limit = scan.params.avg_line_gap as f32 + scan.options.thresholds.block_gap_tolerance;

    let mut consumed = vec![take(scan, start)];
    let mut last = start;
    let mut j = start + 1;
    while j < scan.lines.len() {
        let next = &scan.lines[j];
        if next.filtered.is_filtered() || scan.gap(last, j)? > limit {
            break;
        }
        let text = next.trimmed();
        let mut competing = false;
        for name in stop_find {
            if scan.patterns.find(name, text)? {
                competing = true;
                break;
            }
        }
        for name in stop_full {
            if scan.patterns.is_match(name, text)? {
                competing = true;
                break;
            }
        }
        if competing {
            break;
        }
        consumed.push(take(scan, j));
        last = j;
        j += 1;
    }
    cursor.pos = last;
    Ok(consumed)
}

/// Reference-entry consumer: absorbs the indented continuation lines
/// of one reference, stopping at the next reference start or at a
/// block boundary.
pub fn consume_reference(scan: &Scan, cursor: &mut Cursor) -> Result<Vec<(usize, String)>> {
    let start = cursor.pos;
    let limit = scan.params.avg_line_gap as f32 + scan.options.thresholds.new_block_gap_slack;

    let mut consumed = vec![take(scan, start)];
    let mut last = start;
    let mut j = start + 1;
    while j < scan.lines.len() {
        let next = &scan.lines[j];
        if next.filtered.is_filtered() {
            break;
        }
        let gap = scan.gap(last, j)?;
        if gap > limit {
            break;
        }
        let text = next.trimmed();
        if !scan.is_same_visual_line(gap)
            && (scan.patterns.find("reference_index", text)?
                || references::reference_starts_by_indentation(scan, j)?)
        {
            break;
        }
        if scan.patterns.is_match("annex_title", text)?
            || scan.patterns.find("authors_biographies_title", text)?
        {
            break;
        }
        consumed.push(take(scan, j));
        last = j;
        j += 1;
    }
    cursor.pos = last;
    Ok(consumed)
}

/// A run of body-text lines split into paragraph segments.
#[derive(Debug)]
pub struct BodySegment {
    /// Whether this segment opens a new paragraph
    pub new_paragraph: bool,
    /// Consumed lines
    pub lines: Vec<(usize, String)>,
}

/// Body-text consumer with paragraph-break detection.
///
/// A paragraph starts on a left-position indent beyond the column
/// start together with a downward move; in two-column layouts both the
/// indented line and its predecessor must be body-font lines.
pub fn consume_body(
    scan: &Scan,
    cursor: &mut Cursor,
    paragraph_open: bool,
) -> Result<Vec<BodySegment>> {
    let start = cursor.pos;
    let limit = scan.params.avg_line_gap as f32 + scan.options.thresholds.new_block_gap_slack;
    let stop_full = [
        "section_title",
        "subsection_title",
        "subsubsection_title",
        "references_title",
        "acknowledgements_title",
        "annex_title",
    ];
    let stop_find = ["figure_caption", "table_caption"];

    let first_left = scan.left(start)?;
    let first_indented = first_left
        > scan.nearest_column_x(first_left) + scan.options.thresholds.paragraph_indent_offset;
    let mut segments = vec![BodySegment {
        new_paragraph: !paragraph_open || first_indented,
        lines: vec![take(scan, start)],
    }];

    let mut last = start;
    let mut j = start + 1;
    while j < scan.lines.len() {
        let next = &scan.lines[j];
        if next.filtered.is_filtered() {
            break;
        }
        let gap = scan.gap(last, j)?;
        if gap > limit {
            break;
        }
        if !scan.is_body_eligible(j)? {
            break;
        }
        let text = next.trimmed();
        let mut competing = false;
        for name in stop_full {
            if scan.patterns.is_match(name, text)? {
                competing = true;
                break;
            }
        }
        for name in stop_find {
            if scan.patterns.find(name, text)? {
                competing = true;
                break;
            }
        }
        if competing {
            break;
        }

        if starts_paragraph(scan, last, j)? {
            segments.push(BodySegment {
                new_paragraph: true,
                lines: Vec::new(),
            });
        }
        segments.last_mut().unwrap().lines.push(take(scan, j));
        last = j;
        j += 1;
    }
    cursor.pos = last;
    Ok(segments)
}

fn starts_paragraph(scan: &Scan, prev: usize, current: usize) -> Result<bool> {
    let left = scan.left(current)?;
    let column_x = scan.nearest_column_x(left);
    let indented = left > column_x + scan.options.thresholds.paragraph_indent_offset;
    if !indented {
        return Ok(false);
    }
    let downward = scan.bottom(current)? < scan.bottom(prev)?;
    if !downward {
        return Ok(false);
    }
    if scan.params.column_count == 2 {
        return Ok(scan.params.is_body_font(&scan.lines[current])
            && scan.params.is_body_font(&scan.lines[prev]));
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict(words: &[&str]) -> HyphenationDictionary {
        HyphenationDictionary::from_words(words.iter().copied())
    }

    #[test]
    fn test_stitch_plain_lines() {
        let lines = vec![
            (0, "first line".to_string()),
            (1, "second line".to_string()),
        ];
        let out = stitch_block(&lines, &dict(&[]));
        assert_eq!(
            out,
            "<div id=\"0\">first line</div><div id=\"1\">second line</div>"
        );
    }

    #[test]
    fn test_stitch_known_compound_joins_without_break() {
        let lines = vec![
            (0, "it is well-".to_string()),
            (1, "known that".to_string()),
        ];
        let out = stitch_block(&lines, &dict(&["wellknown"]));
        assert_eq!(
            out,
            "<div id=\"0\">it is wellknown</div><div id=\"1\">that</div>"
        );
        assert!(!out.contains("<false-hyphen/>"));
    }

    #[test]
    fn test_stitch_unknown_compound_marks_false_hyphen() {
        let lines = vec![
            (0, "it is well-".to_string()),
            (1, "known that".to_string()),
        ];
        let out = stitch_block(&lines, &dict(&[]));
        assert_eq!(
            out,
            "<div id=\"0\">it is well-<false-hyphen/></div><div id=\"1\">known that</div>"
        );
    }

    #[test]
    fn test_stitch_trailing_hyphen_on_last_line_kept() {
        let lines = vec![(0, "ends with well-".to_string())];
        let out = stitch_block(&lines, &dict(&["wellknown"]));
        assert_eq!(out, "<div id=\"0\">ends with well-</div>");
    }

    #[test]
    fn test_stitch_bare_hyphen_token_untouched() {
        let lines = vec![(0, "range 1 -".to_string()), (1, "2".to_string())];
        let out = stitch_block(&lines, &dict(&[]));
        assert_eq!(out, "<div id=\"0\">range 1 -</div><div id=\"1\">2</div>");
    }
}
