//! Layout parameter inference from document-wide token statistics.

use std::collections::HashMap;

use serde::Serialize;

use super::{AttributeRegistry, ParseOptions};
use crate::error::{Error, Result};
use crate::model::{AttrKind, Line};

/// Derived, write-once-per-document layout parameters.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutParameters {
    /// Number of text columns (1 or 2)
    pub column_count: usize,
    /// Left positions of the columns, ascending; both entries equal for
    /// a single-column layout
    pub column_x: [f32; 2],
    /// Most frequent font-size token
    pub body_font_size: String,
    /// Most frequent font-family token, when any is declared
    pub body_font_family: Option<String>,
    /// Most frequent height token, when any is declared
    pub body_height: Option<String>,
    /// Font-size token of the title
    pub title_font_size: String,
    /// Modal vertical distance between successive body-font lines
    pub avg_line_gap: i32,
}

impl LayoutParameters {
    /// Whether a line's font matches the body font (size and family).
    pub fn is_body_font(&self, line: &Line) -> bool {
        line.token(AttrKind::FontSize) == Some(self.body_font_size.as_str())
            && line.token(AttrKind::FontFamily) == self.body_font_family.as_deref()
    }
}

/// Infer all layout parameters for one document.
pub fn infer(
    registry: &AttributeRegistry,
    lines: &[Line],
    options: &ParseOptions,
) -> Result<LayoutParameters> {
    let body_font_size = registry
        .most_frequent(AttrKind::FontSize)
        .ok_or(Error::NoBodyFont)?
        .to_string();
    let body_font_family = registry
        .most_frequent(AttrKind::FontFamily)
        .map(str::to_string);
    let body_height = registry.most_frequent(AttrKind::Height).map(str::to_string);

    let (column_count, column_x) = infer_columns(registry, lines)?;
    let title_font_size = infer_title_font(registry, lines, options)?.to_string();

    let mut params = LayoutParameters {
        column_count,
        column_x,
        body_font_size,
        body_font_family,
        body_height,
        title_font_size,
        avg_line_gap: 0,
    };
    params.avg_line_gap = infer_line_gap(registry, lines, &params, options)?;

    log::debug!(
        "layout: {} column(s) at x={:?}, body font ({}, {:?}), title font {}, line gap {}",
        params.column_count,
        params.column_x,
        params.body_font_size,
        params.body_font_family,
        params.title_font_size,
        params.avg_line_gap
    );

    Ok(params)
}

/// Column geometry from left-position token frequencies.
///
/// Two columns when the runner-up occurs more than half as often as
/// the leader; the pair is ordered ascending by pixel value.
fn infer_columns(
    registry: &AttributeRegistry,
    lines: &[Line],
) -> Result<(usize, [f32; 2])> {
    let sorted = registry.sorted_by_frequency(AttrKind::Left);
    let (top_token, top_count) = match sorted.first() {
        Some(&(token, count)) => (token, count),
        None => return Ok((1, [0.0, 0.0])),
    };
    let top_value = token_value(registry, lines, AttrKind::Left, top_token)?;

    if let Some(&(second_token, second_count)) = sorted.get(1) {
        if second_count * 2 > top_count {
            let second_value = token_value(registry, lines, AttrKind::Left, second_token)?;
            let (left, right) = if top_value <= second_value {
                (top_value, second_value)
            } else {
                (second_value, top_value)
            };
            return Ok((2, [left, right]));
        }
    }
    Ok((1, [top_value, top_value]))
}

/// The title font: among page-1 lines sitting strictly above the title
/// bottom threshold, the font-size token with the greatest pixel value.
fn infer_title_font<'a>(
    registry: &AttributeRegistry,
    lines: &'a [Line],
    options: &ParseOptions,
) -> Result<&'a str> {
    let mut best: Option<(&str, f32)> = None;
    for line in lines.iter().filter(|l| l.page_no == "1") {
        let bottom = corrected_bottom(registry, line, options)?;
        if bottom <= options.thresholds.title_bottom_min {
            continue;
        }
        let token = match line.token(AttrKind::FontSize) {
            Some(t) => t,
            None => continue,
        };
        let value = registry.value_of(AttrKind::FontSize, token, line.id)?;
        if best.map_or(true, |(_, v)| value > v) {
            best = Some((token, value));
        }
    }
    best.map(|(t, _)| t).ok_or(Error::NoTitleFont)
}

/// Modal rounded delta between successive body-font bottom values.
///
/// Ties prefer the smaller delta. Degenerate documents with fewer than
/// two body-font lines fall back to a 12px gap.
fn infer_line_gap(
    registry: &AttributeRegistry,
    lines: &[Line],
    params: &LayoutParameters,
    options: &ParseOptions,
) -> Result<i32> {
    let mut histogram: HashMap<i32, u32> = HashMap::new();
    let mut previous: Option<f32> = None;

    for line in lines.iter().filter(|l| params.is_body_font(l)) {
        let bottom = corrected_bottom(registry, line, options)?;
        if let Some(prev) = previous {
            let delta = (prev - bottom).round() as i32;
            *histogram.entry(delta).or_insert(0) += 1;
        }
        previous = Some(bottom);
    }

    let modal = histogram
        .iter()
        .max_by(|(delta_a, count_a), (delta_b, count_b)| {
            count_a.cmp(count_b).then_with(|| delta_b.cmp(delta_a))
        })
        .map(|(delta, _)| *delta);

    match modal {
        Some(gap) => Ok(gap),
        None => {
            log::warn!("too few body-font lines to infer a line gap, assuming 12px");
            Ok(12)
        }
    }
}

/// A line's bottom value with the parent-offset correction applied.
///
/// Some converters nest an absolutely-positioned line inside a
/// relatively-positioned block; the line's declared bottom is then
/// relative to the block, not the page. When the containing block's
/// height is smaller than the line's own height, the block's bottom
/// value is added in. Disable via
/// [`ParseOptions::with_parent_offset_correction`] for converters
/// without this quirk.
pub fn corrected_bottom(
    registry: &AttributeRegistry,
    line: &Line,
    options: &ParseOptions,
) -> Result<f32> {
    let token = line
        .token(AttrKind::Bottom)
        .ok_or_else(|| Error::MissingStyleValue {
            token: "y?".to_string(),
            line_id: line.id,
        })?;
    let mut bottom = registry.value_of(AttrKind::Bottom, token, line.id)?;

    if !options.parent_offset_correction {
        return Ok(bottom);
    }

    if let (Some(parent_height), Some(parent_bottom), Some(own_height)) = (
        line.parent_height_class.as_deref(),
        line.parent_bottom_class.as_deref(),
        line.token(AttrKind::Height),
    ) {
        let parent_height_value = registry.raw_value_of(AttrKind::Height, parent_height);
        let own_height_value = registry.value_of(AttrKind::Height, own_height, line.id)?;
        if let Some(ph) = parent_height_value {
            if ph < own_height_value {
                if let Some(pb) = registry.raw_value_of(AttrKind::Bottom, parent_bottom) {
                    bottom += pb;
                }
            }
        }
    }

    Ok(bottom)
}

/// Resolve a counted token's value, reporting the first line that
/// carries it if the style rule is missing.
fn token_value(
    registry: &AttributeRegistry,
    lines: &[Line],
    kind: AttrKind,
    token: &str,
) -> Result<f32> {
    let line_id = lines
        .iter()
        .find(|l| l.token(kind) == Some(token))
        .map(|l| l.id)
        .unwrap_or(0);
    registry.value_of(kind, token, line_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse;

    fn build(html: &str) -> (AttributeRegistry, Vec<Line>) {
        let tree = parse(html).unwrap();
        let lines = Line::collect(&tree);
        let registry = AttributeRegistry::build(&tree, &lines);
        (registry, lines)
    }

    fn two_column_doc() -> String {
        let mut html = String::from(
            "<style>.x1{left:50px;}.x2{left:300px;}.y1{bottom:700px;}.fs2{font-size:12px;}.fs9{font-size:28px;}.h1{height:14px;}</style>",
        );
        html.push_str(r#"<div class="pf h9" data-page-no="1">"#);
        for _ in 0..100 {
            html.push_str(r#"<div class="t h1 x1 y1 fs2 ff1">body</div>"#);
        }
        for _ in 0..60 {
            html.push_str(r#"<div class="t h1 x2 y1 fs2 ff1">body</div>"#);
        }
        html.push_str(r#"<div class="t h1 x1 y1 fs9 ff1">Title</div>"#);
        html.push_str("</div>");
        html
    }

    #[test]
    fn test_column_inference_two_columns() {
        let (registry, lines) = build(&two_column_doc());
        let (count, xs) = infer_columns(&registry, &lines).unwrap();
        assert_eq!(count, 2);
        assert_eq!(xs, [50.0, 300.0]);
    }

    #[test]
    fn test_column_inference_single_column() {
        let mut html = String::from("<style>.x1{left:50px;}.x2{left:300px;}</style>");
        for _ in 0..100 {
            html.push_str(r#"<div class="t x1">a</div>"#);
        }
        for _ in 0..40 {
            html.push_str(r#"<div class="t x2">b</div>"#);
        }
        let (registry, lines) = build(&html);
        let (count, xs) = infer_columns(&registry, &lines).unwrap();
        assert_eq!(count, 1);
        assert_eq!(xs, [50.0, 50.0]);
    }

    #[test]
    fn test_title_font_threshold_is_strict() {
        let at_threshold = concat!(
            "<style>.y1{bottom:500px;}.fs2{font-size:12px;}.fs9{font-size:28px;}.h1{height:14px;}</style>",
            r#"<div class="pf" data-page-no="1"><div class="t h1 x1 y1 fs9 ff1">Title</div>"#,
            r#"<div class="t h1 x1 y1 fs2 ff1">body</div></div>"#,
        );
        let (registry, lines) = build(at_threshold);
        let options = ParseOptions::default();
        assert!(matches!(
            infer_title_font(&registry, &lines, &options),
            Err(Error::NoTitleFont)
        ));

        let above = concat!(
            "<style>.y1{bottom:501px;}.fs2{font-size:12px;}.fs9{font-size:28px;}.h1{height:14px;}</style>",
            r#"<div class="pf" data-page-no="1"><div class="t h1 x1 y1 fs9 ff1">Title</div>"#,
            r#"<div class="t h1 x1 y1 fs2 ff1">body</div></div>"#,
        );
        let (registry, lines) = build(above);
        assert_eq!(
            infer_title_font(&registry, &lines, &options).unwrap(),
            "fs9"
        );
    }

    #[test]
    fn test_no_body_font_is_fatal() {
        let (registry, lines) = build(r#"<div class="t x1 y1">no font size</div>"#);
        let options = ParseOptions::default();
        assert!(matches!(
            infer(&registry, &lines, &options),
            Err(Error::NoBodyFont)
        ));
    }

    #[test]
    fn test_line_gap_modal() {
        let mut html = String::from(
            "<style>.fs2{font-size:12px;}.h1{height:14px;}.x1{left:50px;}",
        );
        // bottoms descending mostly by 14, once by 30
        let bottoms = [700, 686, 672, 658, 628, 614];
        for (i, b) in bottoms.iter().enumerate() {
            html.push_str(&format!(".yt{}{{bottom:{}px;}}", i, b));
        }
        html.push_str("</style>");
        html.push_str(r#"<div class="pf" data-page-no="1">"#);
        for i in 0..bottoms.len() {
            html.push_str(&format!(
                r#"<div class="t h1 x1 yt{} fs2 ff1">line</div>"#,
                i
            ));
        }
        html.push_str("</div>");

        let (registry, lines) = build(&html);
        let options = ParseOptions::default();
        let params = LayoutParameters {
            column_count: 1,
            column_x: [50.0, 50.0],
            body_font_size: "fs2".to_string(),
            body_font_family: Some("ff1".to_string()),
            body_height: Some("h1".to_string()),
            title_font_size: "fs9".to_string(),
            avg_line_gap: 0,
        };
        assert_eq!(
            infer_line_gap(&registry, &lines, &params, &options).unwrap(),
            14
        );
    }

    #[test]
    fn test_parent_offset_correction() {
        let html = concat!(
            "<style>.h1{height:14px;}.h0{height:4px;}.y1{bottom:100px;}.y5{bottom:600px;}.fs2{font-size:12px;}</style>",
            r#"<div class="pf" data-page-no="1">"#,
            r#"<div class="c h0 y5"><div class="t h1 x1 y1 fs2 ff1">nested</div></div>"#,
            "</div>",
        );
        let tree = parse(html).unwrap();
        let lines = Line::collect(&tree);
        let registry = AttributeRegistry::build(&tree, &lines);

        let corrected =
            corrected_bottom(&registry, &lines[0], &ParseOptions::default()).unwrap();
        assert_eq!(corrected, 700.0);

        let disabled = ParseOptions::default().with_parent_offset_correction(false);
        let plain = corrected_bottom(&registry, &lines[0], &disabled).unwrap();
        assert_eq!(plain, 100.0);
    }
}
