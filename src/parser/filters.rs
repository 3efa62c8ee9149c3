//! Noise filters: running heads, footnotes, table/figure contents.
//!
//! All three mutate [`Line::filtered`] in place and run, in order,
//! before the structure automaton. Marks are monotonic: a line once
//! filtered keeps its first reason and is never unmarked.

use std::collections::HashMap;

use super::layout::{corrected_bottom, LayoutParameters};
use super::{AttributeRegistry, ParseOptions};
use crate::dict::PatternTable;
use crate::dom::Tree;
use crate::error::Result;
use crate::model::{AttrKind, FilterStatus, Line, PAGE_MARKER};

/// Mark running heads and page numbers.
///
/// Two independent variants, both applied: vertical bounds derived
/// from the body-font lines, and percentile-of-page-height bounds from
/// each page container's height token. A line filtered by either is
/// filtered.
pub fn filter_running_heads(
    tree: &Tree,
    lines: &mut [Line],
    registry: &AttributeRegistry,
    params: &LayoutParameters,
    options: &ParseOptions,
) -> Result<()> {
    filter_by_body_bounds(lines, registry, params, options)?;
    filter_by_page_percentiles(tree, lines, registry, options)?;
    Ok(())
}

fn filter_by_body_bounds(
    lines: &mut [Line],
    registry: &AttributeRegistry,
    params: &LayoutParameters,
    options: &ParseOptions,
) -> Result<()> {
    let mut smallest = f32::MAX;
    let mut largest = f32::MIN;
    for line in lines.iter().filter(|l| params.is_body_font(l)) {
        let bottom = corrected_bottom(registry, line, options)?;
        smallest = smallest.min(bottom);
        largest = largest.max(bottom);
    }
    if smallest > largest {
        log::warn!("no body-font line found, skipping body-bounds running-head filter");
        return Ok(());
    }

    let offset = options.thresholds.running_head_offset;
    for line in lines.iter_mut() {
        if line.filtered.is_filtered() {
            continue;
        }
        let bottom = corrected_bottom(registry, line, options)?;
        if bottom < smallest - offset || bottom > largest + offset {
            log::debug!("line {} filtered as running head/page number", line.id);
            line.filtered = FilterStatus::RunningHeadOrPageNumber;
        }
    }
    Ok(())
}

fn filter_by_page_percentiles(
    tree: &Tree,
    lines: &mut [Line],
    registry: &AttributeRegistry,
    options: &ParseOptions,
) -> Result<()> {
    let heights = page_heights(tree, registry);
    let low = options.thresholds.head_percentile_low;
    let high = options.thresholds.head_percentile_high;

    for line in lines.iter_mut() {
        if line.filtered.is_filtered() {
            continue;
        }
        let page_height = match heights.get(&line.page_no) {
            Some(h) => *h,
            None => continue,
        };
        let bottom = corrected_bottom(registry, line, options)?;
        if bottom < low * page_height || bottom > high * page_height {
            log::debug!(
                "line {} filtered as running head/page number (page percentile)",
                line.id
            );
            line.filtered = FilterStatus::RunningHeadOrPageNumber;
        }
    }
    Ok(())
}

/// Height of each page container, keyed by page number.
fn page_heights(tree: &Tree, registry: &AttributeRegistry) -> HashMap<String, f32> {
    let mut heights = HashMap::new();
    for id in tree.elements() {
        let node = tree.get(id);
        let class = match node.attr("class") {
            Some(c) => c,
            None => continue,
        };
        if !class.split_whitespace().any(|t| t == PAGE_MARKER) {
            continue;
        }
        let page_no = node.attr("data-page-no").unwrap_or("");
        let height = class
            .split_whitespace()
            .find(|t| crate::model::kind_of_token(t) == Some(AttrKind::Height))
            .and_then(|t| registry.raw_value_of(AttrKind::Height, t));
        match height {
            Some(h) => {
                heights.insert(page_no.to_string(), h);
            }
            None => log::warn!("page {} has no resolvable height token", page_no),
        }
    }
    heights
}

/// Mark footnotes.
///
/// A footnote starts with a purely numeric superscript index line at a
/// column start, in a font smaller than the body, annotating a line
/// that is itself smaller than the body and within the superscript gap.
/// Subsequent lines are absorbed while their font size matches the
/// footnote's first text line, or until another footnote starts.
pub fn filter_footnotes(
    lines: &mut [Line],
    registry: &AttributeRegistry,
    params: &LayoutParameters,
    options: &ParseOptions,
) -> Result<()> {
    let mut i = 0;
    while i + 1 < lines.len() {
        if !is_footnote_start(lines, i, registry, params, options)? {
            i += 1;
            continue;
        }

        let footnote_font = lines[i + 1].token(AttrKind::FontSize).map(str::to_string);
        log::debug!("footnote detected at line {}", lines[i].id);
        mark(&mut lines[i], FilterStatus::Footnote);
        mark(&mut lines[i + 1], FilterStatus::Footnote);

        let mut j = i + 2;
        while j < lines.len() {
            if j + 1 < lines.len() && is_footnote_start(lines, j, registry, params, options)? {
                break;
            }
            if lines[j].token(AttrKind::FontSize).map(str::to_string) != footnote_font {
                break;
            }
            mark(&mut lines[j], FilterStatus::Footnote);
            j += 1;
        }
        i = j;
    }
    Ok(())
}

fn is_footnote_start(
    lines: &[Line],
    i: usize,
    registry: &AttributeRegistry,
    params: &LayoutParameters,
    options: &ParseOptions,
) -> Result<bool> {
    let index_line = &lines[i];
    let text_line = &lines[i + 1];
    if index_line.filtered.is_filtered() || !index_line.is_numeric() {
        return Ok(false);
    }

    let left_token = match index_line.token(AttrKind::Left) {
        Some(t) => t,
        None => return Ok(false),
    };
    let left = registry.value_of(AttrKind::Left, left_token, index_line.id)?;
    let tolerance = options.thresholds.footnote_x_tolerance;
    let at_column = (left - params.column_x[0]).abs() <= tolerance
        || (params.column_count == 2 && (left - params.column_x[1]).abs() <= tolerance);
    if !at_column {
        return Ok(false);
    }

    let body_size =
        registry.value_of(AttrKind::FontSize, &params.body_font_size, index_line.id)?;
    let index_size = match index_line.token(AttrKind::FontSize) {
        Some(t) => registry.value_of(AttrKind::FontSize, t, index_line.id)?,
        None => return Ok(false),
    };
    let text_size = match text_line.token(AttrKind::FontSize) {
        Some(t) => registry.value_of(AttrKind::FontSize, t, text_line.id)?,
        None => return Ok(false),
    };
    if index_size >= body_size || text_size >= body_size {
        return Ok(false);
    }

    let index_bottom = corrected_bottom(registry, index_line, options)?;
    let text_bottom = corrected_bottom(registry, text_line, options)?;
    Ok((index_bottom - text_bottom).abs() < options.thresholds.superscript_gap_max)
}

/// Mark table and figure body content around captions.
///
/// For each caption-pattern line, the caption block is consumed, then
/// up to `table_probe_window` lines on each side are probed for a
/// resumption of body text; the lines between the caption and that
/// resumption are the table or figure contents.
pub fn filter_table_figure_content(
    lines: &mut [Line],
    registry: &AttributeRegistry,
    params: &LayoutParameters,
    options: &ParseOptions,
    patterns: &PatternTable,
) -> Result<()> {
    let avg_chars = average_body_chars(lines, params);
    let gap_limit = params.avg_line_gap as f32 + options.thresholds.caption_gap_slack;

    let mut i = 0;
    while i < lines.len() {
        if lines[i].filtered.is_filtered() || !is_caption(&lines[i], patterns)? {
            i += 1;
            continue;
        }

        // absorb the caption block itself
        let mut end = i;
        while end + 1 < lines.len() {
            let next = &lines[end + 1];
            if is_caption(next, patterns)? {
                break;
            }
            let gap = (corrected_bottom(registry, &lines[end], options)?
                - corrected_bottom(registry, next, options)?)
                .abs();
            if gap > gap_limit {
                break;
            }
            end += 1;
        }

        let window = options.thresholds.table_probe_window;
        let below_start = end as isize + 1;
        let above_start = i as isize - 1;
        let below_body = probe(lines, below_start, window, 1, params, avg_chars, options);
        let above_body = probe(lines, above_start, window, -1, params, avg_chars, options);

        if below_body {
            filter_side(lines, below_start, 1, registry, params, options, avg_chars)?;
        }
        if above_body {
            filter_side(lines, above_start, -1, registry, params, options, avg_chars)?;
        }

        i = end + 1;
    }
    Ok(())
}

fn is_caption(line: &Line, patterns: &PatternTable) -> Result<bool> {
    Ok(patterns.find("table_caption", line.trimmed())?
        || patterns.find("figure_caption", line.trimmed())?)
}

/// Average character count of a body-font line across the document.
fn average_body_chars(lines: &[Line], params: &LayoutParameters) -> usize {
    let (total, count) = lines
        .iter()
        .filter(|l| params.is_body_font(l))
        .fold((0usize, 0usize), |(total, count), l| {
            (total + l.trimmed().chars().count(), count + 1)
        });
    if count == 0 {
        0
    } else {
        total / count
    }
}

/// Whether a line reads as resumed body text.
fn is_body_like(line: &Line, params: &LayoutParameters, avg_chars: usize, tolerance: usize) -> bool {
    if !params.is_body_font(line) {
        return false;
    }
    let chars = line.trimmed().chars().count();
    let within_average = chars.abs_diff(avg_chars) <= tolerance;
    let dominant_height = params.body_height.as_deref().is_some_and(|h| {
        line.token(AttrKind::Height) == Some(h)
    });
    within_average || dominant_height
}

/// Probe up to `window` lines from `start` in `direction` for body text.
fn probe(
    lines: &[Line],
    start: isize,
    window: usize,
    direction: isize,
    params: &LayoutParameters,
    avg_chars: usize,
    options: &ParseOptions,
) -> bool {
    let mut index = start;
    for _ in 0..window {
        if index < 0 || index as usize >= lines.len() {
            return false;
        }
        if is_body_like(
            &lines[index as usize],
            params,
            avg_chars,
            options.thresholds.char_count_tolerance,
        ) {
            return true;
        }
        index += direction;
    }
    false
}

/// Filter outward from `start` in `direction` until body text resumes,
/// the column breaks, or the gap opens past the table limit.
fn filter_side(
    lines: &mut [Line],
    start: isize,
    direction: isize,
    registry: &AttributeRegistry,
    params: &LayoutParameters,
    options: &ParseOptions,
    avg_chars: usize,
) -> Result<()> {
    let mut index = start;
    let mut previous_bottom: Option<f32> = None;

    while index >= 0 && (index as usize) < lines.len() {
        let line_index = index as usize;
        if is_body_like(
            &lines[line_index],
            params,
            avg_chars,
            options.thresholds.char_count_tolerance,
        ) {
            break;
        }
        let bottom = corrected_bottom(registry, &lines[line_index], options)?;
        if let Some(prev) = previous_bottom {
            let reading_down = direction > 0;
            let resets = if reading_down { bottom > prev } else { bottom < prev };
            if resets {
                break;
            }
            if (prev - bottom).abs() > options.thresholds.table_gap_max {
                break;
            }
        }
        log::debug!("line {} filtered as table/figure content", lines[line_index].id);
        mark(&mut lines[line_index], FilterStatus::TableOrFigureBody);
        previous_bottom = Some(bottom);
        index += direction;
    }
    Ok(())
}

fn mark(line: &mut Line, status: FilterStatus) {
    if !line.filtered.is_filtered() {
        line.filtered = status;
    }
}
