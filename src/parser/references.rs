//! Reference-continuation heuristics.

use super::consumers::Scan;
use crate::error::Result;

/// Confirm a candidate first reference line by the indentation of the
/// following line.
///
/// The next distinct line (same-visual-line fragments and filtered
/// lines are skipped) must be body text indented past the candidate by
/// more than the minimum and less than the maximum reference indent,
/// separated by more than the same-line tolerance. A candidate sitting
/// on the same visual line as its unfiltered predecessor is a
/// continuation fragment, not a reference start.
pub fn reference_starts_by_indentation(scan: &Scan, i: usize) -> Result<bool> {
    if i > 0 && !scan.lines[i - 1].filtered.is_filtered() {
        let gap = scan.gap(i - 1, i)?;
        if scan.is_same_visual_line(gap) {
            return Ok(false);
        }
    }

    let mut j = i + 1;
    while j < scan.lines.len() {
        if scan.lines[j].filtered.is_filtered() {
            j += 1;
            continue;
        }
        let gap = scan.gap(i, j)?;
        if scan.is_same_visual_line(gap) {
            j += 1;
            continue;
        }
        break;
    }
    if j >= scan.lines.len() {
        return Ok(false);
    }

    if !scan.is_body_eligible(j)? {
        return Ok(false);
    }
    let indent = scan.left(j)? - scan.left(i)?;
    let gap = scan.gap(i, j)?;
    let thresholds = &scan.options.thresholds;
    Ok(indent > thresholds.reference_indent_min
        && indent < thresholds.reference_indent_max
        && !scan.is_same_visual_line(gap))
}

/// Whether a line reads as the continuation of a reference broken
/// across a page or column boundary: its left position is compatible
/// with the very start of a column.
pub fn continues_previous_reference(scan: &Scan, i: usize) -> Result<bool> {
    let left = scan.left(i)?;
    let tolerance = scan.options.thresholds.reference_column_tolerance;
    let [first_x, second_x] = scan.params.column_x;
    if scan.params.column_count == 1 {
        return Ok(left < first_x + tolerance);
    }
    Ok((left - first_x).abs() <= tolerance || (left - second_x).abs() <= tolerance)
}
