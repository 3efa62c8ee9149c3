//! Recovery options and the named threshold set.

use serde::Serialize;

/// Options for a structure-recovery run.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Named numeric thresholds
    pub thresholds: Thresholds,

    /// Apply the parent-offset correction for converters that nest
    /// absolutely-positioned lines inside relatively-positioned blocks
    pub parent_offset_correction: bool,
}

impl ParseOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the threshold set.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Enable or disable the parent-offset correction.
    pub fn with_parent_offset_correction(mut self, enabled: bool) -> Self {
        self.parent_offset_correction = enabled;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            parent_offset_correction: true,
        }
    }
}

/// The configuration constants consulted throughout recovery.
///
/// These are fixed per run, never derived from the document.
#[derive(Debug, Clone, Serialize)]
pub struct Thresholds {
    /// Page-1 lines must sit strictly above this bottom value to be
    /// title candidates
    pub title_bottom_min: f32,

    /// Maximum vertical gap between consecutive title lines
    pub title_line_gap_max: f32,

    /// Slack added to the modal line gap when deciding a new block
    pub new_block_gap_slack: f32,

    /// Slack added to the modal line gap when absorbing caption lines
    pub caption_gap_slack: f32,

    /// Vertical slack allowed inside a multi-line block
    pub block_gap_tolerance: f32,

    /// Vertical slack allowed between the two lines of a two-line title
    pub two_line_title_gap: f32,

    /// Offset applied to the body-text bottom bounds when marking
    /// running heads and page numbers
    pub running_head_offset: f32,

    /// Lower percentile of page height below which a line is a
    /// running-head candidate
    pub head_percentile_low: f32,

    /// Upper percentile of page height above which a line is a
    /// running-head candidate
    pub head_percentile_high: f32,

    /// Horizontal tolerance when matching a footnote index against a
    /// column start
    pub footnote_x_tolerance: f32,

    /// Maximum vertical gap between a superscript index and the line
    /// it annotates
    pub superscript_gap_max: f32,

    /// Character-count tolerance around the document average when
    /// probing for body text near a caption
    pub char_count_tolerance: usize,

    /// How many lines to probe on each side of a caption
    pub table_probe_window: usize,

    /// Maximum vertical gap inside table or figure contents
    pub table_gap_max: f32,

    /// Minimum extra indent of a reference's second line
    pub reference_indent_min: f32,

    /// Maximum extra indent of a reference's second line
    pub reference_indent_max: f32,

    /// Horizontal tolerance when matching a broken reference's
    /// continuation against a column start
    pub reference_column_tolerance: f32,

    /// Left-position offset beyond the column start that signals a
    /// paragraph indent
    pub paragraph_indent_offset: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            title_bottom_min: 500.0,
            title_line_gap_max: 30.0,
            new_block_gap_slack: 2.0,
            caption_gap_slack: 4.0,
            block_gap_tolerance: 7.0,
            two_line_title_gap: 8.0,
            running_head_offset: 2.0,
            head_percentile_low: 0.06,
            head_percentile_high: 0.92,
            footnote_x_tolerance: 4.0,
            superscript_gap_max: 5.0,
            char_count_tolerance: 5,
            table_probe_window: 5,
            table_gap_max: 30.0,
            reference_indent_min: 5.0,
            reference_indent_max: 40.0,
            reference_column_tolerance: 5.0,
            paragraph_indent_offset: 8.0,
        }
    }
}
