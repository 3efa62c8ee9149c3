//! JSON summary of a recovery run.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{FilterStatus, Line};
use crate::parser::LayoutParameters;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonFormat {
    /// Pretty-printed with indentation
    Pretty,
    /// Compact single-line
    Compact,
}

/// Counts describing what one recovery run found.
#[derive(Debug, Clone, Serialize)]
pub struct RecoveryStats {
    /// Total text lines in the document
    pub line_count: usize,
    /// Lines filtered as running heads or page numbers
    pub running_head_lines: usize,
    /// Lines filtered as footnotes
    pub footnote_lines: usize,
    /// Lines filtered as table or figure contents
    pub table_figure_lines: usize,
    /// Classified lines per block kind
    pub block_lines: BTreeMap<String, usize>,
    /// The inferred layout parameters
    pub layout: LayoutParameters,
}

impl RecoveryStats {
    /// Collect statistics from a finished run.
    pub fn collect(
        lines: &[Line],
        line_kinds: &[Option<&'static str>],
        layout: &LayoutParameters,
    ) -> Self {
        let mut block_lines: BTreeMap<String, usize> = BTreeMap::new();
        for kind in line_kinds.iter().flatten() {
            *block_lines.entry(kind.to_string()).or_insert(0) += 1;
        }
        Self {
            line_count: lines.len(),
            running_head_lines: count(lines, FilterStatus::RunningHeadOrPageNumber),
            footnote_lines: count(lines, FilterStatus::Footnote),
            table_figure_lines: count(lines, FilterStatus::TableOrFigureBody),
            block_lines,
            layout: layout.clone(),
        }
    }
}

fn count(lines: &[Line], status: FilterStatus) -> usize {
    lines.iter().filter(|l| l.filtered == status).count()
}

/// Serialize recovery statistics to JSON.
pub fn to_json(stats: &RecoveryStats, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(stats),
        JsonFormat::Compact => serde_json::to_string(stats),
    };
    result.map_err(|e| Error::Render(e.to_string()))
}
