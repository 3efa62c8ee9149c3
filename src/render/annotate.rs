//! Color annotation of the input tree.
//!
//! Every classified line gets a `color:<value>;` declaration appended
//! to its `style` attribute, and every line gets its `filtered` status
//! written back, so the annotated serialization shows at a glance what
//! the engine recognized and what it discarded.

use crate::dict::ColorDictionary;
use crate::dom::Tree;
use crate::error::Result;
use crate::model::Line;

/// Write filter statuses and block-kind colors onto the tree.
pub fn annotate(
    tree: &mut Tree,
    lines: &[Line],
    line_kinds: &[Option<&'static str>],
    colors: &ColorDictionary,
) -> Result<()> {
    for line in lines {
        tree.set_attr(line.node, "filtered", line.filtered.attr_value());
        if let Some(kind) = line_kinds[line.id] {
            let color = colors.get(kind)?;
            tree.append_style(line.node, &format!("color:{color};"));
        }
    }
    Ok(())
}
