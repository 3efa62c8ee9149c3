//! The recovery pipeline: registry, layout inference, noise filters,
//! and the structure automaton with its block consumers.

mod automaton;
mod consumers;
mod filters;
pub mod layout;
mod options;
mod references;
mod registry;

pub use automaton::{Automaton, AutomatonOutcome, ParseState, SectionLevel};
pub use consumers::{stitch_block, Cursor, Scan};
pub use filters::{filter_footnotes, filter_running_heads, filter_table_figure_content};
pub use layout::{corrected_bottom, LayoutParameters};
pub use options::{ParseOptions, Thresholds};
pub use references::{continues_previous_reference, reference_starts_by_indentation};
pub use registry::AttributeRegistry;
