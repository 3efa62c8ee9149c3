//! Line record model for converter output.

mod line;
mod token;

pub use line::{FilterStatus, Line};
pub use token::{kind_of_token, AttrKind, LINE_MARKER, PAGE_MARKER};
