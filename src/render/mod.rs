//! Rendering: structured markup assembly, tree annotation, and the
//! JSON summary.

mod annotate;
mod json;
pub(crate) mod markup;

pub use annotate::annotate;
pub use json::{to_json, JsonFormat, RecoveryStats};
pub use markup::{OutputDocument, Tags};
