//! # repaper
//!
//! Logical structure recovery for scientific papers from PDF-to-HTML
//! layout output.
//!
//! A PDF-to-HTML converter emits one positioned line per text
//! fragment, with typography encoded in class tokens (`h3`, `fs2`,
//! `y4a`, `x12`, `ff1`) whose pixel values live in the document's
//! style rules. This library infers the document-wide layout (column
//! geometry, body and title fonts, modal line spacing) from
//! frequency statistics, filters running heads, footnotes, and
//! table/figure contents, then classifies the remaining lines into the
//! logical parts of a paper: title, abstract, keyword/category blocks,
//! numbered sections, captions, acknowledgements, references, and
//! annexes.
//!
//! ## Quick Start
//!
//! ```no_run
//! use repaper::recover;
//!
//! fn main() -> repaper::Result<()> {
//!     let html = std::fs::read_to_string("paper.html")?;
//!     let recovered = recover(&html)?;
//!
//!     // structured markup with one element per recognized block
//!     println!("{}", recovered.markup);
//!     // the input tree, color-annotated per block kind
//!     std::fs::write("annotated.html", &recovered.annotated)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Outputs
//!
//! - **Structured markup**: an XML document using a configurable tag
//!   vocabulary, with per-line `<div id="...">` fragments and
//!   `<false-hyphen/>` markers at dehyphenated line joins.
//! - **Annotated copy**: the input tree serialized back out with
//!   `filtered` statuses and per-kind colors written onto every line.
//!
//! Recovery is single-threaded and owns no global state: dictionaries
//! are loaded once and shared read-only, while all per-document state
//! lives in one engine run. A tree must not be handed to two
//! concurrent runs, as it is annotated in place.

pub mod dict;
pub mod dom;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use dict::{
    ColorDictionary, Dictionaries, HyphenationDictionary, PatternTable, TagDictionary,
};
pub use dom::{Node, NodeId, Tree};
pub use error::{Error, Result};
pub use model::{AttrKind, FilterStatus, Line};
pub use parser::{LayoutParameters, ParseOptions, Thresholds};
pub use render::{JsonFormat, RecoveryStats};

use parser::{Automaton, Scan};
use render::markup::Tags;

/// Recover the structure of a converter-produced document with default
/// dictionaries and options.
///
/// # Example
///
/// ```no_run
/// let html = std::fs::read_to_string("paper.html").unwrap();
/// let recovered = repaper::recover(&html).unwrap();
/// assert!(recovered.markup.starts_with("<?xml"));
/// ```
pub fn recover(html: &str) -> Result<RecoveredDocument> {
    let dictionaries = Dictionaries::default();
    recover_with(html, &dictionaries, ParseOptions::default())
}

/// Recover structure with explicit dictionaries and options.
pub fn recover_with(
    html: &str,
    dictionaries: &Dictionaries,
    options: ParseOptions,
) -> Result<RecoveredDocument> {
    let mut tree = dom::parse(html)?;
    let engine = StructureEngine::new(dictionaries, options);
    engine.run(&mut tree)
}

/// Recover structure from an already-built tree.
///
/// The tree is annotated in place; the caller keeps it either way. On
/// a fatal inference failure ([`Error::NoBodyFont`],
/// [`Error::NoTitleFont`]) the tree is returned untouched.
pub fn recover_tree(
    tree: &mut Tree,
    dictionaries: &Dictionaries,
    options: ParseOptions,
) -> Result<RecoveredDocument> {
    StructureEngine::new(dictionaries, options).run(tree)
}

/// The result of one recovery run.
pub struct RecoveredDocument {
    /// Structured markup document (XML declaration + one root element)
    pub markup: String,
    /// The input tree serialized back out with annotations
    pub annotated: String,
    /// What the run found, with the inferred layout parameters
    pub stats: RecoveryStats,
}

/// One recovery run: registry, layout inference, filters, automaton,
/// output assembly.
///
/// All per-document state lives inside [`run`](Self::run); the engine
/// itself only borrows the shared dictionaries and carries the
/// options, so one engine can serve many documents sequentially.
pub struct StructureEngine<'a> {
    dictionaries: &'a Dictionaries,
    options: ParseOptions,
}

impl<'a> StructureEngine<'a> {
    /// Create an engine over shared dictionaries.
    pub fn new(dictionaries: &'a Dictionaries, options: ParseOptions) -> Self {
        Self {
            dictionaries,
            options,
        }
    }

    /// Run the full pipeline over one tree.
    pub fn run(&self, tree: &mut Tree) -> Result<RecoveredDocument> {
        // resolve the whole tag vocabulary up front so a configuration
        // error surfaces before anything is classified
        let tags = Tags::resolve(&self.dictionaries.tags)?;

        let mut lines = Line::collect(tree);
        log::debug!("collected {} text lines", lines.len());

        let registry = parser::AttributeRegistry::build(tree, &lines);
        let params = parser::layout::infer(&registry, &lines, &self.options)?;

        parser::filter_running_heads(tree, &mut lines, &registry, &params, &self.options)?;
        parser::filter_footnotes(&mut lines, &registry, &params, &self.options)?;
        parser::filter_table_figure_content(
            &mut lines,
            &registry,
            &params,
            &self.options,
            &self.dictionaries.patterns,
        )?;

        let body_descendant: Vec<bool> = lines
            .iter()
            .map(|l| tree.descendant_has_class(l.node, &params.body_font_size))
            .collect();

        let scan = Scan {
            lines: &lines,
            registry: &registry,
            params: &params,
            options: &self.options,
            patterns: &self.dictionaries.patterns,
            body_descendant: &body_descendant,
        };
        let outcome = Automaton::new(scan, &self.dictionaries.hyphenation, &tags).run()?;

        render::annotate(tree, &lines, &outcome.line_kinds, &self.dictionaries.colors)?;

        Ok(RecoveredDocument {
            markup: outcome.out.build(&tags),
            annotated: tree.to_html(),
            stats: RecoveryStats::collect(&lines, &outcome.line_kinds, &params),
        })
    }
}

/// Builder for recovery runs.
///
/// # Example
///
/// ```no_run
/// use repaper::{Repaper, Thresholds};
///
/// let recovered = Repaper::new()
///     .with_thresholds(Thresholds { title_bottom_min: 420.0, ..Default::default() })
///     .without_parent_offset_correction()
///     .recover(&std::fs::read_to_string("paper.html").unwrap())?;
/// # Ok::<(), repaper::Error>(())
/// ```
pub struct Repaper {
    dictionaries: Dictionaries,
    options: ParseOptions,
}

impl Repaper {
    /// Create a builder with default dictionaries and options.
    pub fn new() -> Self {
        Self {
            dictionaries: Dictionaries::default(),
            options: ParseOptions::default(),
        }
    }

    /// Replace all dictionaries.
    pub fn with_dictionaries(mut self, dictionaries: Dictionaries) -> Self {
        self.dictionaries = dictionaries;
        self
    }

    /// Replace the hyphenation dictionary.
    pub fn with_hyphenation(mut self, hyphenation: HyphenationDictionary) -> Self {
        self.dictionaries.hyphenation = hyphenation;
        self
    }

    /// Replace the threshold set.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.options = self.options.with_thresholds(thresholds);
        self
    }

    /// Disable the parent-offset correction.
    pub fn without_parent_offset_correction(mut self) -> Self {
        self.options = self.options.with_parent_offset_correction(false);
        self
    }

    /// Run recovery over converter markup.
    pub fn recover(&self, html: &str) -> Result<RecoveredDocument> {
        recover_with(html, &self.dictionaries, self.options.clone())
    }

    /// Run recovery over an already-built tree.
    pub fn recover_tree(&self, tree: &mut Tree) -> Result<RecoveredDocument> {
        recover_tree(tree, &self.dictionaries, self.options.clone())
    }
}

impl Default for Repaper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_configuration() {
        let repaper = Repaper::new()
            .with_thresholds(Thresholds {
                title_bottom_min: 420.0,
                ..Default::default()
            })
            .without_parent_offset_correction();

        assert_eq!(repaper.options.thresholds.title_bottom_min, 420.0);
        assert!(!repaper.options.parent_offset_correction);
    }

    #[test]
    fn test_recover_rejects_document_without_fonts() {
        let html = r#"<div class="pf h9" data-page-no="1"><div class="t x1 y1">text</div></div>"#;
        assert!(matches!(recover(html), Err(Error::NoBodyFont)));
    }

    #[test]
    fn test_recover_rejects_document_without_title_font() {
        // all text sits below the title threshold
        let html = concat!(
            "<style>.y1{bottom:120px;}.fs2{font-size:12px;}.h1{height:14px;}.x1{left:50px;}</style>",
            r#"<div class="pf h9" data-page-no="1">"#,
            r#"<div class="t h1 x1 y1 fs2 ff1">low text</div>"#,
            "</div>",
        );
        assert!(matches!(recover(html), Err(Error::NoTitleFont)));
    }

    #[test]
    fn test_fatal_failure_leaves_tree_untouched() {
        let html = concat!(
            "<style>.y1{bottom:120px;}.fs2{font-size:12px;}.h1{height:14px;}.x1{left:50px;}</style>",
            r#"<div class="pf h9" data-page-no="1">"#,
            r#"<div class="t h1 x1 y1 fs2 ff1">low text</div>"#,
            "</div>",
        );
        let mut tree = dom::parse(html).unwrap();
        let before = tree.to_html();
        let dictionaries = Dictionaries::default();
        let result = recover_tree(&mut tree, &dictionaries, ParseOptions::default());
        assert!(result.is_err());
        assert_eq!(tree.to_html(), before);
    }
}
