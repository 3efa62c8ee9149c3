//! Error types for the repaper library.

use std::io;
use thiserror::Error;

/// Result type alias for repaper operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during structure recovery.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading dictionary files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input markup could not be parsed into a tree.
    #[error("Malformed input markup: {0}")]
    Dom(String),

    /// No font-size token was ever observed on a body-looking line.
    ///
    /// The document's structure cannot be determined; the input tree is
    /// left as the caller supplied it.
    #[error("Could not determine structure: no body font observed")]
    NoBodyFont,

    /// No page-1 line clears the title bottom threshold.
    ///
    /// The document's structure cannot be determined; the input tree is
    /// left as the caller supplied it.
    #[error("Could not determine structure: no title font observed on page 1")]
    NoTitleFont,

    /// A class token has no corresponding style-rule value.
    ///
    /// This indicates malformed converter output, not a recoverable
    /// condition.
    #[error("No style value for class token '{token}' (line {line_id})")]
    MissingStyleValue {
        /// The class token with no declared pixel value
        token: String,
        /// Document-order id of the line carrying the token
        line_id: usize,
    },

    /// The tag dictionary has no entry for a block kind.
    #[error("Tag dictionary has no entry for '{0}'")]
    MissingTag(String),

    /// The color dictionary has no entry for a block kind.
    #[error("Color dictionary has no entry for '{0}'")]
    MissingColor(String),

    /// The pattern table has no entry for a named expression.
    #[error("Pattern table has no entry for '{0}'")]
    MissingPattern(String),

    /// A loaded pattern failed to compile.
    #[error("Invalid pattern '{name}': {source}")]
    Pattern {
        /// Name of the offending table entry
        name: String,
        /// Underlying regex error
        source: regex::Error,
    },

    /// A dictionary file is malformed.
    #[error("Invalid dictionary file: {0}")]
    Dictionary(String),

    /// Error while rendering an output document.
    #[error("Rendering error: {0}")]
    Render(String),
}
