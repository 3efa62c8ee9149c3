//! External dictionaries: tag names, colors, hyphenated compounds, and
//! the named pattern table.
//!
//! All four are line-oriented text files: `KEY=VALUE` for tags,
//! colors, and patterns, one word per line for hyphenated compounds.
//! They are loaded once at startup and shared read-only across parses;
//! built-in defaults make the engine usable without any files.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use regex::Regex;

use crate::error::{Error, Result};

/// Tag vocabulary for the structured markup output.
#[derive(Debug, Clone)]
pub struct TagDictionary {
    entries: HashMap<String, String>,
}

impl TagDictionary {
    /// Resolve a block kind to its output tag name.
    ///
    /// A missing entry is a configuration error, never an empty tag.
    pub fn get(&self, kind: &str) -> Result<&str> {
        self.entries
            .get(kind)
            .map(|s| s.as_str())
            .ok_or_else(|| Error::MissingTag(kind.to_string()))
    }

    /// Load from a `KEY=VALUE` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self {
            entries: parse_key_values(&content)?,
        })
    }
}

impl Default for TagDictionary {
    fn default() -> Self {
        let entries = [
            ("root", "article"),
            ("title", "title"),
            ("abstract_title", "abstract_title"),
            ("abstract", "abstract"),
            ("categories_title", "categories_title"),
            ("categories", "categories"),
            ("general_terms_title", "general_terms_title"),
            ("general_terms", "general_terms"),
            ("keywords_title", "keywords_title"),
            ("keywords", "keywords"),
            ("acknowledgements_title", "acknowledgements_title"),
            ("acknowledgements", "acknowledgements"),
            ("references_title", "references_title"),
            ("references", "references"),
            ("reference", "reference"),
            ("section", "section"),
            ("section_title", "section_title"),
            ("subsection", "subsection"),
            ("subsection_title", "subsection_title"),
            ("subsubsection", "subsubsection"),
            ("subsubsection_title", "subsubsection_title"),
            ("paragraph", "paragraph"),
            ("figure_caption", "figure_caption"),
            ("table_caption", "table_caption"),
            ("annex", "annex"),
            ("annex_title", "annex_title"),
        ];
        Self {
            entries: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Per-block-kind colors for the annotated tree output.
#[derive(Debug, Clone)]
pub struct ColorDictionary {
    entries: HashMap<String, String>,
}

impl ColorDictionary {
    /// Resolve a block kind to its annotation color.
    pub fn get(&self, kind: &str) -> Result<&str> {
        self.entries
            .get(kind)
            .map(|s| s.as_str())
            .ok_or_else(|| Error::MissingColor(kind.to_string()))
    }

    /// Load from a `KEY=VALUE` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self {
            entries: parse_key_values(&content)?,
        })
    }
}

impl Default for ColorDictionary {
    fn default() -> Self {
        let entries = [
            ("title", "#aa0000"),
            ("abstract_title", "#00aa00"),
            ("abstract", "#00cc44"),
            ("categories_title", "#886600"),
            ("categories", "#aa8800"),
            ("general_terms_title", "#664488"),
            ("general_terms", "#8866aa"),
            ("keywords_title", "#008888"),
            ("keywords", "#00aaaa"),
            ("acknowledgements_title", "#884400"),
            ("acknowledgements", "#aa6600"),
            ("references_title", "#000088"),
            ("reference", "#0000cc"),
            ("section_title", "#cc0066"),
            ("subsection_title", "#cc3388"),
            ("subsubsection_title", "#cc66aa"),
            ("paragraph", "#333333"),
            ("figure_caption", "#007744"),
            ("table_caption", "#447700"),
            ("annex_title", "#660066"),
            ("annex", "#880088"),
        ];
        Self {
            entries: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Compound words whose hyphen is part of the word, stored as the
/// concatenation without the hyphen.
#[derive(Debug, Clone, Default)]
pub struct HyphenationDictionary {
    words: HashSet<String>,
}

impl HyphenationDictionary {
    /// Build from an iterator of words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(|w| w.into().to_lowercase()).collect(),
        }
    }

    /// Load from a one-word-per-line file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_words(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .map(str::to_string),
        ))
    }

    /// Whether the joined form of a hyphen-split pair is a known word.
    pub fn contains(&self, joined: &str) -> bool {
        self.words.contains(&joined.to_lowercase())
    }

    /// Number of known words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Named regular expressions consulted by the structure automaton.
#[derive(Debug, Clone)]
pub struct PatternTable {
    patterns: HashMap<String, Regex>,
}

impl PatternTable {
    /// Whether the named pattern occurs anywhere in `text`.
    pub fn find(&self, name: &str, text: &str) -> Result<bool> {
        Ok(self.pattern(name)?.is_match(text))
    }

    /// Whether the named pattern matches the whole trimmed `text`.
    pub fn is_match(&self, name: &str, text: &str) -> Result<bool> {
        let trimmed = text.trim();
        Ok(self
            .pattern(name)?
            .find(trimmed)
            .is_some_and(|m| m.start() == 0 && m.end() == trimmed.len()))
    }

    fn pattern(&self, name: &str) -> Result<&Regex> {
        self.patterns
            .get(name)
            .ok_or_else(|| Error::MissingPattern(name.to_string()))
    }

    /// Load from a `NAME=regex` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut patterns = HashMap::new();
        for (name, raw) in parse_key_values(&content)? {
            let regex = Regex::new(&raw).map_err(|source| Error::Pattern {
                name: name.clone(),
                source,
            })?;
            patterns.insert(name, regex);
        }
        Ok(Self { patterns })
    }
}

impl Default for PatternTable {
    fn default() -> Self {
        let entries = [
            ("figure_caption", r"(?i)^\s*fig(?:ure)?\.?\s*\d+"),
            ("table_caption", r"(?i)^\s*table\.?\s*\d+"),
            ("abstract_title", r"(?i)abstract\.?"),
            ("keywords_title", r"(?i)(?:key\s?words|index terms)\s*[:.]?"),
            ("keywords_inline", r"(?i)^\s*(?:key\s?words|index terms)\s*[:.]\s*\S.*"),
            ("categories_title", r"(?i)categories(?: and subject descriptors)?\.?"),
            (
                "categories_inline",
                r"(?i)^\s*categories(?: and subject descriptors)?\s*[:.]\s*\S.*",
            ),
            ("general_terms_title", r"(?i)general terms\.?"),
            ("acknowledgements_title", r"(?i)acknowledg(?:e)?ments?\.?"),
            (
                "acknowledgements_inline",
                r"(?i)^\s*acknowledg(?:e)?ments?\s*[:.]\s*\S.*",
            ),
            ("references_title", r"(?i)(?:\d+\.?\s*)?(?:references|bibliography)\.?"),
            ("section_title", r"^\s*(?:\d+|[IVXLC]+)\.?\s+\S.*"),
            ("subsection_title", r"^\s*\d+\.\d+\.?\s+\S.*"),
            ("subsubsection_title", r"^\s*\d+\.\d+\.\d+\.?\s+\S.*"),
            ("annex_title", r"(?i)(?:annex|appendix)\s*[A-Z0-9]*\.?.*"),
            (
                "authors_biographies_title",
                r"(?i)(?:authors?'?\s+biograph(?:y|ies)|about the authors?)",
            ),
            ("supporting_information_title", r"(?i)supporting information"),
            ("reference_index", r"^\s*(?:\[\d{1,3}\]|\(\d{1,3}\)|\d{1,3}\.)"),
        ];
        let patterns = entries
            .iter()
            .map(|(name, raw)| (name.to_string(), Regex::new(raw).unwrap()))
            .collect();
        Self { patterns }
    }
}

/// The full set of externally supplied lookups, shared read-only.
#[derive(Debug, Clone, Default)]
pub struct Dictionaries {
    /// Tag vocabulary for the markup output
    pub tags: TagDictionary,
    /// Annotation colors per block kind
    pub colors: ColorDictionary,
    /// Hyphenated compound words
    pub hyphenation: HyphenationDictionary,
    /// Named regular expressions
    pub patterns: PatternTable,
}

impl Dictionaries {
    /// Load all four dictionaries from a directory with the standard
    /// file names: `tags.txt`, `colors.txt`, `hyphenated-words.txt`,
    /// `patterns.txt`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Ok(Self {
            tags: TagDictionary::from_file(dir.join("tags.txt"))?,
            colors: ColorDictionary::from_file(dir.join("colors.txt"))?,
            hyphenation: HyphenationDictionary::from_file(dir.join("hyphenated-words.txt"))?,
            patterns: PatternTable::from_file(dir.join("patterns.txt"))?,
        })
    }
}

fn parse_key_values(content: &str) -> Result<HashMap<String, String>> {
    let mut entries = HashMap::new();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = line.split_once('=').ok_or_else(|| {
            Error::Dictionary(format!("line {}: expected KEY=VALUE, got '{}'", line_no + 1, line))
        })?;
        entries.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(entries)
}
