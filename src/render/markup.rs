//! Structured markup assembly.
//!
//! Block content is accumulated during classification and concatenated
//! here in a fixed order, each part wrapped in a tag resolved from the
//! tag dictionary, the whole wrapped in one root element with an XML
//! declaration.

use crate::dict::TagDictionary;
use crate::error::Result;

/// Every output tag, resolved once per parse so a missing dictionary
/// entry fails before any line is classified.
#[derive(Debug, Clone)]
pub struct Tags {
    pub root: String,
    pub title: String,
    pub abstract_title: String,
    pub abstract_text: String,
    pub categories_title: String,
    pub categories_text: String,
    pub general_terms_title: String,
    pub general_terms_text: String,
    pub keywords_title: String,
    pub keywords_text: String,
    pub acknowledgements_title: String,
    pub acknowledgements_text: String,
    pub references_title: String,
    pub references: String,
    pub reference: String,
    pub section: String,
    pub section_title: String,
    pub subsection: String,
    pub subsection_title: String,
    pub subsubsection: String,
    pub subsubsection_title: String,
    pub paragraph: String,
    pub figure_caption: String,
    pub table_caption: String,
    pub annex: String,
    pub annex_title: String,
}

impl Tags {
    /// Resolve the full vocabulary from the tag dictionary.
    pub fn resolve(dict: &TagDictionary) -> Result<Self> {
        Ok(Self {
            root: dict.get("root")?.to_string(),
            title: dict.get("title")?.to_string(),
            abstract_title: dict.get("abstract_title")?.to_string(),
            abstract_text: dict.get("abstract")?.to_string(),
            categories_title: dict.get("categories_title")?.to_string(),
            categories_text: dict.get("categories")?.to_string(),
            general_terms_title: dict.get("general_terms_title")?.to_string(),
            general_terms_text: dict.get("general_terms")?.to_string(),
            keywords_title: dict.get("keywords_title")?.to_string(),
            keywords_text: dict.get("keywords")?.to_string(),
            acknowledgements_title: dict.get("acknowledgements_title")?.to_string(),
            acknowledgements_text: dict.get("acknowledgements")?.to_string(),
            references_title: dict.get("references_title")?.to_string(),
            references: dict.get("references")?.to_string(),
            reference: dict.get("reference")?.to_string(),
            section: dict.get("section")?.to_string(),
            section_title: dict.get("section_title")?.to_string(),
            subsection: dict.get("subsection")?.to_string(),
            subsection_title: dict.get("subsection_title")?.to_string(),
            subsubsection: dict.get("subsubsection")?.to_string(),
            subsubsection_title: dict.get("subsubsection_title")?.to_string(),
            paragraph: dict.get("paragraph")?.to_string(),
            figure_caption: dict.get("figure_caption")?.to_string(),
            table_caption: dict.get("table_caption")?.to_string(),
            annex: dict.get("annex")?.to_string(),
            annex_title: dict.get("annex_title")?.to_string(),
        })
    }
}

/// Wrap `inner` in `<tag>...</tag>`.
pub fn wrap(tag: &str, inner: &str) -> String {
    format!("<{tag}>{inner}</{tag}>")
}

/// Open tag.
pub fn open(tag: &str) -> String {
    format!("<{tag}>")
}

/// Close tag.
pub fn close(tag: &str) -> String {
    format!("</{tag}>")
}

/// Accumulated output, ordered at build time.
///
/// Built incrementally during the single classification pass and
/// discarded with it; nothing here outlives one parse call.
#[derive(Debug, Default)]
pub struct OutputDocument {
    pub(crate) title: String,
    pub(crate) abstract_title: String,
    pub(crate) abstract_text: String,
    pub(crate) categories_title: String,
    pub(crate) categories_text: String,
    pub(crate) general_terms_title: String,
    pub(crate) general_terms_text: String,
    pub(crate) keywords_title: String,
    pub(crate) keywords_text: String,
    pub(crate) acknowledgements_title: String,
    pub(crate) acknowledgements_text: String,
    pub(crate) references_title: String,
    /// Individually wrapped reference entries
    pub(crate) references_entries: String,
    /// Interleaved section/subsection/subsubsection markup
    pub(crate) sections: String,
    pub(crate) figure_captions: String,
    pub(crate) table_captions: String,
    /// Interleaved annex markup
    pub(crate) annexes: String,
    /// Emit an empty title tag even with no title text (the combined
    /// title-with-text forms)
    pub(crate) forced_categories_title: bool,
    pub(crate) forced_keywords_title: bool,
    pub(crate) forced_acknowledgements_title: bool,
}

impl OutputDocument {
    /// Remove the last occurrence of `fragment`, returning whether it
    /// was present. Used to reopen the previous reference entry when a
    /// continuation is spliced on.
    pub(crate) fn reopen_last_reference(&mut self, closing: &str) -> bool {
        match self.references_entries.rfind(closing) {
            Some(at) if at + closing.len() == self.references_entries.len() => {
                self.references_entries.truncate(at);
                true
            }
            _ => false,
        }
    }

    /// Assemble the final markup document.
    pub fn build(&self, tags: &Tags) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
        out.push_str(&open(&tags.root));

        push_part(&mut out, &tags.title, &self.title, false);
        push_part(&mut out, &tags.abstract_title, &self.abstract_title, false);
        push_part(&mut out, &tags.abstract_text, &self.abstract_text, false);
        push_part(
            &mut out,
            &tags.categories_title,
            &self.categories_title,
            self.forced_categories_title,
        );
        push_part(&mut out, &tags.categories_text, &self.categories_text, false);
        push_part(
            &mut out,
            &tags.general_terms_title,
            &self.general_terms_title,
            false,
        );
        push_part(
            &mut out,
            &tags.general_terms_text,
            &self.general_terms_text,
            false,
        );
        push_part(
            &mut out,
            &tags.keywords_title,
            &self.keywords_title,
            self.forced_keywords_title,
        );
        push_part(&mut out, &tags.keywords_text, &self.keywords_text, false);

        out.push_str(&self.sections);

        if !self.figure_captions.is_empty() {
            out.push_str("<figures_caption>");
            out.push_str(&self.figure_captions);
            out.push_str("</figures_caption>");
        }
        if !self.table_captions.is_empty() {
            out.push_str("<tables_caption>");
            out.push_str(&self.table_captions);
            out.push_str("</tables_caption>");
        }

        push_part(
            &mut out,
            &tags.acknowledgements_title,
            &self.acknowledgements_title,
            self.forced_acknowledgements_title,
        );
        push_part(
            &mut out,
            &tags.acknowledgements_text,
            &self.acknowledgements_text,
            false,
        );
        push_part(&mut out, &tags.references_title, &self.references_title, false);
        if !self.references_entries.is_empty() {
            out.push_str(&wrap(&tags.references, &self.references_entries));
        }

        out.push_str(&self.annexes);

        out.push_str(&close(&tags.root));
        out
    }
}

fn push_part(out: &mut String, tag: &str, inner: &str, forced: bool) {
    if !inner.is_empty() || forced {
        out.push_str(&wrap(tag, inner));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_order_and_root() {
        let tags = Tags::resolve(&TagDictionary::default()).unwrap();
        let mut doc = OutputDocument::default();
        doc.title = "<div id=\"0\">A Title</div>".to_string();
        doc.references_title = "<div id=\"9\">References</div>".to_string();
        doc.references_entries = "<reference><div id=\"10\">[1] X</div></reference>".to_string();

        let built = doc.build(&tags);
        assert!(built.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?><article>"));
        assert!(built.ends_with("</article>"));
        let title_at = built.find("<title>").unwrap();
        let refs_at = built.find("<references_title>").unwrap();
        assert!(title_at < refs_at);
        assert!(built.contains("<references><reference>"));
    }

    #[test]
    fn test_empty_parts_omitted_unless_forced() {
        let tags = Tags::resolve(&TagDictionary::default()).unwrap();
        let mut doc = OutputDocument::default();
        assert!(!doc.build(&tags).contains("<keywords_title>"));

        doc.forced_keywords_title = true;
        assert!(doc.build(&tags).contains("<keywords_title></keywords_title>"));
    }

    #[test]
    fn test_reopen_last_reference() {
        let mut doc = OutputDocument::default();
        doc.references_entries = "<reference>a</reference><reference>b</reference>".to_string();
        assert!(doc.reopen_last_reference("</reference>"));
        assert_eq!(
            doc.references_entries,
            "<reference>a</reference><reference>b"
        );
        // nothing to reopen once the tail is open
        assert!(!doc.reopen_last_reference("</reference>"));
    }

    #[test]
    fn test_literal_caption_wrappers() {
        let tags = Tags::resolve(&TagDictionary::default()).unwrap();
        let mut doc = OutputDocument::default();
        doc.figure_captions = "<figure_caption><div id=\"4\">Figure 1: x</div></figure_caption>".to_string();
        let built = doc.build(&tags);
        assert!(built.contains("<figures_caption><figure_caption>"));
    }
}
