//! The document structure automaton.
//!
//! A single forward pass over all unfiltered lines, classifying each
//! against an ordered rule cascade. The first rule that claims a line
//! wins, except for the section-family rules, which are evaluated as
//! an overwrite chain where the deepest matching level takes the line.
//! Rules that recognize a block start hand the shared cursor to a
//! block consumer, which absorbs the block's remaining lines before
//! the loop continues.

use super::consumers::{
    consume_body, consume_caption, consume_reference, consume_text_block, consume_title,
    stitch_block, Cursor, Scan,
};
use super::references;
use crate::dict::HyphenationDictionary;
use crate::error::Result;
use crate::model::AttrKind;
use crate::render::markup::{close, open, wrap, OutputDocument, Tags};

/// Article-part states of the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Start,
    Title,
    FigureCaption,
    TableCaption,
    AbstractTitle,
    AbstractText,
    CategoriesTitle,
    CategoriesText,
    GeneralTermsTitle,
    GeneralTermsText,
    KeywordsTitle,
    KeywordsText,
    AcknowledgementsTitle,
    AcknowledgementsText,
    ReferencesTitle,
    ReferencesText,
    SectionTitle,
    SectionText,
    SubsectionTitle,
    SubsectionText,
    SubsubsectionTitle,
    SubsubsectionText,
    AnnexTitle,
    AnnexText,
    AuthorsBiographiesTitle,
    SupportingInformationTitle,
}

/// Section nesting depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SectionLevel {
    None,
    Section,
    Subsection,
    Subsubsection,
}

/// Result of one automaton run.
pub struct AutomatonOutcome {
    /// Accumulated output parts
    pub out: OutputDocument,
    /// Block kind assigned to each line, for colorization
    pub line_kinds: Vec<Option<&'static str>>,
}

/// The classifier. One instance per parse call; nothing survives it.
pub struct Automaton<'a> {
    scan: Scan<'a>,
    hyphenation: &'a HyphenationDictionary,
    tags: &'a Tags,

    out: OutputDocument,
    line_kinds: Vec<Option<&'static str>>,

    state: ParseState,
    prev_bottom: Option<f32>,

    // structural counters
    section_level: SectionLevel,
    open_section: bool,
    open_subsection: bool,
    open_subsubsection: bool,
    annex_open: bool,
    paragraph_open: bool,

    // one-shot flags
    abstract_title_seen: bool,
    abstract_consumed: bool,
    section_seen: bool,
    references_title_seen: bool,
    references_open: bool,
    annex_title_seen: bool,
    biographies_seen: bool,
    supporting_info_seen: bool,

    // title accumulation
    title_lines: Vec<(usize, String)>,
    last_title_bottom: Option<f32>,
}

impl<'a> Automaton<'a> {
    /// Create a classifier over a prepared line scan.
    pub fn new(
        scan: Scan<'a>,
        hyphenation: &'a HyphenationDictionary,
        tags: &'a Tags,
    ) -> Self {
        let line_count = scan.lines.len();
        Self {
            scan,
            hyphenation,
            tags,
            out: OutputDocument::default(),
            line_kinds: vec![None; line_count],
            state: ParseState::Start,
            prev_bottom: None,
            section_level: SectionLevel::None,
            open_section: false,
            open_subsection: false,
            open_subsubsection: false,
            annex_open: false,
            paragraph_open: false,
            abstract_title_seen: false,
            abstract_consumed: false,
            section_seen: false,
            references_title_seen: false,
            references_open: false,
            annex_title_seen: false,
            biographies_seen: false,
            supporting_info_seen: false,
            title_lines: Vec::new(),
            last_title_bottom: None,
        }
    }

    /// Run the pass and return the accumulated output.
    pub fn run(mut self) -> Result<AutomatonOutcome> {
        let mut cursor = Cursor::new();
        while cursor.pos < self.scan.lines.len() {
            let i = cursor.pos;
            if self.scan.lines[i].filtered.is_filtered() {
                cursor.pos += 1;
                continue;
            }
            self.step(i, &mut cursor)?;
            self.prev_bottom = Some(self.scan.bottom(cursor.pos)?);
            cursor.pos += 1;
        }
        self.finish();
        Ok(AutomatonOutcome {
            out: self.out,
            line_kinds: self.line_kinds,
        })
    }

    /// Evaluate the rule cascade for one line.
    fn step(&mut self, i: usize, cursor: &mut Cursor) -> Result<()> {
        let bottom = self.scan.bottom(i)?;
        let gap = self
            .prev_bottom
            .map(|prev| (prev - bottom).abs())
            .unwrap_or(f32::MAX);
        let is_new_block = gap
            > self.scan.params.avg_line_gap as f32
                + self.scan.options.thresholds.new_block_gap_slack;

        if self.rule_title(i, bottom)? {
            return Ok(());
        }
        if self.rule_captions(i, cursor)? {
            return Ok(());
        }
        if self.rule_block_titles(i, cursor, is_new_block)? {
            return Ok(());
        }
        if self.rule_inline_blocks(i, cursor)? {
            return Ok(());
        }
        if self.rule_abstract_title(i, cursor, is_new_block)? {
            return Ok(());
        }
        if self.rule_section_titles(i, cursor, is_new_block)? {
            return Ok(());
        }
        if self.rule_annex_title(i, cursor)? {
            return Ok(());
        }
        if self.rule_trailing_titles(i)? {
            return Ok(());
        }
        if self.rule_block_texts(i, cursor)? {
            return Ok(());
        }
        if self.rule_references(i, cursor)? {
            return Ok(());
        }
        if self.rule_body(i, cursor)? {
            return Ok(());
        }
        log::debug!("line {} left unclassified", self.scan.lines[i].id);
        Ok(())
    }

    // rule 1
    fn rule_title(&mut self, i: usize, bottom: f32) -> Result<bool> {
        let line = &self.scan.lines[i];
        if line.page_no != "1"
            || line.token(AttrKind::FontSize) != Some(self.scan.params.title_font_size.as_str())
            || bottom <= self.scan.options.thresholds.title_bottom_min
        {
            return Ok(false);
        }
        let contiguous = match self.last_title_bottom {
            None => self.title_lines.is_empty(),
            Some(last) => {
                (last - bottom).abs() <= self.scan.options.thresholds.title_line_gap_max
            }
        };
        if !contiguous {
            return Ok(false);
        }
        self.title_lines.push((line.id, line.trimmed().to_string()));
        self.line_kinds[i] = Some("title");
        self.last_title_bottom = Some(bottom);
        self.state = ParseState::Title;
        Ok(true)
    }

    // rule 2
    fn rule_captions(&mut self, i: usize, cursor: &mut Cursor) -> Result<bool> {
        let text = self.scan.lines[i].trimmed();
        let figure = self.scan.patterns.find("figure_caption", text)?;
        let table = !figure && self.scan.patterns.find("table_caption", text)?;
        if !figure && !table {
            return Ok(false);
        }

        let consumed = consume_caption(&self.scan, cursor)?;
        let kind = if figure { "figure_caption" } else { "table_caption" };
        self.mark(&consumed, kind);
        let stitched = stitch_block(&consumed, self.hyphenation);
        if figure {
            self.out
                .figure_captions
                .push_str(&wrap(&self.tags.figure_caption, &stitched));
            self.state = ParseState::FigureCaption;
        } else {
            self.out
                .table_captions
                .push_str(&wrap(&self.tags.table_caption, &stitched));
            self.state = ParseState::TableCaption;
        }
        Ok(true)
    }

    // rule 3
    fn rule_block_titles(
        &mut self,
        i: usize,
        cursor: &mut Cursor,
        is_new_block: bool,
    ) -> Result<bool> {
        if !is_new_block {
            return Ok(false);
        }
        let text = self.scan.lines[i].trimmed().to_string();

        let candidates: [(&str, ParseState, &'static str); 5] = [
            (
                "acknowledgements_title",
                ParseState::AcknowledgementsTitle,
                "acknowledgements_title",
            ),
            (
                "references_title",
                ParseState::ReferencesTitle,
                "references_title",
            ),
            (
                "categories_title",
                ParseState::CategoriesTitle,
                "categories_title",
            ),
            (
                "general_terms_title",
                ParseState::GeneralTermsTitle,
                "general_terms_title",
            ),
            ("keywords_title", ParseState::KeywordsTitle, "keywords_title"),
        ];

        for (pattern, target, kind) in candidates {
            if self.state == target || !self.scan.patterns.is_match(pattern, &text)? {
                continue;
            }
            self.close_section_levels(SectionLevel::Section);
            let consumed = consume_title(&self.scan, cursor)?;
            self.mark(&consumed, kind);
            let stitched = stitch_block(&consumed, self.hyphenation);
            match target {
                ParseState::AcknowledgementsTitle => {
                    self.out.acknowledgements_title.push_str(&stitched)
                }
                ParseState::ReferencesTitle => {
                    self.out.references_title.push_str(&stitched);
                    self.references_title_seen = true;
                    self.references_open = true;
                }
                ParseState::CategoriesTitle => self.out.categories_title.push_str(&stitched),
                ParseState::GeneralTermsTitle => {
                    self.out.general_terms_title.push_str(&stitched)
                }
                ParseState::KeywordsTitle => self.out.keywords_title.push_str(&stitched),
                _ => unreachable!(),
            }
            self.state = target;
            return Ok(true);
        }
        Ok(false)
    }

    // rule 4
    fn rule_inline_blocks(&mut self, i: usize, cursor: &mut Cursor) -> Result<bool> {
        let text = self.scan.lines[i].trimmed().to_string();

        if self.scan.patterns.is_match("keywords_inline", &text)? {
            self.close_section_levels(SectionLevel::Section);
            self.out.forced_keywords_title = true;
            let consumed = consume_text_block(
                &self.scan,
                cursor,
                &["figure_caption", "table_caption"],
                &["abstract_title", "categories_title", "general_terms_title"],
            )?;
            self.mark(&consumed, "keywords");
            self.out
                .keywords_text
                .push_str(&stitch_block(&consumed, self.hyphenation));
            self.state = ParseState::KeywordsText;
            return Ok(true);
        }
        if self.scan.patterns.is_match("categories_inline", &text)? {
            self.close_section_levels(SectionLevel::Section);
            self.out.forced_categories_title = true;
            let consumed = consume_text_block(
                &self.scan,
                cursor,
                &["figure_caption", "table_caption"],
                &["abstract_title", "general_terms_title", "keywords_title"],
            )?;
            self.mark(&consumed, "categories");
            self.out
                .categories_text
                .push_str(&stitch_block(&consumed, self.hyphenation));
            self.state = ParseState::CategoriesText;
            return Ok(true);
        }
        if self.scan.patterns.is_match("acknowledgements_inline", &text)? {
            self.close_section_levels(SectionLevel::Section);
            self.out.forced_acknowledgements_title = true;
            let consumed = consume_text_block(
                &self.scan,
                cursor,
                &["figure_caption", "table_caption"],
                &["references_title", "annex_title"],
            )?;
            self.mark(&consumed, "acknowledgements");
            self.out
                .acknowledgements_text
                .push_str(&stitch_block(&consumed, self.hyphenation));
            self.state = ParseState::AcknowledgementsText;
            return Ok(true);
        }
        Ok(false)
    }

    // rule 5
    fn rule_abstract_title(
        &mut self,
        i: usize,
        cursor: &mut Cursor,
        is_new_block: bool,
    ) -> Result<bool> {
        if !is_new_block
            || self.abstract_consumed
            || self.state == ParseState::AbstractTitle
            || !self
                .scan
                .patterns
                .is_match("abstract_title", self.scan.lines[i].trimmed())?
        {
            return Ok(false);
        }
        let consumed = consume_title(&self.scan, cursor)?;
        self.mark(&consumed, "abstract_title");
        self.out
            .abstract_title
            .push_str(&stitch_block(&consumed, self.hyphenation));
        self.abstract_title_seen = true;
        self.state = ParseState::AbstractTitle;
        Ok(true)
    }

    // rules 6 and 7: evaluated as an ordered overwrite chain, deepest
    // match wins
    fn rule_section_titles(
        &mut self,
        i: usize,
        cursor: &mut Cursor,
        is_new_block: bool,
    ) -> Result<bool> {
        if self.awaiting_abstract()
            || self.references_title_seen
            || self.annex_title_seen
            || self.biographies_seen
            || self.supporting_info_seen
            || self.in_foreign_title_state()
        {
            return Ok(false);
        }

        let line = &self.scan.lines[i];
        let text = line.trimmed().to_string();
        let font_size = match self.scan.font_size(i)? {
            Some(v) => v,
            None => return Ok(false),
        };
        let body_size = self.scan.registry.value_of(
            AttrKind::FontSize,
            &self.scan.params.body_font_size,
            line.id,
        )?;
        let title_size = self.scan.registry.value_of(
            AttrKind::FontSize,
            &self.scan.params.title_font_size,
            line.id,
        )?;
        let family_differs = line.token(AttrKind::FontFamily)
            != self.scan.params.body_font_family.as_deref();

        let mut level = SectionLevel::None;

        let section_font = font_size <= title_size
            && (font_size > body_size || (font_size == body_size && family_differs));
        if section_font
            && is_new_block
            && self.scan.patterns.is_match("section_title", &text)?
        {
            level = SectionLevel::Section;
        }

        let subsection_font = font_size <= title_size
            && (font_size > body_size || (family_differs && font_size + 2.0 >= body_size));
        if subsection_font
            && is_new_block
            && !matches!(
                self.state,
                ParseState::SectionTitle | ParseState::SubsectionTitle
            )
            && self.scan.patterns.is_match("subsection_title", &text)?
        {
            level = SectionLevel::Subsection;
        }

        if !matches!(
            self.state,
            ParseState::SectionTitle
                | ParseState::SubsectionTitle
                | ParseState::SubsubsectionTitle
        ) && self.scan.patterns.is_match("subsubsection_title", &text)?
        {
            level = SectionLevel::Subsubsection;
        }

        let (container, title_tag, kind, target) = match level {
            SectionLevel::None => return Ok(false),
            SectionLevel::Section => (
                self.tags.section.clone(),
                self.tags.section_title.clone(),
                "section_title",
                ParseState::SectionTitle,
            ),
            SectionLevel::Subsection => (
                self.tags.subsection.clone(),
                self.tags.subsection_title.clone(),
                "subsection_title",
                ParseState::SubsectionTitle,
            ),
            SectionLevel::Subsubsection => (
                self.tags.subsubsection.clone(),
                self.tags.subsubsection_title.clone(),
                "subsubsection_title",
                ParseState::SubsubsectionTitle,
            ),
        };

        self.close_section_levels(level);
        self.out.sections.push_str(&open(&container));
        match level {
            SectionLevel::Section => self.open_section = true,
            SectionLevel::Subsection => self.open_subsection = true,
            SectionLevel::Subsubsection => self.open_subsubsection = true,
            SectionLevel::None => {}
        }

        let consumed = consume_title(&self.scan, cursor)?;
        self.mark(&consumed, kind);
        self.out
            .sections
            .push_str(&wrap(&title_tag, &stitch_block(&consumed, self.hyphenation)));
        self.section_level = level;
        self.section_seen = true;
        self.state = target;
        Ok(true)
    }

    // rule 8
    fn rule_annex_title(&mut self, i: usize, cursor: &mut Cursor) -> Result<bool> {
        if self.biographies_seen || self.supporting_info_seen {
            return Ok(false);
        }
        let line = &self.scan.lines[i];
        let text = line.trimmed();
        if !self.scan.patterns.is_match("annex_title", text)? {
            return Ok(false);
        }
        let font_size = match self.scan.font_size(i)? {
            Some(v) => v,
            None => return Ok(false),
        };
        let body_size = self.scan.registry.value_of(
            AttrKind::FontSize,
            &self.scan.params.body_font_size,
            line.id,
        )?;
        let title_size = self.scan.registry.value_of(
            AttrKind::FontSize,
            &self.scan.params.title_font_size,
            line.id,
        )?;
        if font_size <= body_size || font_size >= title_size {
            return Ok(false);
        }

        self.close_section_levels(SectionLevel::Section);
        self.references_open = false;
        if self.annex_open {
            self.out.annexes.push_str(&close(&self.tags.annex));
        }
        self.out.annexes.push_str(&open(&self.tags.annex));
        self.annex_open = true;

        let consumed = consume_title(&self.scan, cursor)?;
        self.mark(&consumed, "annex_title");
        self.out.annexes.push_str(&wrap(
            &self.tags.annex_title,
            &stitch_block(&consumed, self.hyphenation),
        ));
        self.annex_title_seen = true;
        self.state = ParseState::AnnexTitle;
        Ok(true)
    }

    // rule 9
    fn rule_trailing_titles(&mut self, i: usize) -> Result<bool> {
        let line = &self.scan.lines[i];
        let text = line.trimmed();
        let biographies = self.scan.patterns.find("authors_biographies_title", text)?;
        let supporting = !biographies
            && self
                .scan
                .patterns
                .find("supporting_information_title", text)?;
        if !biographies && !supporting {
            return Ok(false);
        }

        let font_size = match self.scan.font_size(i)? {
            Some(v) => v,
            None => return Ok(false),
        };
        let body_size = self.scan.registry.value_of(
            AttrKind::FontSize,
            &self.scan.params.body_font_size,
            line.id,
        )?;
        let title_size = self.scan.registry.value_of(
            AttrKind::FontSize,
            &self.scan.params.title_font_size,
            line.id,
        )?;
        if font_size <= body_size || font_size >= title_size {
            return Ok(false);
        }

        // the next unfiltered line must read as body text
        let next_is_body = self.scan.lines[i + 1..]
            .iter()
            .find(|l| !l.filtered.is_filtered())
            .map(|l| self.scan.params.is_body_font(l))
            .unwrap_or(false);
        if !next_is_body {
            return Ok(false);
        }

        self.close_section_levels(SectionLevel::Section);
        if self.annex_open {
            self.out.annexes.push_str(&close(&self.tags.annex));
            self.annex_open = false;
        }
        self.references_open = false;
        if biographies {
            self.biographies_seen = true;
            self.state = ParseState::AuthorsBiographiesTitle;
        } else {
            self.supporting_info_seen = true;
            self.state = ParseState::SupportingInformationTitle;
        }
        Ok(true)
    }

    // rule 10
    fn rule_block_texts(&mut self, i: usize, cursor: &mut Cursor) -> Result<bool> {
        if !self.scan.is_body_eligible(i)? {
            return Ok(false);
        }
        match self.state {
            ParseState::AbstractTitle | ParseState::AbstractText => {
                let consumed = consume_text_block(
                    &self.scan,
                    cursor,
                    &[
                        "figure_caption",
                        "table_caption",
                        "keywords_inline",
                        "categories_inline",
                    ],
                    &[
                        "keywords_title",
                        "categories_title",
                        "general_terms_title",
                        "references_title",
                    ],
                )?;
                self.mark(&consumed, "abstract");
                self.out
                    .abstract_text
                    .push_str(&stitch_block(&consumed, self.hyphenation));
                self.abstract_consumed = true;
                self.state = ParseState::AbstractText;
                Ok(true)
            }
            ParseState::CategoriesTitle | ParseState::CategoriesText => {
                let consumed = consume_text_block(
                    &self.scan,
                    cursor,
                    &["keywords_inline"],
                    &["abstract_title", "general_terms_title", "keywords_title"],
                )?;
                self.mark(&consumed, "categories");
                self.out
                    .categories_text
                    .push_str(&stitch_block(&consumed, self.hyphenation));
                self.state = ParseState::CategoriesText;
                Ok(true)
            }
            ParseState::GeneralTermsTitle | ParseState::GeneralTermsText => {
                let consumed = consume_text_block(
                    &self.scan,
                    cursor,
                    &["keywords_inline", "categories_inline"],
                    &["abstract_title", "categories_title", "keywords_title"],
                )?;
                self.mark(&consumed, "general_terms");
                self.out
                    .general_terms_text
                    .push_str(&stitch_block(&consumed, self.hyphenation));
                self.state = ParseState::GeneralTermsText;
                Ok(true)
            }
            ParseState::KeywordsTitle | ParseState::KeywordsText => {
                let consumed = consume_text_block(
                    &self.scan,
                    cursor,
                    &["categories_inline"],
                    &["abstract_title", "categories_title", "general_terms_title"],
                )?;
                self.mark(&consumed, "keywords");
                self.out
                    .keywords_text
                    .push_str(&stitch_block(&consumed, self.hyphenation));
                self.state = ParseState::KeywordsText;
                Ok(true)
            }
            ParseState::AcknowledgementsTitle | ParseState::AcknowledgementsText => {
                let consumed = consume_text_block(
                    &self.scan,
                    cursor,
                    &["figure_caption", "table_caption"],
                    &["references_title", "annex_title"],
                )?;
                self.mark(&consumed, "acknowledgements");
                self.out
                    .acknowledgements_text
                    .push_str(&stitch_block(&consumed, self.hyphenation));
                self.state = ParseState::AcknowledgementsText;
                Ok(true)
            }
            ParseState::AnnexTitle | ParseState::AnnexText => {
                let consumed = consume_text_block(
                    &self.scan,
                    cursor,
                    &["figure_caption", "table_caption"],
                    &["annex_title", "references_title"],
                )?;
                self.mark(&consumed, "annex");
                self.out
                    .annexes
                    .push_str(&stitch_block(&consumed, self.hyphenation));
                self.state = ParseState::AnnexText;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    // rule 11
    fn rule_references(&mut self, i: usize, cursor: &mut Cursor) -> Result<bool> {
        let after_title = matches!(
            self.state,
            ParseState::ReferencesTitle | ParseState::ReferencesText
        );
        if !self.references_open || !(after_title || self.references_title_seen) {
            return Ok(false);
        }

        let text = self.scan.lines[i].trimmed();
        let starts_new = self.scan.patterns.find("reference_index", text)?
            || references::reference_starts_by_indentation(&self.scan, i)?;

        if starts_new {
            let consumed = consume_reference(&self.scan, cursor)?;
            self.mark(&consumed, "reference");
            self.out.references_entries.push_str(&wrap(
                &self.tags.reference,
                &stitch_block(&consumed, self.hyphenation),
            ));
            self.state = ParseState::ReferencesText;
            return Ok(true);
        }

        let closing = close(&self.tags.reference);
        if references::continues_previous_reference(&self.scan, i)?
            && self.out.reopen_last_reference(&closing)
        {
            let consumed = consume_reference(&self.scan, cursor)?;
            self.mark(&consumed, "reference");
            self.out
                .references_entries
                .push_str(&stitch_block(&consumed, self.hyphenation));
            self.out.references_entries.push_str(&closing);
            self.state = ParseState::ReferencesText;
            log::debug!(
                "line {} spliced onto the previous reference",
                self.scan.lines[i].id
            );
            return Ok(true);
        }

        // weakest fallback: a references section is open, so the line
        // still becomes a one-line entry
        let consumed = vec![(self.scan.lines[i].id, text.to_string())];
        self.mark(&consumed, "reference");
        self.out.references_entries.push_str(&wrap(
            &self.tags.reference,
            &stitch_block(&consumed, self.hyphenation),
        ));
        self.state = ParseState::ReferencesText;
        Ok(true)
    }

    // rule 12
    fn rule_body(&mut self, i: usize, cursor: &mut Cursor) -> Result<bool> {
        if self.awaiting_abstract()
            || !self.section_seen
            || self.references_title_seen
            || self.annex_title_seen
            || self.biographies_seen
            || self.supporting_info_seen
            || self.in_foreign_title_state()
        {
            return Ok(false);
        }
        if !self.scan.is_body_eligible(i)? {
            return Ok(false);
        }

        let segments = consume_body(&self.scan, cursor, self.paragraph_open)?;
        for segment in &segments {
            if segment.lines.is_empty() {
                continue;
            }
            if segment.new_paragraph || !self.paragraph_open {
                self.close_paragraph();
                self.out.sections.push_str(&open(&self.tags.paragraph));
                self.paragraph_open = true;
            }
            self.mark(&segment.lines, "paragraph");
            self.out
                .sections
                .push_str(&stitch_block(&segment.lines, self.hyphenation));
        }
        self.state = match self.section_level {
            SectionLevel::Subsubsection => ParseState::SubsubsectionText,
            SectionLevel::Subsection => ParseState::SubsectionText,
            _ => ParseState::SectionText,
        };
        Ok(true)
    }

    /// Whether the current state is a title of another block kind.
    ///
    /// Caption states are not title states: the state lingers after a
    /// caption is consumed, and treating it as foreign would lock out
    /// every later section heading and body line.
    fn in_foreign_title_state(&self) -> bool {
        matches!(
            self.state,
            ParseState::AbstractTitle
                | ParseState::CategoriesTitle
                | ParseState::GeneralTermsTitle
                | ParseState::KeywordsTitle
                | ParseState::AcknowledgementsTitle
                | ParseState::ReferencesTitle
                | ParseState::AnnexTitle
                | ParseState::AuthorsBiographiesTitle
                | ParseState::SupportingInformationTitle
        )
    }

    /// Whether an abstract title was seen but its text not yet consumed.
    fn awaiting_abstract(&self) -> bool {
        self.abstract_title_seen && !self.abstract_consumed
    }

    /// Close the paragraph and every section level at or below `level`.
    fn close_section_levels(&mut self, level: SectionLevel) {
        self.close_paragraph();
        if self.open_subsubsection {
            self.out.sections.push_str(&close(&self.tags.subsubsection));
            self.open_subsubsection = false;
        }
        if level <= SectionLevel::Subsection && self.open_subsection {
            self.out.sections.push_str(&close(&self.tags.subsection));
            self.open_subsection = false;
        }
        if level <= SectionLevel::Section && self.open_section {
            self.out.sections.push_str(&close(&self.tags.section));
            self.open_section = false;
        }
        if level <= SectionLevel::Section {
            self.section_level = SectionLevel::None;
        }
    }

    fn close_paragraph(&mut self) {
        if self.paragraph_open {
            self.out.sections.push_str(&close(&self.tags.paragraph));
            self.paragraph_open = false;
        }
    }

    /// Close everything still open at end of input.
    fn finish(&mut self) {
        self.close_section_levels(SectionLevel::Section);
        if self.annex_open {
            self.out.annexes.push_str(&close(&self.tags.annex));
            self.annex_open = false;
        }
        self.out.title = stitch_block(&self.title_lines, self.hyphenation);
    }

    fn mark(&mut self, consumed: &[(usize, String)], kind: &'static str) {
        for &(id, _) in consumed {
            self.line_kinds[id] = Some(kind);
        }
    }
}
