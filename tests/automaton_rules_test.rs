//! Per-rule boundary tests for the classification cascade, run over
//! small synthetic documents.

use repaper::recover;

const STYLES: &str = concat!(
    "<style>",
    ".hp{height:1100px;}",
    ".h1{height:14px;}.h2{height:30px;}.h3{height:18px;}",
    ".fs2{font-size:12px;}.fs5{font-size:18px;}.fs9{font-size:28px;}",
    ".x1{left:50px;}.x2{left:62px;}",
    ".ya{bottom:700px;}.yb{bottom:686px;}.yc{bottom:672px;}.yd{bottom:660px;}",
    ".ye{bottom:646px;}.yf{bottom:632px;}.yg{bottom:600px;}.yh{bottom:580px;}",
    ".yi{bottom:566px;}.yj{bottom:534px;}.yk{bottom:514px;}.yl{bottom:500px;}",
    ".ym{bottom:560px;}.yn{bottom:520px;}.yo{bottom:490px;}.yp{bottom:476px;}",
    ".yq{bottom:570px;}.yr{bottom:556px;}",
    "</style>",
);

fn line(classes: &str, text: &str) -> String {
    format!(r#"<div class="t {classes}">{text}</div>"#)
}

fn page(no: u32, lines: &[String]) -> String {
    format!(
        r#"<div id="pf{no}" class="pf hp" data-page-no="{no}">{}</div>"#,
        lines.concat()
    )
}

fn filler_page(no: u32) -> String {
    page(
        no,
        &[
            line("h1 x1 ya fs2 ff1", "More prose follows on the second"),
            line("h1 x1 yb fs2 ff1", "page to keep the bounds honest."),
        ],
    )
}

#[test]
fn test_abstract_and_inline_keywords_flow() {
    let page1 = page(
        1,
        &[
            line("h2 x1 ya fs9 ff1", "A Paper With Front Matter"),
            line("h3 x1 yc fs5 ff1", "Abstract"),
            line("h1 x1 yd fs2 ff1", "We summarize the method in a few"),
            line("h1 x1 ye fs2 ff1", "plain sentences of body text."),
            line("h1 x1 yf fs2 ff1", "Keywords: layout, structure"),
            line("h3 x1 yg fs5 ff1", "1 Introduction"),
            line("h1 x2 yh fs2 ff1", "The introduction follows the front"),
            line("h1 x1 yi fs2 ff1", "matter on the first page."),
        ],
    );
    let html = format!("{STYLES}{page1}{}", filler_page(2));
    let markup = recover(&html).unwrap().markup;

    assert!(markup.contains("<abstract_title><div id=\"1\">Abstract</div></abstract_title>"));
    assert!(markup.contains("We summarize the method"));
    // the keywords line was not swallowed by the abstract
    let abstract_end = markup.find("</abstract>").unwrap();
    let keywords_at = markup.find("Keywords: layout, structure").unwrap();
    assert!(keywords_at > abstract_end);
    // the combined title-with-text form emits an empty title tag
    assert!(markup.contains("<keywords_title></keywords_title>"));
    assert!(markup.contains("<keywords><div id=\"4\">Keywords: layout, structure</div></keywords>"));
    // and the section still opens afterwards
    assert!(markup.contains("<section_title><div id=\"5\">1 Introduction</div></section_title>"));
}

#[test]
fn test_subsection_by_family_at_body_size() {
    let page1 = page(
        1,
        &[
            line("h2 x1 ya fs9 ff1", "Nested Section Levels"),
            line("h3 x1 yg fs5 ff1", "1 Results"),
            line("h1 x2 yh fs2 ff1", "Numbers are reported in the order"),
            line("h1 x1 yi fs2 ff1", "they were produced by the runs."),
            // body-sized but different family: still a subsection title
            line("h1 x1 yj fs2 ff2", "1.1 Setup"),
            line("h1 x2 yk fs2 ff1", "The machines used for the runs"),
            line("h1 x1 yl fs2 ff1", "were entirely unremarkable."),
        ],
    );
    let html = format!("{STYLES}{page1}{}", filler_page(2));
    let markup = recover(&html).unwrap().markup;

    assert!(markup.contains("<subsection><subsection_title><div id=\"4\">1.1 Setup</div></subsection_title>"));
    // nested inside the open section, closed before the section closes
    let subsection_close = markup.find("</subsection>").unwrap();
    let section_close = markup.find("</section>").unwrap();
    assert!(subsection_close < section_close);
    assert_eq!(markup.matches("<paragraph>").count(), 2);
}

#[test]
fn test_annex_after_references_closes_them() {
    let page1 = page(
        1,
        &[
            line("h2 x1 ya fs9 ff1", "A Paper With An Appendix"),
            line("h1 x2 yd fs2 ff1", "Body text establishing the body"),
            line("h1 x1 ye fs2 ff1", "font and the usual line gap."),
            line("h3 x1 yg fs5 ff1", "References"),
            line("h1 x1 ym fs2 ff1", "[1] F. Writer. Sections. 2006."),
            line("h3 x1 yn fs5 ff1", "Appendix A"),
            line("h1 x1 yo fs2 ff1", "Extra material that did not fit"),
            line("h1 x1 yp fs2 ff1", "into the body of the paper."),
        ],
    );
    let html = format!("{STYLES}{page1}{}", filler_page(2));
    let markup = recover(&html).unwrap().markup;

    assert!(markup.contains("<annex><annex_title><div id=\"5\">Appendix A</div></annex_title>"));
    assert!(markup.contains("Extra material that did not fit"));
    assert!(markup.ends_with("</annex></article>"));
    // the annex text did not become reference entries
    assert_eq!(markup.matches("<reference>").count(), 1);
}

#[test]
fn test_acknowledgements_block_before_references() {
    let page1 = page(
        1,
        &[
            line("h2 x1 ya fs9 ff1", "A Paper That Thanks People"),
            line("h1 x2 yd fs2 ff1", "Body text establishing the body"),
            line("h1 x1 ye fs2 ff1", "font and the usual line gap."),
            line("h3 x1 yg fs5 ff1", "Acknowledgements"),
            line("h1 x1 yh fs2 ff1", "We thank the reviewers for the"),
            line("h1 x1 yi fs2 ff1", "time they spent on this work."),
            line("h3 x1 yj fs5 ff1", "References"),
            line("h1 x1 yk fs2 ff1", "[1] H. Writer. Gratitude. 2008."),
        ],
    );
    let html = format!("{STYLES}{page1}{}", filler_page(2));
    let markup = recover(&html).unwrap().markup;

    assert!(markup.contains(
        "<acknowledgements_title><div id=\"3\">Acknowledgements</div></acknowledgements_title>"
    ));
    assert!(markup.contains("We thank the reviewers for the"));
    assert!(markup.contains("time they spent on this work."));
    // the block closes before the references open
    let acknowledgements_at = markup.find("<acknowledgements>").unwrap();
    let references_at = markup.find("<references_title>").unwrap();
    assert!(acknowledgements_at < references_at);
    assert_eq!(markup.matches("<reference>").count(), 1);
}

#[test]
fn test_biographies_title_disables_later_rules() {
    let page1 = page(
        1,
        &[
            line("h2 x1 ya fs9 ff1", "A Paper With Author Notes"),
            line("h1 x2 yd fs2 ff1", "Body text establishing the body"),
            line("h1 x1 ye fs2 ff1", "font and the usual line gap."),
            line("h3 x1 yg fs5 ff1", "1 Introduction"),
            line("h1 x2 yh fs2 ff1", "The introduction fills the page"),
            line("h1 x1 yi fs2 ff1", "with unremarkable body prose."),
            line("h3 x1 yj fs5 ff1", "About the Authors"),
            line("h1 x1 yk fs2 ff1", "The first author keeps bees and"),
            line("h1 x1 yl fs2 ff1", "the second prefers wasps."),
        ],
    );
    let page2 = page(
        2,
        &[
            line("h1 x1 ya fs2 ff1", "More prose follows on the second"),
            line("h1 x1 yb fs2 ff1", "page to keep the bounds honest."),
            // a would-be heading after the biographies block
            line("h3 x1 ym fs5 ff1", "2 Conclusion"),
            line("h1 x1 yn fs2 ff1", "Nothing here reopens a section."),
        ],
    );
    let html = format!("{STYLES}{page1}{page2}");
    let markup = recover(&html).unwrap().markup;

    // the biographies block is recognized but not emitted
    assert!(!markup.contains("About the Authors"));
    assert!(!markup.contains("keeps bees"));
    // and no section rule fires afterwards
    assert_eq!(markup.matches("<section>").count(), 1);
    assert!(!markup.contains("2 Conclusion"));
}

#[test]
fn test_no_new_section_after_references() {
    let page1 = page(
        1,
        &[
            line("h2 x1 ya fs9 ff1", "No Sections After The End"),
            line("h1 x2 yd fs2 ff1", "Body text establishing the body"),
            line("h1 x1 ye fs2 ff1", "font and the usual line gap."),
            line("h3 x1 yg fs5 ff1", "References"),
            line("h1 x1 ym fs2 ff1", "[1] G. Writer. Annexes. 2007."),
            // a would-be section heading after the references block
            line("h3 x1 yn fs5 ff1", "2 Conclusion"),
        ],
    );
    let html = format!("{STYLES}{page1}{}", filler_page(2));
    let markup = recover(&html).unwrap().markup;

    assert!(!markup.contains("<section>"));
    assert!(!markup.contains("<section_title>"));
}

#[test]
fn test_body_and_sections_resume_after_caption() {
    let extra = "<style>.ys{bottom:486px;}.yt{bottom:450px;}.yu{bottom:430px;}.yv{bottom:416px;}</style>";
    let page1 = page(
        1,
        &[
            line("h2 x1 ya fs9 ff1", "Figures Inside Sections"),
            line("h1 x2 yd fs2 ff1", "Body text establishing the body"),
            line("h1 x1 ye fs2 ff1", "font and the usual line gap."),
            line("h3 x1 yg fs5 ff1", "1 Method"),
            line("h1 x2 yh fs2 ff1", "The method section starts with a"),
            line("h1 x1 yi fs2 ff1", "short paragraph of plain prose."),
            line("h1 x1 yj fs2 ff2", "Figure 1: The processing pipeline"),
            line("h1 x1 yl fs2 ff1", "Prose picks up again after the"),
            line("h1 x1 ys fs2 ff1", "figure and stays in the section."),
            line("h3 x1 yt fs5 ff1", "2 Results"),
            line("h1 x2 yu fs2 ff1", "A second heading still opens a"),
            line("h1 x1 yv fs2 ff1", "fresh section of its own."),
        ],
    );
    let html = format!("{STYLES}{extra}{page1}{}", filler_page(2));
    let markup = recover(&html).unwrap().markup;

    // the caption is collected on its own
    assert!(markup.contains(
        "<figure_caption><div id=\"6\">Figure 1: The processing pipeline</div></figure_caption>"
    ));
    // prose after the figure lands back in the open section
    assert!(markup.contains("figure and stays in the section."));
    // and the next heading still opens a second section
    assert_eq!(markup.matches("<section>").count(), 2);
    assert!(markup.contains("<section_title><div id=\"9\">2 Results</div></section_title>"));
}

#[test]
fn test_caption_lines_collected_with_literal_wrappers() {
    let page1 = page(
        1,
        &[
            line("h2 x1 ya fs9 ff1", "Captions In Running Text"),
            line("h1 x2 yd fs2 ff1", "Body text establishing the body"),
            line("h1 x1 ye fs2 ff1", "font and the usual line gap."),
            line("h1 x1 yg fs2 ff2", "Figure 1: A diagram of the engine"),
            line("h1 x1 yq fs2 ff1", "Prose resumes well clear of the"),
            line("h1 x1 yr fs2 ff1", "caption line printed above it."),
            line("h1 x1 yn fs2 ff2", "Table 2: Recovered block counts"),
            line("h1 x1 yo fs2 ff1", "And the page then carries on as"),
            line("h1 x1 yp fs2 ff1", "ordinary single column prose."),
        ],
    );
    let html = format!("{STYLES}{page1}{}", filler_page(2));
    let markup = recover(&html).unwrap().markup;

    assert!(markup.contains(
        "<figures_caption><figure_caption><div id=\"3\">Figure 1: A diagram of the engine</div></figure_caption></figures_caption>"
    ));
    assert!(markup.contains(
        "<tables_caption><table_caption><div id=\"6\">Table 2: Recovered block counts</div></table_caption></tables_caption>"
    ));
}
