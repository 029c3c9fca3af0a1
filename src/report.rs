//! Report rendering: deck summary (+ optional slide summaries) → artifact.
//!
//! Two renderers share one layout pass:
//!
//! * [`render_text_report`] — plain text, byte-deterministic.
//! * [`render_pdf_report`] — paginated A4 PDF built directly with lopdf
//!   (Helvetica, WinAnsi). No timestamps or document IDs are written, so
//!   identical inputs produce byte-identical artifacts.
//!
//! Both are pure functions of their inputs and never touch the LLM layer:
//! the aggregator hands over a text value and this module does the rest.
//! The deck summary body is split into paragraphs on the double-newline
//! boundary; each paragraph becomes one block separated by consistent
//! spacing, mirroring how the summary text is produced upstream.

use crate::error::SlidebriefError;
use crate::output::SlideSummary;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

// A4 portrait, 2 cm margins.
const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 56.7;
const LEADING: f32 = 16.0;

const BODY_SIZE: f32 = 11.0;
const HEADING_SIZE: f32 = 12.0;
const TITLE_SIZE: f32 = 16.0;

// Helvetica averages just over half an em per glyph; 88 columns at 11 pt
// stays inside the text width with headroom for wide lines.
const BODY_COLS: usize = 88;
const TITLE_COLS: usize = 60;

const LINES_PER_PAGE: usize = ((PAGE_HEIGHT - 2.0 * MARGIN) / LEADING) as usize;

/// Section heading used when slide summaries are interleaved.
const SLIDE_SECTION_HEADING: &str = "Slide summaries";

/// Title text for the report.
///
/// Embeds the deck's source filename verbatim when one is supplied.
pub fn report_title(deck_name: Option<&str>) -> String {
    match deck_name {
        Some(name) => format!("Presentation Summary: {name}"),
        None => "Presentation Summary".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Style {
    Title,
    Heading,
    Body,
    Blank,
}

#[derive(Debug, Clone)]
struct Line {
    text: String,
    style: Style,
}

fn blank() -> Line {
    Line {
        text: String::new(),
        style: Style::Blank,
    }
}

/// Word-wrap `text` to at most `cols` columns; overlong words are hard-split.
fn wrap(text: &str, cols: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        while word.len() > cols {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let (head, tail) = word.split_at(cols);
            lines.push(head.to_string());
            word = tail;
        }
        if current.is_empty() {
            current.push_str(word);
        } else if current.len() + 1 + word.len() <= cols {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Split the deck summary into paragraph blocks.
///
/// Paragraphs are separated by blank lines; single newlines inside a
/// paragraph are soft breaks and flow together.
fn paragraphs(body: &str) -> Vec<String> {
    body.split("\n\n")
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty())
        .collect()
}

/// One formatted line for a slide entry, failed slides marked inline.
fn slide_line(slide: &SlideSummary) -> String {
    if slide.is_success() {
        format!("Slide {}: {}", slide.ordinal, slide.text)
    } else {
        format!("Slide {}: (not summarised)", slide.ordinal)
    }
}

/// The shared layout pass: title + paragraphs (+ slide section) → lines.
fn layout(
    deck_name: Option<&str>,
    deck_summary: &str,
    slides: Option<&[SlideSummary]>,
) -> Vec<Line> {
    let mut lines = Vec::new();

    for l in wrap(&report_title(deck_name), TITLE_COLS) {
        lines.push(Line {
            text: l,
            style: Style::Title,
        });
    }
    lines.push(blank());

    for para in paragraphs(deck_summary) {
        for l in wrap(&para, BODY_COLS) {
            lines.push(Line {
                text: l,
                style: Style::Body,
            });
        }
        lines.push(blank());
    }

    if let Some(slides) = slides {
        lines.push(Line {
            text: SLIDE_SECTION_HEADING.to_string(),
            style: Style::Heading,
        });
        lines.push(blank());
        for slide in slides {
            for l in wrap(&slide_line(slide), BODY_COLS) {
                lines.push(Line {
                    text: l,
                    style: Style::Body,
                });
            }
            lines.push(blank());
        }
    }

    // Drop the trailing spacer so pagination never ends on an empty page.
    while lines.last().is_some_and(|l| l.style == Style::Blank) {
        lines.pop();
    }
    lines
}

/// Render the report as plain text.
///
/// Deterministic: identical inputs always produce byte-identical output.
pub fn render_text_report(
    deck_name: Option<&str>,
    deck_summary: &str,
    slides: Option<&[SlideSummary]>,
) -> String {
    let mut out = String::new();
    for line in layout(deck_name, deck_summary, slides) {
        out.push_str(&line.text);
        out.push('\n');
    }
    out
}

/// Render the report as a paginated A4 PDF.
pub fn render_pdf_report(
    deck_name: Option<&str>,
    deck_summary: &str,
    slides: Option<&[SlideSummary]>,
) -> Result<Vec<u8>, SlidebriefError> {
    let lines = layout(deck_name, deck_summary, slides);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let font_bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_regular,
            "F2" => font_bold,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for page_lines in lines.chunks(LINES_PER_PAGE.max(1)) {
        let content = page_content(page_lines);
        let encoded = content
            .encode()
            .map_err(|e| SlidebriefError::ReportArtifact {
                detail: format!("content stream encoding failed: {e}"),
            })?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(PAGE_WIDTH),
                Object::Real(PAGE_HEIGHT),
            ],
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| SlidebriefError::ReportArtifact {
            detail: e.to_string(),
        })?;
    Ok(bytes)
}

/// Build one page's content stream.
fn page_content(lines: &[Line]) -> Content {
    let mut ops = vec![
        Operation::new("BT", vec![]),
        Operation::new("TL", vec![Object::Real(LEADING)]),
        Operation::new(
            "Td",
            vec![
                Object::Real(MARGIN),
                Object::Real(PAGE_HEIGHT - MARGIN - LEADING),
            ],
        ),
    ];

    let mut current: Option<(&str, f32)> = None;
    for line in lines {
        let font = match line.style {
            Style::Title => Some(("F2", TITLE_SIZE)),
            Style::Heading => Some(("F2", HEADING_SIZE)),
            Style::Body => Some(("F1", BODY_SIZE)),
            Style::Blank => None,
        };
        if let Some(font) = font {
            if current != Some(font) {
                ops.push(Operation::new(
                    "Tf",
                    vec![font.0.into(), Object::Real(font.1)],
                ));
                current = Some(font);
            }
            ops.push(Operation::new(
                "Tj",
                vec![Object::string_literal(encode_win_ansi(&line.text))],
            ));
        }
        ops.push(Operation::new("T*", vec![]));
    }

    ops.push(Operation::new("ET", vec![]));
    Content { operations: ops }
}

/// Approximate WinAnsi encoding: Latin-1 passthrough plus the common
/// typographic characters models like to emit; everything else becomes '?'.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2018}' => 0x91, // ‘
            '\u{2019}' => 0x92, // ’
            '\u{201C}' => 0x93, // “
            '\u{201D}' => 0x94, // ”
            '\u{2013}' => 0x96, // –
            '\u{2014}' => 0x97, // —
            '\u{2026}' => 0x85, // …
            c if (c as u32) <= 0xFF => c as u8,
            _ => b'?',
        })
        .collect()
}
