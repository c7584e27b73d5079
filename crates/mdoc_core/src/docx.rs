use std::borrow::Cow;
use std::io::Cursor;

use docx_rs::{
    AbstractNumbering, AlignmentType, BorderType, BreakType, Docx, IndentLevel, Level, LevelJc,
    LevelOverride, LevelText, LineSpacing, NumberFormat, Numbering, NumberingId, PageMargin,
    Paragraph, ParagraphBorder, ParagraphBorderPosition, Run, RunFonts, Shading,
    SpecialIndentType, Start, Style, StyleType,
};

use crate::block::{Block, StyledRun};
use crate::error::RenderError;
use crate::inline::format_inline;
use crate::render::{OutputFormat, Renderer};
use crate::style::{ElementStyle, StyleSheet, bare_hex, half_points, twips};

const BULLET_ABSTRACT_ID: usize = 10;
const DECIMAL_ABSTRACT_ID: usize = 11;
const BULLET_NUMBERING_ID: usize = 10;

/// Document tree handed to the package writer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDocument {
    pub paragraphs: Vec<PackageParagraph>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageParagraph {
    pub kind: ParagraphKind,
    pub runs: Vec<StyledRun>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParagraphKind {
    Heading(u8),
    Body,
    Code { language: Option<String> },
    ListItem(ListMarker),
    Quote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarker {
    Bullet,
    /// Member of the `sequence`-th contiguous ordered list, counting from `start`
    Ordered { sequence: usize, start: u32 },
}

/// Writes blocks as an Office Open XML word-processing package.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxRenderer;

impl Renderer for DocxRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Docx
    }

    fn render(&self, blocks: &[Block], style: &StyleSheet) -> Result<Vec<u8>, RenderError> {
        write_package(&build_package(blocks), style)
    }
}

/// Map scanned blocks onto the document tree.
pub fn build_package(blocks: &[Block]) -> PackageDocument {
    let mut paragraphs = Vec::with_capacity(blocks.len());
    let mut sequences = 0usize;
    let mut current: Option<(usize, u32)> = None;

    for block in blocks {
        let paragraph = match block {
            Block::Heading { level, text } => PackageParagraph {
                kind: ParagraphKind::Heading(*level),
                runs: format_inline(text),
            },
            Block::Paragraph { text } => PackageParagraph {
                kind: ParagraphKind::Body,
                runs: format_inline(text),
            },
            Block::CodeFence { language, text } => PackageParagraph {
                kind: ParagraphKind::Code {
                    language: language.clone(),
                },
                runs: vec![StyledRun::plain(text.as_str())],
            },
            Block::ListItem {
                ordered: true,
                index,
                text,
            } => {
                let (sequence, start) = *current.get_or_insert_with(|| {
                    sequences += 1;
                    (sequences - 1, index.unwrap_or(1))
                });
                PackageParagraph {
                    kind: ParagraphKind::ListItem(ListMarker::Ordered { sequence, start }),
                    runs: format_inline(text),
                }
            }
            Block::ListItem { text, .. } => PackageParagraph {
                kind: ParagraphKind::ListItem(ListMarker::Bullet),
                runs: format_inline(text),
            },
            Block::Blockquote { text } => PackageParagraph {
                kind: ParagraphKind::Quote,
                runs: format_inline(text),
            },
            Block::Blank => {
                current = None;
                continue;
            }
        };

        if !block.is_ordered_item() {
            current = None;
        }
        paragraphs.push(paragraph);
    }

    PackageDocument { paragraphs }
}

/// Serialize the document tree into DOCX bytes in one pass.
pub fn write_package(doc: &PackageDocument, style: &StyleSheet) -> Result<Vec<u8>, RenderError> {
    let page = &style.page;
    let body_fonts = RunFonts::new()
        .ascii(&style.fonts.docx_body)
        .hi_ansi(&style.fonts.docx_body);

    let mut docx = Docx::new()
        .page_size(twips(page.width) as u32, twips(page.height) as u32)
        .page_margin(
            PageMargin::new()
                .top(twips(page.margin_top))
                .bottom(twips(page.margin_bottom))
                .left(twips(page.margin_left))
                .right(twips(page.margin_right)),
        )
        .default_fonts(body_fonts)
        .default_size(half_points(style.paragraph.size));

    for level in 1..=3u8 {
        docx = docx.add_style(heading_style(level, style.heading(level)));
    }

    docx = docx
        .add_abstract_numbering(list_numbering(
            BULLET_ABSTRACT_ID,
            "bullet",
            &style.list.bullet,
            style,
        ))
        .add_abstract_numbering(list_numbering(
            DECIMAL_ABSTRACT_ID,
            "decimal",
            "%1.",
            style,
        ))
        .add_numbering(Numbering::new(BULLET_NUMBERING_ID, BULLET_ABSTRACT_ID));

    let mut declared = 0usize;
    for paragraph in &doc.paragraphs {
        if let ParagraphKind::ListItem(ListMarker::Ordered { sequence, start }) = paragraph.kind {
            if sequence >= declared {
                docx = docx.add_numbering(
                    Numbering::new(ordered_numbering_id(sequence), DECIMAL_ABSTRACT_ID)
                        .add_override(LevelOverride::new(0).start(start as usize)),
                );
                declared = sequence + 1;
            }
        }
        docx = docx.add_paragraph(write_paragraph(paragraph, style));
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build().pack(&mut buf).map_err(|e| {
        RenderError::document_build(OutputFormat::Docx, format!("packaging failed: {e}"))
    })?;

    Ok(buf.into_inner())
}

fn ordered_numbering_id(sequence: usize) -> usize {
    BULLET_NUMBERING_ID + 1 + sequence
}

fn heading_style(level: u8, element: &ElementStyle) -> Style {
    let mut heading = Style::new(format!("Heading{level}"), StyleType::Paragraph)
        .name(format!("Heading {level}"))
        .size(half_points(element.size))
        .color(bare_hex(&element.color));
    if element.bold {
        heading = heading.bold();
    }
    if element.italic {
        heading = heading.italic();
    }
    heading
}

fn list_numbering(id: usize, format: &str, text: &str, style: &StyleSheet) -> AbstractNumbering {
    let indent = twips(style.list_item.indent + style.list.marker_width);
    let hanging = twips(style.list.marker_width);

    AbstractNumbering::new(id).add_level(
        Level::new(
            0,
            Start::new(1),
            NumberFormat::new(format),
            LevelText::new(text),
            LevelJc::new("left"),
        )
        .indent(Some(indent), Some(SpecialIndentType::Hanging(hanging)), None, None),
    )
}

fn spacing(element: &ElementStyle) -> LineSpacing {
    LineSpacing::new()
        .before(twips(element.space_before).max(0) as u32)
        .after(twips(element.space_after).max(0) as u32)
}

fn write_paragraph(paragraph: &PackageParagraph, style: &StyleSheet) -> Paragraph {
    match &paragraph.kind {
        ParagraphKind::Heading(level) => {
            let element = style.heading(*level);
            let mut out = Paragraph::new()
                .style(&format!("Heading{}", (*level).clamp(1, 3)))
                .line_spacing(spacing(element));
            for run in &paragraph.runs {
                out = push_run(out, run, element, style);
            }
            out
        }
        ParagraphKind::Body => {
            let element = &style.paragraph;
            let mut out = Paragraph::new().line_spacing(spacing(element));
            if element.justify {
                out = out.align(AlignmentType::Both);
            }
            for run in &paragraph.runs {
                out = push_run(out, run, element, style);
            }
            out
        }
        ParagraphKind::Code { .. } => {
            let element = &style.code_block;
            let mut out = left_rule(
                Paragraph::new()
                    .line_spacing(spacing(element))
                    .indent(Some(twips(element.indent + element.padding)), None, None, None),
                element,
            );
            for run in &paragraph.runs {
                let mut code = shaded(
                    Run::new()
                        .fonts(mono_fonts(style))
                        .size(half_points(element.size))
                        .color(bare_hex(&element.color)),
                    element,
                );
                for (i, line) in run.text.split('\n').enumerate() {
                    if i > 0 {
                        code = code.add_break(BreakType::TextWrapping);
                    }
                    code = code.add_text(xml_text(line));
                }
                out = out.add_run(code);
            }
            out
        }
        ParagraphKind::ListItem(marker) => {
            let element = &style.list_item;
            let id = match marker {
                ListMarker::Bullet => BULLET_NUMBERING_ID,
                ListMarker::Ordered { sequence, .. } => ordered_numbering_id(*sequence),
            };
            let mut out = Paragraph::new()
                .line_spacing(spacing(element))
                .numbering(NumberingId::new(id), IndentLevel::new(0));
            for run in &paragraph.runs {
                out = push_run(out, run, element, style);
            }
            out
        }
        ParagraphKind::Quote => {
            let element = &style.blockquote;
            let mut out = left_rule(
                Paragraph::new().line_spacing(spacing(element)).indent(
                    Some(twips(element.indent + element.padding)),
                    None,
                    Some(twips(element.indent)),
                    None,
                ),
                element,
            );
            for run in &paragraph.runs {
                out = push_run(out, run, element, style);
            }
            out
        }
    }
}

fn mono_fonts(style: &StyleSheet) -> RunFonts {
    RunFonts::new()
        .ascii(&style.fonts.docx_mono)
        .hi_ansi(&style.fonts.docx_mono)
}

/// Append one styled run, splitting embedded newlines into line breaks.
fn push_run(
    paragraph: Paragraph,
    run: &StyledRun,
    element: &ElementStyle,
    style: &StyleSheet,
) -> Paragraph {
    let size = if run.style.code {
        style.inline_code.size
    } else {
        element.size
    };
    let mut out = Run::new()
        .size(half_points(size))
        .color(bare_hex(&element.color));

    if element.bold || run.style.bold {
        out = out.bold();
    }
    if element.italic || run.style.italic {
        out = out.italic();
    }
    if run.style.code {
        out = shaded(out.fonts(mono_fonts(style)), &style.inline_code);
    }

    for (i, line) in run.text.split('\n').enumerate() {
        if i > 0 {
            out = out.add_break(BreakType::TextWrapping);
        }
        if !line.is_empty() {
            out = out.add_text(xml_text(line));
        }
    }

    paragraph.add_run(out)
}

/// Draw the element's rule, if any, as a left paragraph border.
fn left_rule(mut paragraph: Paragraph, element: &ElementStyle) -> Paragraph {
    let Some(rule) = &element.rule else {
        return paragraph;
    };
    // Border widths are in eighths of a point, spacing in whole points (max 31)
    paragraph.property = paragraph.property.set_border(
        ParagraphBorder::new(ParagraphBorderPosition::Left)
            .val(BorderType::Single)
            .size((rule.width * 8.0).round().max(2.0) as usize)
            .space(element.padding.round().clamp(0.0, 31.0) as usize)
            .color(bare_hex(&rule.color)),
    );
    paragraph
}

fn shaded(run: Run, element: &ElementStyle) -> Run {
    match &element.background {
        Some(background) => run.shading(Shading::new().fill(bare_hex(background))),
        None => run,
    }
}

/// Characters XML 1.0 cannot carry, even escaped.
fn is_xml_illegal(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}'
    )
}

/// Text safe to place in `word/document.xml`.
///
/// Vertical tabs and form feeds become spaces; other illegal characters are dropped.
fn xml_text(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_xml_illegal) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.chars()
            .filter_map(|c| match c {
                '\u{b}' | '\u{c}' => Some(' '),
                c if is_xml_illegal(c) => None,
                c => Some(c),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::block::RunStyle;
    use crate::scanner::scan;

    fn kinds(markdown: &str) -> Vec<ParagraphKind> {
        build_package(&scan(markdown))
            .paragraphs
            .into_iter()
            .map(|p| p.kind)
            .collect()
    }

    #[test]
    fn maps_every_block_kind() {
        let doc = build_package(&scan(
            "# Title\n\nSome **bold** text\n\n- item\n\n> quote\n\n```sh\nls -la\n```",
        ));
        assert_eq!(
            doc.paragraphs,
            vec![
                PackageParagraph {
                    kind: ParagraphKind::Heading(1),
                    runs: vec![StyledRun::plain("Title")],
                },
                PackageParagraph {
                    kind: ParagraphKind::Body,
                    runs: vec![
                        StyledRun::plain("Some "),
                        StyledRun::new("bold", RunStyle::BOLD),
                        StyledRun::plain(" text"),
                    ],
                },
                PackageParagraph {
                    kind: ParagraphKind::ListItem(ListMarker::Bullet),
                    runs: vec![StyledRun::plain("item")],
                },
                PackageParagraph {
                    kind: ParagraphKind::Quote,
                    runs: vec![StyledRun::plain("quote")],
                },
                PackageParagraph {
                    kind: ParagraphKind::Code {
                        language: Some("sh".to_string()),
                    },
                    runs: vec![StyledRun::plain("ls -la")],
                },
            ]
        );
    }

    #[test]
    fn code_fence_is_one_verbatim_run() {
        let doc = build_package(&scan("```\n* not a bullet *\n**x**\n```"));
        assert_eq!(
            doc.paragraphs[0].runs,
            vec![StyledRun::plain("* not a bullet *\n**x**")]
        );
    }

    #[test]
    fn ordered_sequences_restart() {
        assert_eq!(
            kinds("1. a\n2. b\n\nbetween\n\n5. c\n6. d\n- e\n3. f"),
            vec![
                ParagraphKind::ListItem(ListMarker::Ordered { sequence: 0, start: 1 }),
                ParagraphKind::ListItem(ListMarker::Ordered { sequence: 0, start: 1 }),
                ParagraphKind::Body,
                ParagraphKind::ListItem(ListMarker::Ordered { sequence: 1, start: 5 }),
                ParagraphKind::ListItem(ListMarker::Ordered { sequence: 1, start: 5 }),
                ParagraphKind::ListItem(ListMarker::Bullet),
                ParagraphKind::ListItem(ListMarker::Ordered { sequence: 2, start: 3 }),
            ]
        );
    }

    #[test]
    fn blank_lines_split_ordered_sequences() {
        assert_eq!(
            kinds("1. a\n\n1. b"),
            vec![
                ParagraphKind::ListItem(ListMarker::Ordered { sequence: 0, start: 1 }),
                ParagraphKind::ListItem(ListMarker::Ordered { sequence: 1, start: 1 }),
            ]
        );
    }

    #[test]
    fn xml_illegal_characters_are_removed() {
        assert!(matches!(xml_text("plain\ttext"), Cow::Borrowed("plain\ttext")));
        assert_eq!(xml_text("page one\u{c}page two \u{1}end\u{ffff}"), "page one page two end");
        assert_eq!(xml_text("a\u{b}b\u{0}"), "a b");
    }

    #[test]
    fn empty_document_is_a_zip_package() {
        let bytes = write_package(&PackageDocument::default(), StyleSheet::compiled_default())
            .expect("empty package writes");
        assert!(bytes.starts_with(b"PK"));
    }
}
