use std::fmt::Write;

use crate::block::{Block, StyledRun, ordinals};
use crate::inline::format_inline;
use crate::style::{ElementStyle, StyleSheet};

/// Convert blocks to Typst markup
pub fn blocks_to_typst(blocks: &[Block], style: &StyleSheet) -> String {
    let mut out = String::new();
    emit_preamble(style, &mut out);

    for (block, ordinal) in blocks.iter().zip(ordinals(blocks)) {
        emit_block(block, ordinal, style, &mut out);
    }

    out
}

fn emit_preamble(style: &StyleSheet, out: &mut String) {
    let page = &style.page;
    let body = &style.paragraph;

    let _ = writeln!(
        out,
        "#set page(width: {}pt, height: {}pt, margin: (top: {}pt, bottom: {}pt, left: {}pt, right: {}pt))",
        page.width,
        page.height,
        page.margin_top,
        page.margin_bottom,
        page.margin_left,
        page.margin_right
    );
    out.push_str("#set text(font: ");
    push_str_literal(&style.fonts.pdf_body, out);
    let _ = writeln!(out, ", size: {}pt, fill: {})", body.size, color(&body.color));
    out.push_str("#set par(linebreaks: \"optimized\")\n");

    out.push_str("#show raw: set text(font: ");
    push_str_literal(&style.fonts.pdf_mono, out);
    out.push_str(")\n");
    let _ = writeln!(
        out,
        "#show raw.where(block: true): set text(size: {}pt)",
        style.code_block.size
    );
    let _ = writeln!(
        out,
        "#show raw.where(block: false): set text(size: {}pt)",
        style.inline_code.size
    );

    // Keep headings with the block that follows them
    out.push_str("#show heading: set block(sticky: true)\n");
    for level in 1..=3u8 {
        let heading = style.heading(level);
        let _ = writeln!(
            out,
            "#show heading.where(level: {level}): set text(size: {}pt, fill: {}, weight: \"{}\", style: \"{}\")",
            heading.size,
            color(&heading.color),
            weight(heading),
            slant(heading)
        );
        let _ = writeln!(
            out,
            "#show heading.where(level: {level}): set block(above: {}pt, below: {}pt)",
            heading.space_before, heading.space_after
        );
    }
    out.push('\n');
}

fn emit_block(block: &Block, ordinal: Option<u32>, style: &StyleSheet, out: &mut String) {
    match block {
        Block::Heading { level, text } => {
            let _ = write!(out, "#heading(level: {level})[");
            push_runs(&format_inline(text), style, out);
            out.push_str("]\n\n");
        }
        Block::Paragraph { text } => {
            let element = &style.paragraph;
            open_spaced_block(element, out);
            let _ = write!(out, "#par(justify: {})[", element.justify);
            push_text_open(element, out);
            push_runs(&format_inline(text), style, out);
            out.push_str("]]]\n\n");
        }
        Block::CodeFence { text, .. } => {
            // Never split a code block across pages
            let element = &style.code_block;
            let _ = write!(
                out,
                "#block(breakable: false, width: 100%, above: {}pt, below: {}pt)[#pad(left: {}pt, block(width: 100%, inset: {}pt",
                element.space_before, element.space_after, element.indent, element.padding
            );
            push_decorations(element, out);
            out.push_str(")[#raw(");
            push_str_literal(text, out);
            out.push_str(", block: true)])]\n\n");
        }
        Block::ListItem { ordered, text, .. } => {
            let element = &style.list_item;
            let marker = if *ordered {
                format!("{}.", ordinal.unwrap_or(1))
            } else {
                style.list.bullet.clone()
            };
            open_spaced_block(element, out);
            let _ = write!(
                out,
                "#pad(left: {}pt, grid(columns: ({}pt, 1fr), [",
                element.indent, style.list.marker_width
            );
            push_text_open(element, out);
            out.push('#');
            push_str_literal(&marker, out);
            out.push_str("]], [");
            push_text_open(element, out);
            push_runs(&format_inline(text), style, out);
            out.push_str("]]))]\n\n");
        }
        Block::Blockquote { text } => {
            let element = &style.blockquote;
            open_spaced_block(element, out);
            let _ = write!(
                out,
                "#pad(left: {}pt, right: {}pt, block(width: 100%, inset: (left: {}pt, y: 2pt)",
                element.indent, element.indent, element.padding
            );
            push_decorations(element, out);
            out.push_str(")[");
            push_text_open(element, out);
            push_runs(&format_inline(text), style, out);
            out.push_str("]]))]\n\n");
        }
        Block::Blank => {}
    }
}

/// `#block(above: .., below: .., width: 100%)[` for an element.
fn open_spaced_block(element: &ElementStyle, out: &mut String) {
    let _ = write!(
        out,
        "#block(above: {}pt, below: {}pt, width: 100%)[",
        element.space_before, element.space_after
    );
}

/// `#text(..)[` carrying an element's size, colour, weight and slant.
fn push_text_open(element: &ElementStyle, out: &mut String) {
    let _ = write!(
        out,
        "#text(size: {}pt, fill: {}, weight: \"{}\", style: \"{}\")[",
        element.size,
        color(&element.color),
        weight(element),
        slant(element)
    );
}

/// Background fill and left rule arguments, each with a leading comma.
fn push_decorations(element: &ElementStyle, out: &mut String) {
    if let Some(background) = &element.background {
        let _ = write!(out, ", fill: {}", color(background));
    }
    if let Some(rule) = &element.rule {
        let _ = write!(out, ", stroke: (left: {}pt + {})", rule.width, color(&rule.color));
    }
}

fn push_runs(runs: &[StyledRun], style: &StyleSheet, out: &mut String) {
    for run in runs {
        for (i, line) in run.text.split('\n').enumerate() {
            if i > 0 {
                out.push_str("#linebreak()");
            }
            if !line.is_empty() {
                out.push('#');
                push_run_expr(line, run, style, out);
            }
        }
    }
}

fn push_run_expr(text: &str, run: &StyledRun, style: &StyleSheet, out: &mut String) {
    let mut expr = String::new();
    if run.style.code {
        expr.push_str("box(inset: (x: 2pt), outset: (y: 2pt)");
        if let Some(background) = &style.inline_code.background {
            let _ = write!(expr, ", fill: {}", color(background));
        }
        expr.push_str(", raw(");
        push_str_literal(text, &mut expr);
        expr.push_str("))");
    } else {
        push_str_literal(text, &mut expr);
    }
    if run.style.bold {
        expr = format!("text(weight: \"bold\", {expr})");
    }
    if run.style.italic {
        expr = format!("text(style: \"italic\", {expr})");
    }
    out.push_str(&expr);
}

/// Write `text` as a Typst string literal, so no markup in it is ever interpreted.
fn push_str_literal(text: &str, out: &mut String) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    out.push('"');
}

fn color(hex: &str) -> String {
    let mut out = String::from("rgb(");
    if hex.starts_with('#') {
        push_str_literal(hex, &mut out);
    } else {
        push_str_literal(&format!("#{hex}"), &mut out);
    }
    out.push(')');
    out
}

fn weight(element: &ElementStyle) -> &'static str {
    if element.bold { "bold" } else { "regular" }
}

fn slant(element: &ElementStyle) -> &'static str {
    if element.italic { "italic" } else { "normal" }
}

#[cfg(test)]
mod tests {
    use crate::markdown_to_typst;

    fn body(markdown: &str) -> String {
        let out = markdown_to_typst(markdown);
        let (_, body) = out
            .split_once("\n\n")
            .expect("preamble is separated by a blank line");
        body.to_string()
    }

    const PARA_OPEN: &str = "#block(above: 0pt, below: 12pt, width: 100%)[#par(justify: true)[#text(size: 11pt, fill: rgb(\"#000000\"), weight: \"regular\", style: \"normal\")[";

    #[test]
    fn preamble_carries_page_and_fonts() {
        let out = markdown_to_typst("");
        assert!(out.starts_with(
            "#set page(width: 595.28pt, height: 841.89pt, margin: (top: 72pt, bottom: 72pt, left: 72pt, right: 72pt))\n"
        ));
        assert!(out.contains("#set text(font: \"Libertinus Serif\", size: 11pt"));
        assert!(out.contains("#show raw: set text(font: \"DejaVu Sans Mono\")"));
        assert!(out.contains(
            "#show heading.where(level: 1): set text(size: 24pt, fill: rgb(\"#2c3e50\"), weight: \"bold\", style: \"normal\")"
        ));
        assert_eq!(body(""), "");
    }

    #[test]
    fn heading() {
        assert_eq!(body("## Hello"), "#heading(level: 2)[#\"Hello\"]\n\n");
    }

    #[test]
    fn deep_heading_is_paragraph_text() {
        assert_eq!(body("#### Deep"), format!("{PARA_OPEN}#\"#### Deep\"]]]\n\n"));
    }

    #[test]
    fn paragraph_runs() {
        assert_eq!(
            body("**bold** and *italic* and `code`"),
            format!(
                "{PARA_OPEN}#text(weight: \"bold\", \"bold\")#\" and \"#text(style: \"italic\", \"italic\")#\" and \"#box(inset: (x: 2pt), outset: (y: 2pt), fill: rgb(\"#f8f9fa\"), raw(\"code\"))]]]\n\n"
            )
        );
    }

    #[test]
    fn escapes_string_literals() {
        assert_eq!(
            body("say \"hi\" \\ #tag"),
            format!("{PARA_OPEN}#\"say \\\"hi\\\" \\\\ #tag\"]]]\n\n")
        );
    }

    #[test]
    fn code_block_is_unbreakable_and_verbatim() {
        let out = body("```rust\nlet x = \"a\";\n* not a bullet *\n```");
        assert!(out.starts_with("#block(breakable: false, width: 100%, above: 0pt, below: 12pt)"));
        assert!(out.contains("stroke: (left: 1pt + rgb(\"#3498db\"))"));
        assert!(out.contains("#raw(\"let x = \\\"a\\\";\\n* not a bullet *\", block: true)"));
        assert!(!out.contains("italic"));
    }

    #[test]
    fn unordered_list_uses_bullet() {
        let out = body("- one");
        assert!(out.contains("grid(columns: (18pt, 1fr), ["));
        assert!(out.contains("#\"•\"]], ["));
        assert!(out.contains("#\"one\"]]))]"));
    }

    #[test]
    fn ordered_lists_restart_at_literal_index() {
        let out = body("1. a\n2. b\n\nbreak\n\n5. c\n9. d");
        let markers: Vec<&str> = ["#\"1.\"", "#\"2.\"", "#\"5.\"", "#\"6.\""]
            .into_iter()
            .filter(|m| out.contains(m))
            .collect();
        assert_eq!(markers.len(), 4);
        assert!(!out.contains("#\"3.\""));
        assert!(!out.contains("#\"9.\""));
    }

    #[test]
    fn blockquote_keeps_line_breaks() {
        let out = body("> first\n> *second*");
        assert!(out.contains("stroke: (left: 2pt + rgb(\"#3498db\"))"));
        assert!(out.contains("weight: \"regular\", style: \"italic\")["));
        assert!(out.contains("#\"first\"#linebreak()#text(style: \"italic\", \"second\")"));
    }

    #[test]
    fn blank_blocks_emit_nothing() {
        assert_eq!(body("a\n\n\n\nb"), format!("{PARA_OPEN}#\"a\"]]]\n\n{PARA_OPEN}#\"b\"]]]\n\n"));
    }
}
