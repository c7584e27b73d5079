use typst_as_lib::TypstEngine;
use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_library::layout::PagedDocument;
use typst_pdf::PdfOptions;

use crate::block::Block;
use crate::error::RenderError;
use crate::render::{OutputFormat, Renderer};
use crate::style::StyleSheet;
use crate::typst::blocks_to_typst;

/// Paints blocks onto pages through the Typst layout engine.
///
/// Typst flows content down a single cursor and breaks pages automatically;
/// code fences are emitted as unbreakable blocks so they move whole to the
/// next page when they do not fit.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfRenderer;

impl Renderer for PdfRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Pdf
    }

    fn render(&self, blocks: &[Block], style: &StyleSheet) -> Result<Vec<u8>, RenderError> {
        let doc = compile_document(blocks_to_typst(blocks, style))?;
        tracing::trace!(pages = doc.pages.len(), "typst layout finished");

        typst_pdf::pdf(&doc, &PdfOptions::default()).map_err(|e| {
            RenderError::document_build(OutputFormat::Pdf, format!("PDF export failed: {:?}", e))
        })
    }
}

/// Compile Typst markup to a paged document.
fn compile_document(markup: String) -> Result<PagedDocument, RenderError> {
    // Embedded fonts only, so output does not depend on the host
    let font_options = TypstKitFontOptions::new()
        .include_embedded_fonts(true)
        .include_system_fonts(false);

    let engine = TypstEngine::builder()
        .main_file(markup)
        .search_fonts_with(font_options)
        .build();

    let doc: PagedDocument = engine.compile().output.map_err(|e| {
        RenderError::document_build(
            OutputFormat::Pdf,
            format!("Typst compilation failed: {:?}", e),
        )
    })?;

    Ok(doc)
}
