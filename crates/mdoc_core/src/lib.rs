mod block;
mod docx;
mod error;
mod inline;
mod pdf;
mod render;
mod scanner;
mod style;
mod typst;

pub use block::{Block, RunStyle, StyledRun, ordinals};
pub use docx::{
    DocxRenderer, ListMarker, PackageDocument, PackageParagraph, ParagraphKind, build_package,
    write_package,
};
pub use error::{RenderError, UnknownFormat};
pub use inline::{format_inline, plain_text};
pub use pdf::PdfRenderer;
pub use render::{
    OutputFormat, RenderedDocument, Renderer, render, render_with_style, renderer_for,
};
pub use scanner::scan;
pub use style::{ElementStyle, FontStyle, ListStyle, PageStyle, RuleStyle, StyleSheet};

/// Convert markdown to Typst markup using the compiled-in style sheet.
pub fn markdown_to_typst(markdown: &str) -> String {
    markdown_to_typst_with_style(markdown, StyleSheet::compiled_default())
}

/// Convert markdown to Typst markup with an explicit style sheet.
pub fn markdown_to_typst_with_style(markdown: &str, style: &StyleSheet) -> String {
    typst::blocks_to_typst(&scan(markdown), style)
}
