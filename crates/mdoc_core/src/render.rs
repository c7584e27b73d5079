use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::block::Block;
use crate::docx::DocxRenderer;
use crate::error::{RenderError, UnknownFormat};
use crate::pdf::PdfRenderer;
use crate::scanner::scan;
use crate::style::StyleSheet;

/// Target document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Pdf,
    Docx,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Pdf, OutputFormat::Docx];

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Docx => "docx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "application/pdf",
            OutputFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Filename suggested when the caller supplies none.
    pub fn default_filename(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "documento.pdf",
            OutputFormat::Docx => "documento.docx",
        }
    }

    /// Requested filename with this format's extension, safe to quote in a header.
    ///
    /// Blank or missing names fall back to [`OutputFormat::default_filename`].
    pub fn filename_for(self, requested: Option<&str>) -> String {
        let requested = requested
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.default_filename());

        let mut name: String = requested
            .chars()
            .map(|c| {
                if c == '"' || c == '\\' || c.is_control() {
                    '_'
                } else {
                    c
                }
            })
            .collect();

        let suffix = format!(".{}", self.extension());
        if !name.to_ascii_lowercase().ends_with(&suffix) {
            name.push_str(&suffix);
        }
        name
    }

    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()?.to_str()?.parse().ok()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "docx" => Ok(OutputFormat::Docx),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// Finished output of one conversion, owned by the caller.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    /// Suggested filename
    pub filename: String,
}

impl RenderedDocument {
    /// Rename the document after a caller-supplied name.
    pub fn named(mut self, requested: Option<&str>) -> Self {
        self.filename = self.format.filename_for(requested);
        self
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Turns scanned blocks into a finished document buffer.
///
/// Implementations either return the complete buffer or an error; they never
/// hand back partial output.
pub trait Renderer: Send + Sync {
    fn format(&self) -> OutputFormat;

    fn render(&self, blocks: &[Block], style: &StyleSheet) -> Result<Vec<u8>, RenderError>;
}

/// The renderer for a format.
pub fn renderer_for(format: OutputFormat) -> &'static dyn Renderer {
    match format {
        OutputFormat::Pdf => &PdfRenderer,
        OutputFormat::Docx => &DocxRenderer,
    }
}

/// Convert markdown to a document using the compiled-in style sheet.
pub fn render(markdown: &str, format: OutputFormat) -> Result<RenderedDocument, RenderError> {
    render_with_style(markdown, format, StyleSheet::compiled_default())
}

/// Convert markdown to a document with an explicit style sheet.
///
/// Empty input is accepted and produces an empty document.
#[tracing::instrument(level = "debug", skip_all, fields(%format, input_len = markdown.len()))]
pub fn render_with_style(
    markdown: &str,
    format: OutputFormat,
    style: &StyleSheet,
) -> Result<RenderedDocument, RenderError> {
    debug!(phase = "scanning");
    let blocks = scan(markdown);

    debug!(phase = "rendering", blocks = blocks.len());
    let bytes = renderer_for(format)
        .render(&blocks, style)
        .and_then(|bytes| {
            if bytes.is_empty() {
                Err(RenderError::document_build(
                    format,
                    "renderer produced an empty buffer",
                ))
            } else {
                Ok(bytes)
            }
        })
        .inspect_err(|err| warn!(phase = "failed", error = %err))?;

    debug!(phase = "done", output_len = bytes.len());
    Ok(RenderedDocument {
        bytes,
        format,
        filename: format.default_filename().to_string(),
    })
}
