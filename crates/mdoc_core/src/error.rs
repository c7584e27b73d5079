use thiserror::Error;

use crate::render::OutputFormat;

/// Failure of a single conversion. Terminal for the call; nothing is retried.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Painting, compiling or packaging the output failed.
    #[error("failed to build {format} document: {detail}")]
    DocumentBuild { format: OutputFormat, detail: String },
}

impl RenderError {
    pub fn document_build(format: OutputFormat, detail: impl Into<String>) -> Self {
        Self::DocumentBuild {
            format,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown output format '{0}' (expected 'pdf' or 'docx')")]
pub struct UnknownFormat(pub String);
