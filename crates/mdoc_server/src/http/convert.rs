use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mdoc_core::{OutputFormat, RenderedDocument};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::{ApiError, messages};

type Payload = Result<Json<ConvertRequest>, JsonRejection>;

#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    pub texto_markdown: Option<String>,
    pub nome_arquivo: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Base64Response {
    pub status: &'static str,
    pub nome_arquivo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docx_base64: Option<String>,
    /// Byte length of the decoded document
    pub tamanho: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Attachment,
    Base64,
}

pub async fn markdown_pdf(payload: Payload) -> Result<Response, ApiError> {
    convert(OutputFormat::Pdf, Delivery::Attachment, payload).await
}

pub async fn markdown_pdf_base64(payload: Payload) -> Result<Response, ApiError> {
    convert(OutputFormat::Pdf, Delivery::Base64, payload).await
}

pub async fn markdown_docx(payload: Payload) -> Result<Response, ApiError> {
    convert(OutputFormat::Docx, Delivery::Attachment, payload).await
}

pub async fn markdown_docx_base64(payload: Payload) -> Result<Response, ApiError> {
    convert(OutputFormat::Docx, Delivery::Base64, payload).await
}

#[tracing::instrument(level = "info", skip_all, fields(%format, ?delivery))]
async fn convert(
    format: OutputFormat,
    delivery: Delivery,
    payload: Payload,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(reject_payload)?;

    let markdown = request
        .texto_markdown
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request(messages::MISSING_TEXT))?;
    info!(input_len = markdown.len(), "conversion started");

    let doc = tokio::task::spawn_blocking(move || mdoc_core::render(&markdown, format))
        .await
        .map_err(|err| ApiError::internal(format!("conversion task failed: {err}")))??
        .named(request.nome_arquivo.as_deref());
    info!(filename = %doc.filename, output_len = doc.len(), "conversion finished");

    match delivery {
        Delivery::Attachment => attachment(doc),
        Delivery::Base64 => Ok(Json(base64_body(doc)).into_response()),
    }
}

fn reject_payload(rejection: JsonRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, messages::BODY_TOO_LARGE)
    } else {
        tracing::debug!(error = %rejection.body_text(), "invalid request body");
        ApiError::bad_request(messages::INVALID_JSON)
    }
}

fn attachment(doc: RenderedDocument) -> Result<Response, ApiError> {
    let disposition = HeaderValue::from_str(&content_disposition(&doc.filename))
        .map_err(|err| ApiError::internal(format!("invalid filename header: {err}")))?;
    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static(doc.mime_type())),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    Ok((headers, doc.bytes).into_response())
}

fn base64_body(doc: RenderedDocument) -> Base64Response {
    let tamanho = doc.len();
    let encoded = STANDARD.encode(&doc.bytes);
    let (pdf_base64, docx_base64) = match doc.format {
        OutputFormat::Pdf => (Some(encoded), None),
        OutputFormat::Docx => (None, Some(encoded)),
    };
    Base64Response {
        status: "sucesso",
        nome_arquivo: doc.filename,
        pdf_base64,
        docx_base64,
        tamanho,
    }
}

/// `attachment` disposition; non-ASCII names also get an RFC 5987 `filename*`.
fn content_disposition(filename: &str) -> String {
    if filename.is_ascii() {
        return format!("attachment; filename=\"{filename}\"");
    }

    let fallback: String = filename
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();
    let mut encoded = String::with_capacity(filename.len() * 3);
    for byte in filename.bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}
