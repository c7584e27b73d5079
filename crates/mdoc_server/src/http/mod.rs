//! Routes of the conversion service.

pub mod convert;
pub mod error;

use axum::Json;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{Method, Uri};
use axum::routing::{get, post};
use serde_json::{Value, json};

use self::error::ApiError;

/// Build the service router. Bodies above `max_body_bytes` are answered with 413.
pub fn build_router(max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/verificar", get(health))
        .route("/converter-markdown-pdf", post(convert::markdown_pdf))
        .route("/converter-markdown-pdf-base64", post(convert::markdown_pdf_base64))
        .route("/converter-markdown-docx", post(convert::markdown_docx))
        .route("/converter-markdown-docx-base64", post(convert::markdown_docx_base64))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::not_found(format!("Rota não encontrada: {method} {}", uri.path()))
}
