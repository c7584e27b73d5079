use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub mod messages {
    pub const INVALID_JSON: &str = "Requisição deve conter JSON válido";
    pub const MISSING_TEXT: &str = "Campo 'texto_markdown' é obrigatório e não pode estar vazio";
    pub const BODY_TOO_LARGE: &str = "Requisição excede o tamanho máximo permitido";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub status: &'static str,
    pub mensagem: String,
}

/// Error answered to the client as `{"status": "erro", "mensagem": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Erro interno: {}", message.into()),
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<mdoc_core::RenderError> for ApiError {
    fn from(err: mdoc_core::RenderError) -> Self {
        Self::internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, message = %self.message, "request failed");
        } else {
            tracing::debug!(status = %self.status, message = %self.message, "request rejected");
        }

        let body = ApiErrorBody {
            status: "erro",
            mensagem: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
