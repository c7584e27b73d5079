use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use axum::response::Response;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mdoc_server::build_router;
use serde_json::{Value, json};
use tower::ServiceExt;

const LIMIT: usize = 64 * 1024;

fn app() -> Router {
    build_router(LIMIT)
}

fn post_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .expect("request should build")
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("router should respond")
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    serde_json::from_slice(&bytes).expect("body should be json")
}

#[tokio::test]
async fn health_check_routes() {
    for uri in ["/", "/verificar"] {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request should build");
        let response = send(app(), request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "status": "ok" }));
    }
}

#[tokio::test]
async fn unknown_route_is_reported() {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/nada?x=1")
        .body(Body::empty())
        .expect("request should build");
    let response = send(app(), request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(response).await,
        json!({ "status": "erro", "mensagem": "Rota não encontrada: DELETE /nada" })
    );
}

#[tokio::test]
async fn pdf_download_has_headers() {
    let body = json!({ "texto_markdown": "# Olá\n\nMundo", "nome_arquivo": "relatorio" });
    let response = send(
        app(),
        post_json("/converter-markdown-pdf", body.to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"relatorio.pdf\""
    );
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn docx_download_uses_default_filename() {
    let body = json!({ "texto_markdown": "- um\n- dois" });
    let response = send(
        app(),
        post_json("/converter-markdown-docx", body.to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .ends_with("wordprocessingml.document")
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"documento.docx\""
    );
}

#[tokio::test]
async fn base64_payloads_report_exact_size() {
    for (uri, field, magic) in [
        ("/converter-markdown-pdf-base64", "pdf_base64", &b"%PDF"[..]),
        ("/converter-markdown-docx-base64", "docx_base64", &b"PK"[..]),
    ] {
        let body = json!({ "texto_markdown": "**negrito** e *itálico*", "nome_arquivo": "saida" });
        let response = send(app(), post_json(uri, body.to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let payload = json_body(response).await;
        assert_eq!(payload["status"], "sucesso");

        let decoded = STANDARD
            .decode(payload[field].as_str().expect("encoded document"))
            .expect("valid base64");
        assert!(decoded.starts_with(magic));
        assert_eq!(payload["tamanho"].as_u64(), Some(decoded.len() as u64));

        let extension = if field == "pdf_base64" { "pdf" } else { "docx" };
        assert_eq!(payload["nome_arquivo"], format!("saida.{extension}"));
    }
}

#[tokio::test]
async fn empty_text_is_rejected() {
    for body in [
        json!({}),
        json!({ "texto_markdown": "" }),
        json!({ "texto_markdown": "   \n\t" }),
        json!({ "texto_markdown": null }),
    ] {
        let response = send(
            app(),
            post_json("/converter-markdown-pdf-base64", body.to_string()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({
                "status": "erro",
                "mensagem": "Campo 'texto_markdown' é obrigatório e não pode estar vazio"
            })
        );
    }
}

#[tokio::test]
async fn invalid_json_is_rejected() {
    let response = send(app(), post_json("/converter-markdown-docx", "{not json")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["mensagem"],
        "Requisição deve conter JSON válido"
    );

    let request = Request::builder()
        .method(Method::POST)
        .uri("/converter-markdown-pdf")
        .body(Body::from("texto"))
        .expect("request should build");
    let response = send(app(), request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let body = json!({ "texto_markdown": "a".repeat(LIMIT * 2) });
    let response = send(
        app(),
        post_json("/converter-markdown-pdf", body.to_string()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json_body(response).await["status"], "erro");
}
