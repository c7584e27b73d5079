use clap::Parser;
use mdoc_server::{ServerConfig, ServerError, build_router, telemetry};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let config = ServerConfig::parse();
    telemetry::init(&config)?;

    let router = build_router(config.max_body_bytes);
    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.bind,
            source,
        })?;

    info!(addr = %config.bind, max_body_bytes = config.max_body_bytes, "listening");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
