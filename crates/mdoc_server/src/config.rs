use std::net::SocketAddr;

use clap::{Parser, ValueEnum};
use tracing_subscriber::filter::LevelFilter;

pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Runtime settings for `mdoc-server`, read from flags or the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "mdoc-server")]
#[command(about = "HTTP service converting Markdown to PDF or DOCX")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "MDOC_BIND", default_value = "0.0.0.0:9000")]
    pub bind: SocketAddr,

    /// Largest accepted request body, in bytes
    #[arg(long, env = "MDOC_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    #[arg(long, env = "MDOC_LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    /// Default log level when RUST_LOG is unset
    #[arg(long, env = "MDOC_LOG_LEVEL", default_value = "info")]
    pub log_level: LevelFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}
