pub mod config;
pub mod error;
pub mod http;
pub mod telemetry;

pub use config::{LogFormat, ServerConfig};
pub use error::ServerError;
pub use http::build_router;
