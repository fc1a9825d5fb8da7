//! Quiz Sessions Server
//!
//! Entry point for the quiz session tracker.

use std::sync::Arc;

use anyhow::Context;
use mimalloc::MiMalloc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use quiz_sessions::config::AppConfig;
use quiz_sessions::server;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (M-LOG-STRUCTURED)
    // LOG_FORMAT=json switches to machine-readable output
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with((!json).then(|| fmt::layer().with_target(true)))
        .with(json.then(|| fmt::layer().json().with_target(true)))
        .init();

    // Load .env (if present)
    let _ = dotenvy::dotenv();

    let config = AppConfig::load().context("Configuration error")?;

    server::start_server(Arc::new(config)).await
}
