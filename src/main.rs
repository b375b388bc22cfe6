//! ==============================================================================
//! main.rs - rfid sink entry point
//! ==============================================================================
//!
//! purpose:
//!     a small http service that esp32 rfid readers post tag reads to. it
//!     keeps the latest reads in memory and serves them to a dashboard that
//!     polls every 2 seconds.
//!
//! responsibilities:
//!     - load configuration (config.rs)
//!     - set up logging
//!     - create the bounded history (event_log.rs)
//!     - serve the api + dashboard until ctrl-c (server.rs)
//!
//! architecture:
//!
//!     ┌──────────────┐  POST /api/rfid   ┌──────────────────────────────┐
//!     │ esp32 reader │ ────────────────► │        rfid-sink (this)      │
//!     └──────────────┘                   │  ┌────────┐   ┌───────────┐  │
//!                                        │  │ axum   │──►│ event log │  │
//!     ┌──────────────┐ GET /api/registros│  │ router │◄──│ (last 50) │  │
//!     │  dashboard   │ ◄──────────────── │  └────────┘   └───────────┘  │
//!     └──────────────┘                   └──────────────────────────────┘
//!
//!     nothing is persisted: a restart starts with an empty history.
//!
//! ==============================================================================

use anyhow::{Context, Result};
use rfid_sink::config::SinkConfig;
use rfid_sink::server::{self, AppState};
use rfid_sink::{netinfo, BoundedEventLog};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // step 1: load configuration
    let loaded = SinkConfig::load_or_default();
    let config = loaded.config;

    // step 2: logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(path) = &loaded.source {
        tracing::info!("[CONFIG] Loaded from {}", path.display());
    }
    for warning in &loaded.warnings {
        tracing::warn!("[CONFIG] {}", warning);
    }
    config.log_summary();

    // step 3: the shared history
    let log = BoundedEventLog::new(config.history.capacity);
    let state = AppState::new(log, config.logging.show_readings);

    // step 4: bind and serve
    let addr = config.server.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    print_banner(addr.port());

    server::run_server(listener, state, server::shutdown_signal())
        .await
        .context("web server error")?;

    tracing::info!("[SHUTDOWN] bye");
    Ok(())
}

fn print_banner(port: u16) {
    let ip = netinfo::local_ip();
    tracing::info!("===========================================================");
    tracing::info!("  RFID Monitor - server ready");
    tracing::info!("===========================================================");
    tracing::info!("  dashboard (local):   http://localhost:{}", port);
    tracing::info!("  dashboard (network): http://{}:{}", ip, port);
    tracing::info!("  esp32 endpoint:      http://{}:{}/api/rfid", ip, port);
    tracing::info!("  history api:         http://{}:{}/api/registros", ip, port);
    tracing::info!("  health check:        http://{}:{}/api/health", ip, port);
    tracing::info!("  example payload: {{\"uid_hex\": \"A1 B2 C3 D4\", \"uid_dec\": \"2717339292\"}}");
    tracing::info!("  waiting for rfid reads...");
}
