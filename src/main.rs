//! AlgoQuest · Codeforces problem backend
//!
//! - Axum HTTP API serving topic/difficulty-filtered Codeforces problems
//! - Live per-tag fetch, cached full dump, and a static snapshot as fallbacks
//!
//! Important env variables:
//!   PORT             : u16 (default 5000)
//!   ALGOQUEST_CONFIG : path to TOML config (hosts, budgets, TTLs, defaults)
//!   CF_TIMEOUT       : per-attempt upstream timeout in ms (default 25000)
//!   CF_HOSTS         : comma-separated upstream base URLs
//!   SNAPSHOT_PATH    : snapshot artifact (default data/cf_snapshot.min.json)
//!   CORS_ORIGIN      : allowed browser origin
//!   LOG_LEVEL        : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT       : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};

use tokio::net::TcpListener;
use tracing::info;

use algoquest_backend::config::ServiceConfig;
use algoquest_backend::routes::build_router;
use algoquest_backend::state::AppState;
use algoquest_backend::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let cfg = ServiceConfig::load_from_env();
  let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));

  // Caches, upstream client and snapshot are built once and shared.
  let state = Arc::new(AppState::new(cfg)?);
  let app = build_router(state);

  let listener = TcpListener::bind(addr).await?;
  info!(target: "algoquest_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "algoquest_backend", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "algoquest_backend", error = %e, "Failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  info!(target: "algoquest_backend", "Shutdown requested");
}
