//! CodePatternMaster backend
//!
//! - Axum HTTP API over a built-in catalog of ASCII-art code patterns
//! - Output simulation, rubric feedback, templates and pattern analyses
//! - Optional hosted model (Hugging Face Inference API) and progress store
//!   (Supabase/PostgREST), each degrading to local behavior when absent
//!
//! Important env variables:
//!   PORT                     : u16 (default 8000)
//!   HF_API_TOKEN             : enables the hosted model if present
//!   HF_BASE_URL              : default "https://api-inference.huggingface.co"
//!   SUPABASE_URL             : progress store base URL
//!   SUPABASE_ANON_KEY        : progress store key (both needed to enable it)
//!   CODEPATTERN_CONFIG_PATH  : path to TOML config (CORS, execution, model)
//!   LOG_LEVEL                : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT               : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod catalog;
mod templates;
mod simulator;
mod scorer;
mod analysis;
mod tutor;
mod runner;
mod model;
mod analyzer;
mod store;
mod error;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

use crate::routes::build_router;
use crate::state::AppState;

const DEFAULT_PORT: u16 = 8000;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (catalog, config, optional clients).
  let state = Arc::new(AppState::new());

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "codepattern", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "codepattern", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(target: "codepattern", error = %e, "Failed to listen for Ctrl-C; running until killed");
    std::future::pending::<()>().await;
  }
  info!(target: "codepattern", "Shutdown signal received");
}
