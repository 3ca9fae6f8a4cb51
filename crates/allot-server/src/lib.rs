//! HTTP host for the allot API.
//!
//! Nests [`allot_api::api_router`] under `/api` and wraps it in request
//! tracing. The binary in `main.rs` handles configuration and the listener.

use std::{path::PathBuf, sync::Arc};

use allot_core::store::AllotStore;
use axum::Router;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ALLOT_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub store_path:       PathBuf,
  pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:             "127.0.0.1".to_string(),
      port:             5240,
      store_path:       PathBuf::from("allot.db"),
      max_upload_bytes: allot_api::DEFAULT_UPLOAD_LIMIT,
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String {
    format!("{}:{}", self.host, self.port)
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn app<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: AllotStore + 'static,
{
  Router::new()
    .nest("/api", allot_api::api_router(store, config.max_upload_bytes))
    .layer(TraceLayer::new_for_http())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
