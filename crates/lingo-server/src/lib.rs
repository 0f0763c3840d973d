//! CryptoLingo server assembly: configuration, router and curriculum
//! seeding.
//!
//! The JSON API itself lives in [`lingo_api`]; this crate mounts it under
//! `/api`, adds request tracing, and owns everything operational.

pub mod seed;

use std::path::PathBuf;

use axum::Router;
use lingo_api::AppState;
use lingo_core::store::LearnStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `lingo.toml`.
///
/// Every field has a default, so the server runs without a config file.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String {
  "127.0.0.1".to_owned()
}

fn default_port() -> u16 {
  8787
}

fn default_store_path() -> PathBuf {
  PathBuf::from("lingo.db")
}

impl ServerConfig {
  /// Store path with a leading `~` expanded to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf {
    let s = self.store_path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/")
      && let Ok(home) = std::env::var("HOME")
    {
      return PathBuf::from(home).join(rest);
    }
    self.store_path.clone()
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Assemble the application router: the JSON API under `/api`, with
/// request tracing on every route.
pub fn app<S>(state: AppState<S>) -> Router
where
  S: LearnStore + Clone + 'static,
{
  Router::new()
    .nest("/api", lingo_api::api_router(state))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
