//! JSON REST API for CryptoLingo.
//!
//! Exposes an axum [`Router`] backed by any [`lingo_core::store::LearnStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! Every success body is wrapped in `{"data": ...}` and every failure in
//! `{"error": "..."}`; see [`Envelope`] and [`ApiError`].
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", lingo_api::api_router(state))
//! ```

pub mod error;
pub mod lessons;
pub mod paths;
pub mod users;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post},
};
use lingo_core::{
  achievement::{self, AchievementDef},
  store::LearnStore,
};
use serde::Serialize;

pub use error::ApiError;

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared handler state: the store plus the badge registry handlers
/// evaluate against.
#[derive(Clone)]
pub struct AppState<S> {
  pub store:        Arc<S>,
  pub achievements: &'static [AchievementDef],
}

impl<S> AppState<S> {
  /// State with the standard badge registry.
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      achievements: achievement::DEFAULT_ACHIEVEMENTS,
    }
  }
}

// ─── Envelope ────────────────────────────────────────────────────────────────

/// Success envelope: every 2xx body is `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
  pub data: T,
}

/// Wrap `value` in the success envelope.
pub fn data<T: Serialize>(value: T) -> Json<Envelope<T>> {
  Json(Envelope { data: value })
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: LearnStore + Clone + 'static,
{
  Router::new()
    // Learning paths
    .route("/learning-paths", get(paths::list::<S>))
    .route("/learning-paths/{id}", get(paths::get_one::<S>))
    // Lessons
    .route("/lesson/complete", post(lessons::complete::<S>))
    // Users
    .route("/user/{wallet}/progress", get(users::progress::<S>))
    .with_state(state)
}
