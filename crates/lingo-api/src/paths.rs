//! Handlers for `/learning-paths` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/learning-paths` | Optional `?wallet=` adds per-path progress |
//! | `GET`  | `/learning-paths/:id` | Optional `?wallet=` adds per-lesson state; 404 if not found |

use axum::{
  Json,
  extract::{Path, Query, State},
  response::{IntoResponse, Response},
};
use lingo_core::{engine, store::LearnStore, view::PathOverview};
use serde::Deserialize;

use crate::{AppState, Envelope, data, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct WalletParam {
  pub wallet: Option<String>,
}

impl WalletParam {
  /// An empty `?wallet=` counts as absent.
  fn normalized(&self) -> Option<&str> {
    self.wallet.as_deref().filter(|w| !w.is_empty())
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /learning-paths[?wallet=<address>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<WalletParam>,
) -> Result<Json<Envelope<Vec<PathOverview>>>, ApiError>
where
  S: LearnStore,
{
  let overviews =
    engine::paths_overview(state.store.as_ref(), params.normalized()).await?;
  Ok(data(overviews))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /learning-paths/:id[?wallet=<address>]`
///
/// With a wallet each lesson carries completion and lock state; without
/// one the path is returned as authored.
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  Query(params): Query<WalletParam>,
) -> Result<Response, ApiError>
where
  S: LearnStore,
{
  let store = state.store.as_ref();
  match params.normalized() {
    Some(wallet) => {
      let view = engine::path_view(store, &id, wallet).await?;
      Ok(data(view).into_response())
    }
    None => {
      let detail = engine::path_detail(store, &id).await?;
      Ok(data(detail).into_response())
    }
  }
}
