//! Handler for the user profile endpoint.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/user/:wallet/progress` | XP, level, streak, badges, recent activity |

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::Utc;
use lingo_core::{engine, store::LearnStore, view::UserProgressView};

use crate::{AppState, Envelope, data, error::ApiError};

/// `GET /user/:wallet/progress`
///
/// Creates the user row on first sight, so a brand-new wallet sees level 1,
/// zero XP and every badge locked rather than a 404.
pub async fn progress<S>(
  State(state): State<AppState<S>>,
  Path(wallet): Path<String>,
) -> Result<Json<Envelope<UserProgressView>>, ApiError>
where
  S: LearnStore,
{
  let view = engine::user_progress_view(
    state.store.as_ref(),
    state.achievements,
    &wallet,
    Utc::now(),
  )
  .await?;
  Ok(data(view))
}
