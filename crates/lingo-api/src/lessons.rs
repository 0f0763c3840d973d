//! Handler for the lesson completion endpoint.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/lesson/complete` | Body: `{"walletAddress":"...","lessonId":"..."}` |

use axum::{Json, extract::State};
use chrono::Utc;
use lingo_core::{engine, store::LearnStore, view::CompletionOutcome};
use serde::Deserialize;

use crate::{AppState, Envelope, data, error::ApiError};

/// JSON body accepted by `POST /lesson/complete`.
///
/// Both fields are optional at the serde layer so a missing one answers
/// 400 with the field-naming message instead of axum's 422.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteBody {
  pub wallet_address: Option<String>,
  pub lesson_id:      Option<String>,
}

/// `POST /lesson/complete` — awards XP, updates streak and achievements.
///
/// Answers 404 for an unknown lesson and 400 for a repeat completion.
pub async fn complete<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<CompleteBody>,
) -> Result<Json<Envelope<CompletionOutcome>>, ApiError>
where
  S: LearnStore,
{
  let (wallet, lesson_id) = match (&body.wallet_address, &body.lesson_id) {
    (Some(w), Some(l)) if !w.is_empty() && !l.is_empty() => {
      (w.as_str(), l.as_str())
    }
    _ => {
      return Err(ApiError::BadRequest(
        "Missing required fields: walletAddress and lessonId".to_owned(),
      ));
    }
  };

  let outcome = engine::complete_lesson(
    state.store.as_ref(),
    state.achievements,
    wallet,
    lesson_id,
    Utc::now(),
  )
  .await?;

  tracing::info!(
    wallet,
    lesson = lesson_id,
    xp = outcome.xp_earned,
    "lesson completed"
  );

  Ok(data(outcome))
}
