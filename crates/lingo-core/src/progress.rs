//! Progress records — the user/lesson join, one row per pair.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One user's relationship to one lesson. The store enforces at most one row
/// per `(wallet, lesson_id)` pair; retries update the row in place.
#[derive(Debug, Clone)]
pub struct ProgressRecord {
  pub progress_id:  Uuid,
  pub wallet:       String,
  pub lesson_id:    String,
  pub completed:    bool,
  /// Set when `completed` flips to true.
  pub completed_at: Option<DateTime<Utc>>,
  /// Reward captured at completion time. A historical snapshot — never
  /// recomputed if the lesson's reward changes later.
  pub xp_earned:    u32,
}

/// Input to [`crate::store::LearnStore::commit_completion`]: the fully
/// computed post-completion state. The engine supplies `now` so the user row
/// and the progress row agree on the same instant.
#[derive(Debug, Clone)]
pub struct CompletionWrite {
  pub wallet:       String,
  pub lesson_id:    String,
  pub xp_earned:    u32,
  pub new_total_xp: u32,
  pub new_level:    u32,
  pub new_streak:   u32,
  pub now:          DateTime<Utc>,
}
