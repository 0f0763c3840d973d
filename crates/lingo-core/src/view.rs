//! Derived read models — computed on request, never stored.
//!
//! Everything here is assembled by the engine from catalog and progress
//! rows. These are the shapes the API serialises: path views flatten the
//! path's own fields to the top level, with lessons nested alongside.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
  lesson::Lesson, path::LearningPath, progression::PathProgress, user::User,
};

// ─── Lesson projections ──────────────────────────────────────────────────────

/// Catalog listing entry: lesson metadata without the quiz payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonOverview {
  #[serde(rename = "id")]
  pub lesson_id: String,
  pub title:     String,
  pub order:     u32,
  pub xp_reward: u32,
}

impl From<&Lesson> for LessonOverview {
  fn from(lesson: &Lesson) -> Self {
    Self {
      lesson_id: lesson.lesson_id.clone(),
      title:     lesson.title.clone(),
      order:     lesson.order,
      xp_reward: lesson.xp_reward,
    }
  }
}

/// A full lesson annotated with one user's standing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonWithState {
  #[serde(flatten)]
  pub lesson:    Lesson,
  pub completed: bool,
  /// Sequentially locked until the preceding lesson is completed.
  pub locked:    bool,
  /// XP snapshot from the progress row; 0 when no row exists.
  pub xp_earned: u32,
}

// ─── Path views ──────────────────────────────────────────────────────────────

/// Full path detail, no user annotations.
#[derive(Debug, Clone, Serialize)]
pub struct PathDetail {
  #[serde(flatten)]
  pub path:    LearningPath,
  pub lessons: Vec<Lesson>,
}

/// Full path detail annotated for one wallet.
#[derive(Debug, Clone, Serialize)]
pub struct PathView {
  #[serde(flatten)]
  pub path:    LearningPath,
  pub lessons: Vec<LessonWithState>,
}

/// Listing entry for the paths index.
#[derive(Debug, Clone, Serialize)]
pub struct PathOverview {
  #[serde(flatten)]
  pub path:     LearningPath,
  pub lessons:  Vec<LessonOverview>,
  /// Present when the request carried a wallet.
  #[serde(flatten)]
  pub progress: Option<PathProgress>,
}

// ─── Completion outcome ──────────────────────────────────────────────────────

/// What a successful lesson completion changed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOutcome {
  pub xp_earned:    u32,
  pub new_total_xp: u32,
  pub new_level:    u32,
  /// True when this completion crossed a level boundary, judged against the
  /// level held before the transaction.
  pub leveled_up:   bool,
  pub new_streak:   u32,
  /// The user row as persisted by the transaction.
  pub user:         User,
}

// ─── Profile view ────────────────────────────────────────────────────────────

/// A badge definition joined with one user's unlock state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementState {
  pub id:          &'static str,
  pub title:       &'static str,
  pub description: &'static str,
  pub icon:        &'static str,
  pub unlocked:    bool,
  /// The instant the predicate first held; set iff `unlocked`.
  pub unlocked_at: Option<DateTime<Utc>>,
}

/// One recent-activity line: a completed progress row joined with its
/// lesson's display metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
  pub lesson_id:    String,
  pub lesson_title: String,
  pub xp_earned:    u32,
  pub completed_at: Option<DateTime<Utc>>,
}

/// The computed profile read model for one wallet.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgressView {
  pub user:              User,
  pub completed_lessons: u32,
  pub total_lessons:     u32,
  pub achievements:      Vec<AchievementState>,
  pub recent_activity:   Vec<ActivityEntry>,
}
