//! Learning path — a named, ordered curriculum unit.

use serde::{Deserialize, Serialize};

/// A curriculum grouping of lessons, authored at seed time. The engine
/// never mutates paths; it only reads them to order and summarise lessons.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPath {
  /// Human-readable slug, e.g. `beginner-fundamentals`.
  #[serde(rename = "id")]
  pub path_id:       String,
  pub title:         String,
  pub description:   String,
  /// Display order across paths; unique.
  pub order:         u32,
  /// Sum of the contained lessons' rewards, fixed at authoring time.
  pub total_xp:      u32,
  pub total_lessons: u32,
}
