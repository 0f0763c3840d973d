//! Pure progression rules: leveling, streak maintenance, sequential lesson
//! unlocking, and progress aggregation.
//!
//! Everything here is a total function over plain values. Persistence and
//! clock access live with the callers, which keeps these rules trivially
//! testable.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{lesson::Lesson, progress::ProgressRecord};

/// XP span of a single level.
pub const XP_PER_LEVEL: u32 = 500;

/// Number of progress rows reported as recent activity.
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

// ─── Leveling ────────────────────────────────────────────────────────────────

/// Level reached at `total_xp`. Level 1 spans `[0, 500)`, level 2
/// `[500, 1000)`, and so on without an upper bound.
pub fn level_for_xp(total_xp: u32) -> u32 {
  total_xp / XP_PER_LEVEL + 1
}

/// Cumulative XP at which the next level starts.
pub fn xp_for_next_level(total_xp: u32) -> u32 {
  level_for_xp(total_xp) * XP_PER_LEVEL
}

/// Percentage of the current level already earned, in `[0, 100)`.
/// Exactly 0.0 at every level boundary.
pub fn xp_progress_within_level(total_xp: u32) -> f64 {
  let level_floor = (level_for_xp(total_xp) - 1) * XP_PER_LEVEL;
  f64::from(total_xp - level_floor) / f64::from(XP_PER_LEVEL) * 100.0
}

// ─── Streak ──────────────────────────────────────────────────────────────────

const MILLIS_PER_DAY: u64 = 24 * 60 * 60 * 1000;

/// New streak value given the previous activity timestamp.
///
/// Day distance is `ceil(|now - last_active| / 24h)`: up to one whole day
/// keeps the streak, a second day is a grace period, anything beyond resets
/// to 1. First-ever activity starts at 1. The function never increments;
/// it only carries a streak forward or resets it.
pub fn update_streak(
  last_active: Option<DateTime<Utc>>,
  now: DateTime<Utc>,
  current_streak: u32,
) -> u32 {
  let Some(last) = last_active else {
    return 1;
  };

  // A last-active timestamp ahead of `now` (clock skew) is treated as
  // ordinary elapsed time.
  let elapsed_ms = (now - last).num_milliseconds().unsigned_abs();
  let diff_days = elapsed_ms.div_ceil(MILLIS_PER_DAY);

  if diff_days <= 1 {
    current_streak
  } else if diff_days == 2 {
    // One missed day of grace before the reset.
    current_streak
  } else {
    1
  }
}

// ─── Lesson unlocking ────────────────────────────────────────────────────────

/// Per-lesson completion/lock state within one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonState {
  pub completed: bool,
  pub locked:    bool,
}

/// Resolve lock state for `lessons` (ordered by `order` ascending) against
/// the set of completed lesson ids.
///
/// The first lesson is always reachable; every later lesson is locked until
/// its immediate predecessor is completed. A completed lesson is never
/// reported locked — completion proves it was reachable when it happened.
pub fn lesson_states(
  lessons: &[Lesson],
  completed: &HashSet<String>,
) -> Vec<LessonState> {
  lessons
    .iter()
    .enumerate()
    .map(|(i, lesson)| {
      let done = completed.contains(&lesson.lesson_id);
      let predecessor_done =
        i == 0 || completed.contains(&lessons[i - 1].lesson_id);
      LessonState {
        completed: done,
        locked:    !done && !predecessor_done,
      }
    })
    .collect()
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

/// One user's standing within a single path. Serialises with the field
/// names the paths listing flattens into each path object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PathProgress {
  #[serde(rename = "completedLessons")]
  pub completed_count: u32,
  #[serde(rename = "progress")]
  pub percentage:      f64,
}

/// Completion counts for `lessons` given the user's progress rows. Rows for
/// lessons outside the slice are ignored.
pub fn summarize_path(
  lessons: &[Lesson],
  rows: &[ProgressRecord],
) -> PathProgress {
  let completed: HashSet<&str> = rows
    .iter()
    .filter(|row| row.completed)
    .map(|row| row.lesson_id.as_str())
    .collect();

  let completed_count = lessons
    .iter()
    .filter(|lesson| completed.contains(lesson.lesson_id.as_str()))
    .count() as u32;

  // A path with no lessons reports 0%, not NaN.
  let percentage = if lessons.is_empty() {
    0.0
  } else {
    f64::from(completed_count) / lessons.len() as f64 * 100.0
  };

  PathProgress { completed_count, percentage }
}

/// Cross-path summary over all of a user's progress rows.
#[derive(Debug, Clone)]
pub struct ActivitySummary {
  pub completed_lessons: u32,
  /// Sum of the historical `xp_earned` snapshots, not recomputed rewards.
  pub xp_earned:         u32,
  /// Most recently completed rows, newest first, capped at
  /// [`RECENT_ACTIVITY_LIMIT`]. Ties keep their input order.
  pub recent:            Vec<ProgressRecord>,
}

pub fn summarize_activity(rows: &[ProgressRecord]) -> ActivitySummary {
  let mut recent: Vec<ProgressRecord> =
    rows.iter().filter(|row| row.completed).cloned().collect();

  let completed_lessons = recent.len() as u32;
  let xp_earned = recent.iter().map(|row| row.xp_earned).sum();

  // Stable sort: rows completed at the same instant keep their input order.
  recent.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
  recent.truncate(RECENT_ACTIVITY_LIMIT);

  ActivitySummary { completed_lessons, xp_earned, recent }
}
