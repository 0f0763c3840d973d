//! Achievement badges: a fixed registry of unlock predicates over aggregate
//! user statistics, plus the persisted unlock records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Aggregate stats ─────────────────────────────────────────────────────────

/// The statistics an unlock predicate may inspect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserStats {
  pub completed_lessons: u32,
  pub total_lessons:     u32,
  pub level:             u32,
  pub streak_days:       u32,
}

// ─── Requirements ────────────────────────────────────────────────────────────

/// An unlock predicate, expressed as data rather than a closure so the full
/// rule set is visible in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
  /// At least this many lessons completed anywhere.
  CompletedLessonsAtLeast(u32),
  /// Current level at or above the threshold.
  LevelAtLeast(u32),
  /// Current streak at or above the threshold.
  StreakDaysAtLeast(u32),
  /// Every lesson completed, pinned to the expected catalog size so the
  /// badge cannot unlock against a partially seeded catalog.
  AllLessons { catalog_size: u32 },
}

impl Requirement {
  pub fn satisfied_by(&self, stats: &UserStats) -> bool {
    match *self {
      Self::CompletedLessonsAtLeast(min) => stats.completed_lessons >= min,
      Self::LevelAtLeast(min) => stats.level >= min,
      Self::StreakDaysAtLeast(min) => stats.streak_days >= min,
      Self::AllLessons { catalog_size } => {
        stats.completed_lessons >= stats.total_lessons
          && stats.total_lessons == catalog_size
      }
    }
  }
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// One badge definition. The registry is passed explicitly to whatever
/// evaluates it; nothing in the engine reads ambient global state.
#[derive(Debug, Clone, Copy)]
pub struct AchievementDef {
  pub id:          &'static str,
  pub title:       &'static str,
  pub description: &'static str,
  pub icon:        &'static str,
  pub requirement: Requirement,
}

/// The standard CryptoLingo badge set.
pub static DEFAULT_ACHIEVEMENTS: &[AchievementDef] = &[
  AchievementDef {
    id:          "first-lesson",
    title:       "First Steps",
    description: "Complete your first lesson",
    icon:        "🎯",
    requirement: Requirement::CompletedLessonsAtLeast(1),
  },
  AchievementDef {
    id:          "beginner-complete",
    title:       "Beginner Graduate",
    description: "Complete the Beginner Fundamentals path",
    icon:        "🎓",
    requirement: Requirement::CompletedLessonsAtLeast(4),
  },
  AchievementDef {
    id:          "defi-complete",
    title:       "DeFi Master",
    description: "Complete the DeFi Essentials path",
    icon:        "⚡",
    requirement: Requirement::CompletedLessonsAtLeast(8),
  },
  AchievementDef {
    id:          "level-5",
    title:       "Rising Star",
    description: "Reach level 5",
    icon:        "⭐",
    requirement: Requirement::LevelAtLeast(5),
  },
  AchievementDef {
    id:          "streak-7",
    title:       "Week Warrior",
    description: "Maintain a 7-day streak",
    icon:        "🔥",
    requirement: Requirement::StreakDaysAtLeast(7),
  },
  AchievementDef {
    id:          "all-lessons",
    title:       "Crypto Expert",
    description: "Complete all lessons",
    icon:        "👑",
    requirement: Requirement::AllLessons { catalog_size: 8 },
  },
];

/// Definitions from `defs` whose predicate currently holds for `stats`,
/// in registry order.
pub fn satisfied<'a>(
  defs: &'a [AchievementDef],
  stats: &UserStats,
) -> Vec<&'a AchievementDef> {
  defs
    .iter()
    .filter(|def| def.requirement.satisfied_by(stats))
    .collect()
}

// ─── Unlock records ──────────────────────────────────────────────────────────

/// A persisted badge unlock — written once, the first time its predicate
/// holds, and never revoked even if the stats later fall below the bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementUnlock {
  pub unlock_id:      Uuid,
  pub wallet:         String,
  pub achievement_id: String,
  pub unlocked_at:    DateTime<Utc>,
}
