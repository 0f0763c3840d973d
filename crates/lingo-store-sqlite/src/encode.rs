//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings, UUIDs as hyphenated
//! lowercase strings, lesson content as compact JSON. Counter columns decode
//! through checked conversions so a corrupt negative value surfaces as an
//! error instead of wrapping.

use chrono::{DateTime, Utc};
use lingo_core::{
  achievement::AchievementUnlock,
  lesson::{Lesson, LessonContent},
  path::LearningPath,
  progress::ProgressRecord,
  user::User,
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// INTEGER column to `u32`; a negative value means the row is corrupt.
pub fn decode_u32(column: &str, value: i64) -> Result<u32> {
  u32::try_from(value).map_err(|_| {
    Error::Decode(format!("column {column} holds {value}, expected >= 0"))
  })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub wallet:      String,
  pub total_xp:    i64,
  pub level:       i64,
  pub streak_days: i64,
  pub last_active: Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawUser {
  /// Mapper for `SELECT wallet, total_xp, level, streak_days, last_active,
  /// created_at, updated_at` in that order.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      wallet:      row.get(0)?,
      total_xp:    row.get(1)?,
      level:       row.get(2)?,
      streak_days: row.get(3)?,
      last_active: row.get(4)?,
      created_at:  row.get(5)?,
      updated_at:  row.get(6)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      total_xp:    decode_u32("total_xp", self.total_xp)?,
      level:       decode_u32("level", self.level)?,
      streak_days: decode_u32("streak_days", self.streak_days)?,
      last_active: self.last_active.as_deref().map(decode_dt).transpose()?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
      wallet:      self.wallet,
    })
  }
}

/// Raw values read directly from a `learning_paths` row.
pub struct RawPath {
  pub path_id:       String,
  pub title:         String,
  pub description:   String,
  pub position:      i64,
  pub total_xp:      i64,
  pub total_lessons: i64,
}

impl RawPath {
  /// Mapper for `SELECT path_id, title, description, position, total_xp,
  /// total_lessons` in that order.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      path_id:       row.get(0)?,
      title:         row.get(1)?,
      description:   row.get(2)?,
      position:      row.get(3)?,
      total_xp:      row.get(4)?,
      total_lessons: row.get(5)?,
    })
  }

  pub fn into_path(self) -> Result<LearningPath> {
    Ok(LearningPath {
      order:         decode_u32("position", self.position)?,
      total_xp:      decode_u32("total_xp", self.total_xp)?,
      total_lessons: decode_u32("total_lessons", self.total_lessons)?,
      path_id:       self.path_id,
      title:         self.title,
      description:   self.description,
    })
  }
}

/// Raw values read directly from a `lessons` row.
pub struct RawLesson {
  pub lesson_id: String,
  pub path_id:   String,
  pub title:     String,
  pub position:  i64,
  pub xp_reward: i64,
  pub content:   String,
}

impl RawLesson {
  /// Mapper for `SELECT lesson_id, path_id, title, position, xp_reward,
  /// content` in that order.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      lesson_id: row.get(0)?,
      path_id:   row.get(1)?,
      title:     row.get(2)?,
      position:  row.get(3)?,
      xp_reward: row.get(4)?,
      content:   row.get(5)?,
    })
  }

  pub fn into_lesson(self) -> Result<Lesson> {
    Ok(Lesson {
      order:     decode_u32("position", self.position)?,
      xp_reward: decode_u32("xp_reward", self.xp_reward)?,
      content:   LessonContent::from_json(&self.content)?,
      lesson_id: self.lesson_id,
      path_id:   self.path_id,
      title:     self.title,
    })
  }
}

/// Raw values read directly from a `user_progress` row.
pub struct RawProgress {
  pub progress_id:  String,
  pub wallet:       String,
  pub lesson_id:    String,
  pub completed:    bool,
  pub completed_at: Option<String>,
  pub xp_earned:    i64,
}

impl RawProgress {
  /// Mapper for `SELECT progress_id, wallet, lesson_id, completed,
  /// completed_at, xp_earned` in that order.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      progress_id:  row.get(0)?,
      wallet:       row.get(1)?,
      lesson_id:    row.get(2)?,
      completed:    row.get(3)?,
      completed_at: row.get(4)?,
      xp_earned:    row.get(5)?,
    })
  }

  pub fn into_progress(self) -> Result<ProgressRecord> {
    Ok(ProgressRecord {
      progress_id:  decode_uuid(&self.progress_id)?,
      completed_at: self.completed_at.as_deref().map(decode_dt).transpose()?,
      xp_earned:    decode_u32("xp_earned", self.xp_earned)?,
      wallet:       self.wallet,
      lesson_id:    self.lesson_id,
      completed:    self.completed,
    })
  }
}

/// Raw values read directly from an `achievement_unlocks` row.
pub struct RawUnlock {
  pub unlock_id:      String,
  pub wallet:         String,
  pub achievement_id: String,
  pub unlocked_at:    String,
}

impl RawUnlock {
  /// Mapper for `SELECT unlock_id, wallet, achievement_id, unlocked_at` in
  /// that order.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      unlock_id:      row.get(0)?,
      wallet:         row.get(1)?,
      achievement_id: row.get(2)?,
      unlocked_at:    row.get(3)?,
    })
  }

  pub fn into_unlock(self) -> Result<AchievementUnlock> {
    Ok(AchievementUnlock {
      unlock_id:      decode_uuid(&self.unlock_id)?,
      unlocked_at:    decode_dt(&self.unlocked_at)?,
      wallet:         self.wallet,
      achievement_id: self.achievement_id,
    })
  }
}
