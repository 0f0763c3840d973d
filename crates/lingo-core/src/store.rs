//! The `LearnStore` trait — the persistence seam behind the progression
//! engine.
//!
//! The trait is implemented by storage backends (e.g. `lingo-store-sqlite`).
//! Higher layers (`lingo-api`, `lingo-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  achievement::AchievementUnlock,
  lesson::Lesson,
  path::LearningPath,
  progress::{CompletionWrite, ProgressRecord},
  user::User,
};

// ─── Commit outcome ──────────────────────────────────────────────────────────

/// Result of [`LearnStore::commit_completion`]. The duplicate case travels
/// in the `Ok` channel: it is a business outcome, not a storage failure.
#[derive(Debug, Clone)]
pub enum CommitOutcome {
  /// Both writes committed; the upserted progress row is returned.
  Applied(ProgressRecord),
  /// The pair was already completed — nothing was written.
  AlreadyCompleted,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a CryptoLingo storage backend.
///
/// Catalog rows (paths, lessons) are written only by seeding and content
/// authoring. User rows, progress rows and achievement unlocks are written
/// by the engine; [`LearnStore::commit_completion`] is the one compound
/// write and must be atomic.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait LearnStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Fetch the user, creating the default row (`total_xp = 0`, `level = 1`,
  /// `streak_days = 1`, `last_active = now`) if none exists. Idempotent;
  /// every entry point that needs a user row goes through here.
  fn get_or_create_user<'a>(
    &'a self,
    wallet: &'a str,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + 'a;

  /// Retrieve a user by wallet. Returns `None` if not found.
  fn find_user<'a>(
    &'a self,
    wallet: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  // ── Catalog ───────────────────────────────────────────────────────────

  fn find_path<'a>(
    &'a self,
    path_id: &'a str,
  ) -> impl Future<Output = Result<Option<LearningPath>, Self::Error>> + Send + 'a;

  /// All paths, ordered by their display order.
  fn list_paths(
    &self,
  ) -> impl Future<Output = Result<Vec<LearningPath>, Self::Error>> + Send + '_;

  fn find_lesson<'a>(
    &'a self,
    lesson_id: &'a str,
  ) -> impl Future<Output = Result<Option<Lesson>, Self::Error>> + Send + 'a;

  /// Lessons of one path, ordered by their position within the path.
  fn list_lessons_by_path<'a>(
    &'a self,
    path_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Lesson>, Self::Error>> + Send + 'a;

  /// Every lesson in the catalog, grouped by path order then position.
  fn list_lessons(
    &self,
  ) -> impl Future<Output = Result<Vec<Lesson>, Self::Error>> + Send + '_;

  fn count_lessons(
    &self,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + '_;

  /// Insert or update a path. Content authoring only.
  fn put_path<'a>(
    &'a self,
    path: &'a LearningPath,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Insert or update a lesson. Content authoring only.
  fn put_lesson<'a>(
    &'a self,
    lesson: &'a Lesson,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Progress ──────────────────────────────────────────────────────────

  fn find_progress<'a>(
    &'a self,
    wallet: &'a str,
    lesson_id: &'a str,
  ) -> impl Future<Output = Result<Option<ProgressRecord>, Self::Error>> + Send + 'a;

  /// All progress rows for a wallet, optionally restricted to the given
  /// lesson ids.
  fn list_progress<'a>(
    &'a self,
    wallet: &'a str,
    lessons: Option<&'a [String]>,
  ) -> impl Future<Output = Result<Vec<ProgressRecord>, Self::Error>> + Send + 'a;

  /// Apply a fully computed completion atomically: update the user row and
  /// upsert the progress row, or write nothing at all.
  ///
  /// Implementations must re-check for an existing completed row inside the
  /// same transaction and report it as [`CommitOutcome::AlreadyCompleted`];
  /// the store-level uniqueness of `(wallet, lesson_id)` is the
  /// authoritative duplicate guard.
  fn commit_completion<'a>(
    &'a self,
    write: &'a CompletionWrite,
  ) -> impl Future<Output = Result<CommitOutcome, Self::Error>> + Send + 'a;

  // ── Achievements ──────────────────────────────────────────────────────

  /// All unlock rows for a wallet, oldest first.
  fn list_unlocks<'a>(
    &'a self,
    wallet: &'a str,
  ) -> impl Future<Output = Result<Vec<AchievementUnlock>, Self::Error>> + Send + 'a;

  /// Insert unlock rows for any of `achievement_ids` not already present,
  /// timestamped `now`. Returns only the newly written rows; ids that
  /// already had a row are skipped, preserving their original timestamp.
  fn record_unlocks<'a>(
    &'a self,
    wallet: &'a str,
    achievement_ids: &'a [String],
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<AchievementUnlock>, Self::Error>> + Send + 'a;
}
