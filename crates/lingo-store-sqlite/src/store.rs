//! [`SqliteStore`] — the SQLite implementation of [`LearnStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use lingo_core::{
  achievement::AchievementUnlock,
  lesson::Lesson,
  path::LearningPath,
  progress::{CompletionWrite, ProgressRecord},
  store::{CommitOutcome, LearnStore},
  user::User,
};

use crate::{
  encode::{
    RawLesson, RawPath, RawProgress, RawUnlock, RawUser, decode_u32,
    encode_dt, encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A CryptoLingo store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted, and every
/// call runs on the connection's dedicated thread, so SQL transactions
/// execute strictly one at a time.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── LearnStore impl ─────────────────────────────────────────────────────────

impl LearnStore for SqliteStore {
  type Error = Error;

  // ── Users ───────────────────────────────────────────────────────────────

  async fn get_or_create_user(
    &self,
    wallet: &str,
    now: DateTime<Utc>,
  ) -> Result<User> {
    let wallet = wallet.to_owned();
    let now_str = encode_dt(now);

    let raw: RawUser = self
      .conn
      .call(move |conn| {
        // INSERT OR IGNORE keeps creation idempotent; the follow-up SELECT
        // returns whichever row won.
        conn.execute(
          "INSERT OR IGNORE INTO users
             (wallet, total_xp, level, streak_days, last_active, created_at, updated_at)
           VALUES (?1, 0, 1, 1, ?2, ?2, ?2)",
          rusqlite::params![wallet, now_str],
        )?;

        Ok(conn.query_row(
          "SELECT wallet, total_xp, level, streak_days, last_active, created_at, updated_at
           FROM users WHERE wallet = ?1",
          rusqlite::params![wallet],
          RawUser::from_row,
        )?)
      })
      .await?;

    raw.into_user()
  }

  async fn find_user(&self, wallet: &str) -> Result<Option<User>> {
    let wallet = wallet.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT wallet, total_xp, level, streak_days, last_active, created_at, updated_at
               FROM users WHERE wallet = ?1",
              rusqlite::params![wallet],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Catalog ─────────────────────────────────────────────────────────────

  async fn find_path(&self, path_id: &str) -> Result<Option<LearningPath>> {
    let path_id = path_id.to_owned();

    let raw: Option<RawPath> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT path_id, title, description, position, total_xp, total_lessons
               FROM learning_paths WHERE path_id = ?1",
              rusqlite::params![path_id],
              RawPath::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPath::into_path).transpose()
  }

  async fn list_paths(&self) -> Result<Vec<LearningPath>> {
    let raws: Vec<RawPath> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT path_id, title, description, position, total_xp, total_lessons
           FROM learning_paths ORDER BY position",
        )?;
        let rows = stmt
          .query_map([], RawPath::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPath::into_path).collect()
  }

  async fn find_lesson(&self, lesson_id: &str) -> Result<Option<Lesson>> {
    let lesson_id = lesson_id.to_owned();

    let raw: Option<RawLesson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT lesson_id, path_id, title, position, xp_reward, content
               FROM lessons WHERE lesson_id = ?1",
              rusqlite::params![lesson_id],
              RawLesson::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLesson::into_lesson).transpose()
  }

  async fn list_lessons_by_path(&self, path_id: &str) -> Result<Vec<Lesson>> {
    let path_id = path_id.to_owned();

    let raws: Vec<RawLesson> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT lesson_id, path_id, title, position, xp_reward, content
           FROM lessons WHERE path_id = ?1 ORDER BY position",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![path_id], RawLesson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLesson::into_lesson).collect()
  }

  async fn list_lessons(&self) -> Result<Vec<Lesson>> {
    let raws: Vec<RawLesson> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT l.lesson_id, l.path_id, l.title, l.position, l.xp_reward, l.content
           FROM lessons l
           JOIN learning_paths p ON p.path_id = l.path_id
           ORDER BY p.position, l.position",
        )?;
        let rows = stmt
          .query_map([], RawLesson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLesson::into_lesson).collect()
  }

  async fn count_lessons(&self) -> Result<u32> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM lessons", [], |row| row.get(0))?)
      })
      .await?;

    decode_u32("count(lessons)", count)
  }

  async fn put_path(&self, path: &LearningPath) -> Result<()> {
    let path = path.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO learning_paths
             (path_id, title, description, position, total_xp, total_lessons)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT (path_id) DO UPDATE SET
             title = excluded.title,
             description = excluded.description,
             position = excluded.position,
             total_xp = excluded.total_xp,
             total_lessons = excluded.total_lessons",
          rusqlite::params![
            path.path_id,
            path.title,
            path.description,
            path.order,
            path.total_xp,
            path.total_lessons,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn put_lesson(&self, lesson: &Lesson) -> Result<()> {
    let content_json = lesson.content.to_json()?;
    let lesson = lesson.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO lessons
             (lesson_id, path_id, title, position, xp_reward, content)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT (lesson_id) DO UPDATE SET
             path_id = excluded.path_id,
             title = excluded.title,
             position = excluded.position,
             xp_reward = excluded.xp_reward,
             content = excluded.content",
          rusqlite::params![
            lesson.lesson_id,
            lesson.path_id,
            lesson.title,
            lesson.order,
            lesson.xp_reward,
            content_json,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Progress ────────────────────────────────────────────────────────────

  async fn find_progress(
    &self,
    wallet: &str,
    lesson_id: &str,
  ) -> Result<Option<ProgressRecord>> {
    let wallet = wallet.to_owned();
    let lesson_id = lesson_id.to_owned();

    let raw: Option<RawProgress> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT progress_id, wallet, lesson_id, completed, completed_at, xp_earned
               FROM user_progress WHERE wallet = ?1 AND lesson_id = ?2",
              rusqlite::params![wallet, lesson_id],
              RawProgress::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProgress::into_progress).transpose()
  }

  async fn list_progress(
    &self,
    wallet: &str,
    lessons: Option<&[String]>,
  ) -> Result<Vec<ProgressRecord>> {
    // `IN ()` is a syntax error; an explicit empty filter means no rows.
    if let Some(ids) = lessons
      && ids.is_empty()
    {
      return Ok(Vec::new());
    }

    let wallet = wallet.to_owned();
    let filter: Option<Vec<String>> = lessons.map(<[String]>::to_vec);

    let raws: Vec<RawProgress> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(ids) = filter {
          let placeholders: Vec<String> =
            (0..ids.len()).map(|i| format!("?{}", i + 2)).collect();
          let sql = format!(
            "SELECT progress_id, wallet, lesson_id, completed, completed_at, xp_earned
             FROM user_progress WHERE wallet = ?1 AND lesson_id IN ({})",
            placeholders.join(", "),
          );

          let mut params: Vec<&dyn rusqlite::ToSql> = vec![&wallet];
          for id in &ids {
            params.push(id);
          }

          let mut stmt = conn.prepare(&sql)?;
          stmt
            .query_map(params.as_slice(), RawProgress::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(
            "SELECT progress_id, wallet, lesson_id, completed, completed_at, xp_earned
             FROM user_progress WHERE wallet = ?1",
          )?;
          stmt
            .query_map(rusqlite::params![wallet], RawProgress::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProgress::into_progress).collect()
  }

  async fn commit_completion(
    &self,
    write: &CompletionWrite,
  ) -> Result<CommitOutcome> {
    let w = write.clone();
    let progress_id = encode_uuid(Uuid::new_v4());
    let now_str = encode_dt(w.now);

    let raw: Option<RawProgress> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Authoritative duplicate re-check, inside the transaction. The
        // engine's earlier read ran outside it and may be stale.
        let already: Option<bool> = tx
          .query_row(
            "SELECT completed FROM user_progress
             WHERE wallet = ?1 AND lesson_id = ?2",
            rusqlite::params![w.wallet, w.lesson_id],
            |row| row.get(0),
          )
          .optional()?;

        if already == Some(true) {
          // Dropping the transaction without commit discards nothing —
          // no statement has written yet.
          return Ok(None);
        }

        tx.execute(
          "UPDATE users
           SET total_xp = ?2, level = ?3, streak_days = ?4,
               last_active = ?5, updated_at = ?5
           WHERE wallet = ?1",
          rusqlite::params![
            w.wallet,
            w.new_total_xp,
            w.new_level,
            w.new_streak,
            now_str,
          ],
        )?;

        // Upsert keeps the original progress_id when an incomplete row
        // already existed for the pair.
        tx.execute(
          "INSERT INTO user_progress
             (progress_id, wallet, lesson_id, completed, completed_at, xp_earned)
           VALUES (?1, ?2, ?3, 1, ?4, ?5)
           ON CONFLICT (wallet, lesson_id) DO UPDATE SET
             completed = 1,
             completed_at = excluded.completed_at,
             xp_earned = excluded.xp_earned",
          rusqlite::params![progress_id, w.wallet, w.lesson_id, now_str, w.xp_earned],
        )?;

        let row = tx.query_row(
          "SELECT progress_id, wallet, lesson_id, completed, completed_at, xp_earned
           FROM user_progress WHERE wallet = ?1 AND lesson_id = ?2",
          rusqlite::params![w.wallet, w.lesson_id],
          RawProgress::from_row,
        )?;

        tx.commit()?;
        Ok(Some(row))
      })
      .await?;

    match raw {
      Some(raw) => Ok(CommitOutcome::Applied(raw.into_progress()?)),
      None => Ok(CommitOutcome::AlreadyCompleted),
    }
  }

  // ── Achievements ────────────────────────────────────────────────────────

  async fn list_unlocks(&self, wallet: &str) -> Result<Vec<AchievementUnlock>> {
    let wallet = wallet.to_owned();

    let raws: Vec<RawUnlock> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT unlock_id, wallet, achievement_id, unlocked_at
           FROM achievement_unlocks WHERE wallet = ?1 ORDER BY unlocked_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![wallet], RawUnlock::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUnlock::into_unlock).collect()
  }

  async fn record_unlocks(
    &self,
    wallet: &str,
    achievement_ids: &[String],
    now: DateTime<Utc>,
  ) -> Result<Vec<AchievementUnlock>> {
    if achievement_ids.is_empty() {
      return Ok(Vec::new());
    }

    let wallet = wallet.to_owned();
    let now_str = encode_dt(now);
    let fresh: Vec<(String, String)> = achievement_ids
      .iter()
      .map(|id| (encode_uuid(Uuid::new_v4()), id.clone()))
      .collect();

    let raws: Vec<RawUnlock> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut written = Vec::new();

        for (unlock_id, achievement_id) in &fresh {
          // INSERT OR IGNORE: a row that lost the race keeps its original
          // unlocked_at.
          let inserted = tx.execute(
            "INSERT OR IGNORE INTO achievement_unlocks
               (unlock_id, wallet, achievement_id, unlocked_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![unlock_id, wallet, achievement_id, now_str],
          )?;

          if inserted > 0 {
            written.push(RawUnlock {
              unlock_id:      unlock_id.clone(),
              wallet:         wallet.clone(),
              achievement_id: achievement_id.clone(),
              unlocked_at:    now_str.clone(),
            });
          }
        }

        tx.commit()?;
        Ok(written)
      })
      .await?;

    raws.into_iter().map(RawUnlock::into_unlock).collect()
  }
}
