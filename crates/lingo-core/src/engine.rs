//! The progression engine: lesson completion and read-model assembly,
//! generic over any [`LearnStore`] backend.
//!
//! Handlers call these functions instead of talking to the store directly,
//! so the completion rules exist in exactly one place.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::{
  achievement::{self, AchievementDef, AchievementUnlock, UserStats},
  error::{Error, Result},
  lesson::Lesson,
  progress::CompletionWrite,
  progression,
  store::{CommitOutcome, LearnStore},
  user::User,
  view::{
    AchievementState, ActivityEntry, CompletionOutcome, LessonOverview,
    LessonWithState, PathDetail, PathOverview, PathView, UserProgressView,
  },
};

// ─── Completion ──────────────────────────────────────────────────────────────

/// Complete `lesson_id` for `wallet`, awarding XP and updating the streak.
///
/// The user row is created on the fly if this is the wallet's first
/// activity. Fails with [`Error::LessonNotFound`] for an unknown lesson and
/// [`Error::AlreadyCompleted`] for a repeat completion. The duplicate check
/// here is only a fast path — the store re-checks inside the commit
/// transaction, so two racing submissions cannot both award XP.
pub async fn complete_lesson<S: LearnStore>(
  store: &S,
  defs: &[AchievementDef],
  wallet: &str,
  lesson_id: &str,
  now: DateTime<Utc>,
) -> Result<CompletionOutcome> {
  if wallet.is_empty() {
    return Err(Error::EmptyWallet);
  }

  let lesson = store
    .find_lesson(lesson_id)
    .await
    .map_err(Error::storage)?
    .ok_or_else(|| Error::LessonNotFound(lesson_id.to_owned()))?;

  if let Some(existing) = store
    .find_progress(wallet, lesson_id)
    .await
    .map_err(Error::storage)?
    && existing.completed
  {
    return Err(Error::AlreadyCompleted {
      wallet:    wallet.to_owned(),
      lesson_id: lesson_id.to_owned(),
    });
  }

  let user = store
    .get_or_create_user(wallet, now)
    .await
    .map_err(Error::storage)?;
  let previous_level = user.level;

  let new_total_xp = user.total_xp + lesson.xp_reward;
  let new_level = progression::level_for_xp(new_total_xp);
  let new_streak =
    progression::update_streak(user.last_active, now, user.streak_days);

  let write = CompletionWrite {
    wallet:       wallet.to_owned(),
    lesson_id:    lesson_id.to_owned(),
    xp_earned:    lesson.xp_reward,
    new_total_xp,
    new_level,
    new_streak,
    now,
  };

  match store.commit_completion(&write).await.map_err(Error::storage)? {
    CommitOutcome::Applied(_) => {}
    CommitOutcome::AlreadyCompleted => {
      return Err(Error::AlreadyCompleted {
        wallet:    wallet.to_owned(),
        lesson_id: lesson_id.to_owned(),
      });
    }
  }

  // The committed row values are fully known; no re-read needed.
  let updated_user = User {
    total_xp:    new_total_xp,
    level:       new_level,
    streak_days: new_streak,
    last_active: Some(now),
    updated_at:  now,
    ..user
  };

  // Record any badges this completion pushed over their threshold.
  let stats = current_stats(store, wallet, new_level, new_streak).await?;
  sync_unlocks(store, defs, wallet, &stats, now).await?;

  Ok(CompletionOutcome {
    xp_earned: lesson.xp_reward,
    new_total_xp,
    new_level,
    leveled_up: new_level > previous_level,
    new_streak,
    user: updated_user,
  })
}

// ─── Achievements ────────────────────────────────────────────────────────────

/// Persist unlock rows for any definitions newly satisfied by `stats`.
/// Returns the wallet's full unlock set afterwards. Unlocks are never
/// revoked, so rows whose predicate no longer holds are returned unchanged.
pub async fn sync_unlocks<S: LearnStore>(
  store: &S,
  defs: &[AchievementDef],
  wallet: &str,
  stats: &UserStats,
  now: DateTime<Utc>,
) -> Result<Vec<AchievementUnlock>> {
  let mut unlocks =
    store.list_unlocks(wallet).await.map_err(Error::storage)?;

  let missing: Vec<String> = {
    let have: HashSet<&str> =
      unlocks.iter().map(|u| u.achievement_id.as_str()).collect();
    achievement::satisfied(defs, stats)
      .into_iter()
      .filter(|def| !have.contains(def.id))
      .map(|def| def.id.to_owned())
      .collect()
  };

  if !missing.is_empty() {
    let mut fresh = store
      .record_unlocks(wallet, &missing, now)
      .await
      .map_err(Error::storage)?;
    unlocks.append(&mut fresh);
  }

  Ok(unlocks)
}

/// Aggregate stats for achievement evaluation, using the caller's
/// already-known level and streak so the user row is not re-read.
async fn current_stats<S: LearnStore>(
  store: &S,
  wallet: &str,
  level: u32,
  streak_days: u32,
) -> Result<UserStats> {
  let rows = store
    .list_progress(wallet, None)
    .await
    .map_err(Error::storage)?;
  let total_lessons = store.count_lessons().await.map_err(Error::storage)?;

  Ok(UserStats {
    completed_lessons: progression::summarize_activity(&rows)
      .completed_lessons,
    total_lessons,
    level,
    streak_days,
  })
}

// ─── Path reads ──────────────────────────────────────────────────────────────

/// Path plus full lessons, unannotated.
pub async fn path_detail<S: LearnStore>(
  store: &S,
  path_id: &str,
) -> Result<PathDetail> {
  let path = store
    .find_path(path_id)
    .await
    .map_err(Error::storage)?
    .ok_or_else(|| Error::PathNotFound(path_id.to_owned()))?;
  let lessons = store
    .list_lessons_by_path(path_id)
    .await
    .map_err(Error::storage)?;

  Ok(PathDetail { path, lessons })
}

/// Path plus lessons annotated with `wallet`'s completion and lock state.
pub async fn path_view<S: LearnStore>(
  store: &S,
  path_id: &str,
  wallet: &str,
) -> Result<PathView> {
  if wallet.is_empty() {
    return Err(Error::EmptyWallet);
  }

  let path = store
    .find_path(path_id)
    .await
    .map_err(Error::storage)?
    .ok_or_else(|| Error::PathNotFound(path_id.to_owned()))?;
  let lessons = store
    .list_lessons_by_path(path_id)
    .await
    .map_err(Error::storage)?;

  let lesson_ids: Vec<String> =
    lessons.iter().map(|l| l.lesson_id.clone()).collect();
  let rows = store
    .list_progress(wallet, Some(&lesson_ids))
    .await
    .map_err(Error::storage)?;

  let completed: HashSet<String> = rows
    .iter()
    .filter(|row| row.completed)
    .map(|row| row.lesson_id.clone())
    .collect();
  let earned: HashMap<&str, u32> = rows
    .iter()
    .map(|row| (row.lesson_id.as_str(), row.xp_earned))
    .collect();

  let states = progression::lesson_states(&lessons, &completed);
  let lessons = lessons
    .into_iter()
    .zip(states)
    .map(|(lesson, state)| LessonWithState {
      completed: state.completed,
      locked:    state.locked,
      xp_earned: earned.get(lesson.lesson_id.as_str()).copied().unwrap_or(0),
      lesson,
    })
    .collect();

  Ok(PathView { path, lessons })
}

/// Every path with lesson summaries, plus per-path progress when a wallet
/// is given. An empty wallet string counts as absent.
pub async fn paths_overview<S: LearnStore>(
  store: &S,
  wallet: Option<&str>,
) -> Result<Vec<PathOverview>> {
  let wallet = wallet.filter(|w| !w.is_empty());

  let paths = store.list_paths().await.map_err(Error::storage)?;
  let lessons = store.list_lessons().await.map_err(Error::storage)?;

  let rows = match wallet {
    Some(w) => Some(store.list_progress(w, None).await.map_err(Error::storage)?),
    None => None,
  };

  // `list_lessons` is ordered, so per-path groups stay position-sorted.
  let mut by_path: HashMap<String, Vec<Lesson>> = HashMap::new();
  for lesson in lessons {
    by_path.entry(lesson.path_id.clone()).or_default().push(lesson);
  }

  let mut overviews = Vec::with_capacity(paths.len());
  for path in paths {
    let path_lessons = by_path.remove(&path.path_id).unwrap_or_default();
    let progress = rows
      .as_deref()
      .map(|rows| progression::summarize_path(&path_lessons, rows));

    overviews.push(PathOverview {
      lessons: path_lessons.iter().map(LessonOverview::from).collect(),
      progress,
      path,
    });
  }

  Ok(overviews)
}

// ─── Profile read ────────────────────────────────────────────────────────────

/// The profile read model for one wallet. Creates the user on first view,
/// and reconciles achievement unlocks so badges earned through streaks or
/// level changes appear without requiring a completion.
pub async fn user_progress_view<S: LearnStore>(
  store: &S,
  defs: &[AchievementDef],
  wallet: &str,
  now: DateTime<Utc>,
) -> Result<UserProgressView> {
  if wallet.is_empty() {
    return Err(Error::EmptyWallet);
  }

  let user = store
    .get_or_create_user(wallet, now)
    .await
    .map_err(Error::storage)?;
  let rows = store
    .list_progress(wallet, None)
    .await
    .map_err(Error::storage)?;
  let total_lessons = store.count_lessons().await.map_err(Error::storage)?;

  let summary = progression::summarize_activity(&rows);
  let stats = UserStats {
    completed_lessons: summary.completed_lessons,
    total_lessons,
    level: user.level,
    streak_days: user.streak_days,
  };

  let unlocks = sync_unlocks(store, defs, wallet, &stats, now).await?;
  let unlocked_at: HashMap<&str, DateTime<Utc>> = unlocks
    .iter()
    .map(|u| (u.achievement_id.as_str(), u.unlocked_at))
    .collect();

  let achievements = defs
    .iter()
    .map(|def| {
      let at = unlocked_at.get(def.id).copied();
      AchievementState {
        id:          def.id,
        title:       def.title,
        description: def.description,
        icon:        def.icon,
        unlocked:    at.is_some(),
        unlocked_at: at,
      }
    })
    .collect();

  // Join recent rows with lesson titles for display.
  let catalog = store.list_lessons().await.map_err(Error::storage)?;
  let titles: HashMap<&str, &str> = catalog
    .iter()
    .map(|l| (l.lesson_id.as_str(), l.title.as_str()))
    .collect();

  let recent_activity = summary
    .recent
    .iter()
    .map(|row| ActivityEntry {
      lesson_id:    row.lesson_id.clone(),
      // Fall back to the slug if the lesson has left the catalog.
      lesson_title: titles
        .get(row.lesson_id.as_str())
        .copied()
        .unwrap_or(row.lesson_id.as_str())
        .to_owned(),
      xp_earned:    row.xp_earned,
      completed_at: row.completed_at,
    })
    .collect();

  Ok(UserProgressView {
    user,
    completed_lessons: summary.completed_lessons,
    total_lessons,
    achievements,
    recent_activity,
  })
}
