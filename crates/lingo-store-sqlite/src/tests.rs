//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{DateTime, Duration, TimeZone, Utc};
use lingo_core::{
  achievement::DEFAULT_ACHIEVEMENTS,
  engine,
  lesson::{Lesson, LessonContent, Question, QuestionKind},
  path::LearningPath,
  progress::CompletionWrite,
  store::{CommitOutcome, LearnStore},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn at() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 3, 10, 18, 30, 0).unwrap()
}

fn sample_path(path_id: &str, order: u32) -> LearningPath {
  LearningPath {
    path_id:       path_id.to_owned(),
    title:         format!("Path {order}"),
    description:   "A short description.".to_owned(),
    order,
    total_xp:      750,
    total_lessons: 3,
  }
}

fn sample_lesson(lesson_id: &str, path_id: &str, order: u32, xp: u32) -> Lesson {
  Lesson {
    lesson_id: lesson_id.to_owned(),
    path_id:   path_id.to_owned(),
    title:     format!("Lesson {order}"),
    order,
    xp_reward: xp,
    content:   LessonContent {
      questions: vec![Question {
        id:          format!("{lesson_id}-q1"),
        prompt:      "Is this recorded on-chain?".to_owned(),
        explanation: "It is.".to_owned(),
        kind:        QuestionKind::TrueFalse { correct_answer: true },
      }],
    },
  }
}

fn completion(
  wallet: &str,
  lesson_id: &str,
  xp: u32,
  total: u32,
  level: u32,
) -> CompletionWrite {
  CompletionWrite {
    wallet:       wallet.to_owned(),
    lesson_id:    lesson_id.to_owned(),
    xp_earned:    xp,
    new_total_xp: total,
    new_level:    level,
    new_streak:   1,
    now:          at(),
  }
}

/// One path, three lessons: 150 + 400 + 200 XP.
async fn seeded_store() -> SqliteStore {
  let s = store().await;
  s.put_path(&sample_path("beginner", 1)).await.unwrap();
  s.put_lesson(&sample_lesson("basics-1", "beginner", 1, 150))
    .await
    .unwrap();
  s.put_lesson(&sample_lesson("basics-2", "beginner", 2, 400))
    .await
    .unwrap();
  s.put_lesson(&sample_lesson("basics-3", "beginner", 3, 200))
    .await
    .unwrap();
  s
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_or_create_user_sets_defaults() {
  let s = store().await;

  let user = s.get_or_create_user("0xabc", at()).await.unwrap();
  assert_eq!(user.wallet, "0xabc");
  assert_eq!(user.total_xp, 0);
  assert_eq!(user.level, 1);
  assert_eq!(user.streak_days, 1);
  assert_eq!(user.last_active, Some(at()));
  assert_eq!(user.created_at, at());
}

#[tokio::test]
async fn get_or_create_user_is_idempotent() {
  let s = store().await;

  let first = s.get_or_create_user("0xabc", at()).await.unwrap();
  let second = s
    .get_or_create_user("0xabc", at() + Duration::days(3))
    .await
    .unwrap();

  // The second call must not reset or re-stamp the existing row.
  assert_eq!(second.created_at, first.created_at);
  assert_eq!(second.last_active, Some(at()));
  assert_eq!(second.total_xp, 0);
}

#[tokio::test]
async fn find_user_missing_returns_none() {
  let s = store().await;
  assert!(s.find_user("0xghost").await.unwrap().is_none());
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn put_path_roundtrips() {
  let s = store().await;
  let path = sample_path("beginner", 1);
  s.put_path(&path).await.unwrap();

  let fetched = s.find_path("beginner").await.unwrap().unwrap();
  assert_eq!(fetched.title, path.title);
  assert_eq!(fetched.order, 1);
  assert_eq!(fetched.total_xp, 750);
  assert_eq!(fetched.total_lessons, 3);
}

#[tokio::test]
async fn put_path_updates_in_place() {
  let s = store().await;
  let mut path = sample_path("beginner", 1);
  s.put_path(&path).await.unwrap();

  path.title = "Renamed".to_owned();
  path.total_xp = 900;
  s.put_path(&path).await.unwrap();

  let fetched = s.find_path("beginner").await.unwrap().unwrap();
  assert_eq!(fetched.title, "Renamed");
  assert_eq!(fetched.total_xp, 900);
  assert_eq!(s.list_paths().await.unwrap().len(), 1);
}

#[tokio::test]
async fn list_paths_ordered_by_position() {
  let s = store().await;
  s.put_path(&sample_path("second", 2)).await.unwrap();
  s.put_path(&sample_path("first", 1)).await.unwrap();

  let paths = s.list_paths().await.unwrap();
  let ids: Vec<_> = paths.iter().map(|p| p.path_id.as_str()).collect();
  assert_eq!(ids, ["first", "second"]);
}

#[tokio::test]
async fn lesson_content_roundtrips() {
  let s = store().await;
  s.put_path(&sample_path("beginner", 1)).await.unwrap();

  let mut lesson = sample_lesson("intro", "beginner", 1, 150);
  lesson.content.questions.push(Question {
    id:          "intro-q2".to_owned(),
    prompt:      "Pick one.".to_owned(),
    explanation: "The second option.".to_owned(),
    kind:        QuestionKind::MultipleChoice {
      options:        vec!["a".to_owned(), "b".to_owned()],
      correct_answer: 1,
    },
  });
  s.put_lesson(&lesson).await.unwrap();

  let fetched = s.find_lesson("intro").await.unwrap().unwrap();
  assert_eq!(fetched.title, lesson.title);
  assert_eq!(fetched.xp_reward, 150);
  assert_eq!(fetched.content.questions.len(), 2);
  assert!(matches!(
    fetched.content.questions[1].kind,
    QuestionKind::MultipleChoice { correct_answer: 1, .. }
  ));
}

#[tokio::test]
async fn put_lesson_requires_known_path() {
  let s = store().await;
  let result = s.put_lesson(&sample_lesson("intro", "ghost", 1, 150)).await;
  assert!(result.is_err());
}

#[tokio::test]
async fn find_lesson_missing_returns_none() {
  let s = store().await;
  assert!(s.find_lesson("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn list_lessons_groups_by_path_then_position() {
  let s = store().await;
  s.put_path(&sample_path("defi", 2)).await.unwrap();
  s.put_path(&sample_path("beginner", 1)).await.unwrap();
  s.put_lesson(&sample_lesson("defi-1", "defi", 1, 150))
    .await
    .unwrap();
  s.put_lesson(&sample_lesson("basics-2", "beginner", 2, 175))
    .await
    .unwrap();
  s.put_lesson(&sample_lesson("basics-1", "beginner", 1, 150))
    .await
    .unwrap();

  let all = s.list_lessons().await.unwrap();
  let ids: Vec<_> = all.iter().map(|l| l.lesson_id.as_str()).collect();
  assert_eq!(ids, ["basics-1", "basics-2", "defi-1"]);
  assert_eq!(s.count_lessons().await.unwrap(), 3);
}

#[tokio::test]
async fn list_lessons_by_path_filters_and_orders() {
  let s = store().await;
  s.put_path(&sample_path("beginner", 1)).await.unwrap();
  s.put_path(&sample_path("defi", 2)).await.unwrap();
  s.put_lesson(&sample_lesson("basics-2", "beginner", 2, 175))
    .await
    .unwrap();
  s.put_lesson(&sample_lesson("basics-1", "beginner", 1, 150))
    .await
    .unwrap();
  s.put_lesson(&sample_lesson("defi-1", "defi", 1, 150))
    .await
    .unwrap();

  let lessons = s.list_lessons_by_path("beginner").await.unwrap();
  let ids: Vec<_> = lessons.iter().map(|l| l.lesson_id.as_str()).collect();
  assert_eq!(ids, ["basics-1", "basics-2"]);
}

// ─── Progress ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn commit_completion_applies_and_updates_user() {
  let s = seeded_store().await;
  s.get_or_create_user("0xabc", at()).await.unwrap();

  let mut write = completion("0xabc", "basics-1", 150, 150, 1);
  write.now = at() + Duration::hours(2);
  let outcome = s.commit_completion(&write).await.unwrap();

  let record = match outcome {
    CommitOutcome::Applied(record) => record,
    CommitOutcome::AlreadyCompleted => panic!("first commit should apply"),
  };
  assert!(record.completed);
  assert_eq!(record.xp_earned, 150);
  assert_eq!(record.completed_at, Some(write.now));

  let user = s.find_user("0xabc").await.unwrap().unwrap();
  assert_eq!(user.total_xp, 150);
  assert_eq!(user.level, 1);
  assert_eq!(user.last_active, Some(write.now));
}

#[tokio::test]
async fn commit_completion_replay_reports_already_completed() {
  let s = seeded_store().await;
  s.get_or_create_user("0xabc", at()).await.unwrap();

  s.commit_completion(&completion("0xabc", "basics-1", 150, 150, 1))
    .await
    .unwrap();

  // Replay with inflated numbers: the duplicate must not touch anything.
  let mut replay = completion("0xabc", "basics-1", 150, 300, 2);
  replay.now = at() + Duration::days(1);
  let outcome = s.commit_completion(&replay).await.unwrap();
  assert!(matches!(outcome, CommitOutcome::AlreadyCompleted));

  let user = s.find_user("0xabc").await.unwrap().unwrap();
  assert_eq!(user.total_xp, 150);
  assert_eq!(user.level, 1);

  let record = s.find_progress("0xabc", "basics-1").await.unwrap().unwrap();
  assert_eq!(record.completed_at, Some(at()));
}

#[tokio::test]
async fn commit_completion_unknown_lesson_rolls_back_user_update() {
  let s = seeded_store().await;
  s.get_or_create_user("0xabc", at()).await.unwrap();

  let result = s
    .commit_completion(&completion("0xabc", "ghost", 150, 150, 1))
    .await;
  assert!(result.is_err());

  // The user update ran in the same transaction, so it must be gone too.
  let user = s.find_user("0xabc").await.unwrap().unwrap();
  assert_eq!(user.total_xp, 0);
  assert_eq!(user.last_active, Some(at()));
}

#[tokio::test]
async fn commit_completion_unknown_wallet_errors() {
  let s = seeded_store().await;

  let result = s
    .commit_completion(&completion("0xghost", "basics-1", 150, 150, 1))
    .await;
  assert!(result.is_err());
  assert!(
    s.find_progress("0xghost", "basics-1")
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn find_progress_missing_returns_none() {
  let s = seeded_store().await;
  assert!(s.find_progress("0xabc", "basics-1").await.unwrap().is_none());
}

#[tokio::test]
async fn list_progress_scopes_to_wallet() {
  let s = seeded_store().await;
  s.get_or_create_user("0xabc", at()).await.unwrap();
  s.get_or_create_user("0xdef", at()).await.unwrap();

  s.commit_completion(&completion("0xabc", "basics-1", 150, 150, 1))
    .await
    .unwrap();
  s.commit_completion(&completion("0xabc", "basics-2", 400, 550, 2))
    .await
    .unwrap();
  s.commit_completion(&completion("0xdef", "basics-1", 150, 150, 1))
    .await
    .unwrap();

  let rows = s.list_progress("0xabc", None).await.unwrap();
  assert_eq!(rows.len(), 2);
  assert!(rows.iter().all(|r| r.wallet == "0xabc"));
}

#[tokio::test]
async fn list_progress_filters_by_lesson_ids() {
  let s = seeded_store().await;
  s.get_or_create_user("0xabc", at()).await.unwrap();

  s.commit_completion(&completion("0xabc", "basics-1", 150, 150, 1))
    .await
    .unwrap();
  s.commit_completion(&completion("0xabc", "basics-2", 400, 550, 2))
    .await
    .unwrap();

  let wanted = vec!["basics-2".to_owned(), "basics-3".to_owned()];
  let rows = s.list_progress("0xabc", Some(&wanted)).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].lesson_id, "basics-2");

  let none = s.list_progress("0xabc", Some(&[])).await.unwrap();
  assert!(none.is_empty());
}

// ─── Achievements ────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_unlocks_inserts_and_lists() {
  let s = store().await;
  s.get_or_create_user("0xabc", at()).await.unwrap();

  let ids = vec!["first-lesson".to_owned(), "level-5".to_owned()];
  let written = s.record_unlocks("0xabc", &ids, at()).await.unwrap();
  assert_eq!(written.len(), 2);

  let unlocks = s.list_unlocks("0xabc").await.unwrap();
  assert_eq!(unlocks.len(), 2);
  assert!(unlocks.iter().all(|u| u.wallet == "0xabc"));
  assert!(unlocks.iter().all(|u| u.unlocked_at == at()));
}

#[tokio::test]
async fn record_unlocks_keeps_original_timestamp() {
  let s = store().await;
  s.get_or_create_user("0xabc", at()).await.unwrap();

  s.record_unlocks("0xabc", &["first-lesson".to_owned()], at())
    .await
    .unwrap();

  let written = s
    .record_unlocks(
      "0xabc",
      &["first-lesson".to_owned()],
      at() + Duration::days(2),
    )
    .await
    .unwrap();
  assert!(written.is_empty());

  let unlocks = s.list_unlocks("0xabc").await.unwrap();
  assert_eq!(unlocks.len(), 1);
  assert_eq!(unlocks[0].unlocked_at, at());
}

#[tokio::test]
async fn record_unlocks_empty_input_is_noop() {
  let s = store().await;
  s.get_or_create_user("0xabc", at()).await.unwrap();

  let written = s.record_unlocks("0xabc", &[], at()).await.unwrap();
  assert!(written.is_empty());
  assert!(s.list_unlocks("0xabc").await.unwrap().is_empty());
}

// ─── Engine end-to-end ───────────────────────────────────────────────────────

#[tokio::test]
async fn complete_lesson_awards_xp_and_first_achievement() {
  let s = seeded_store().await;

  let outcome =
    engine::complete_lesson(&s, DEFAULT_ACHIEVEMENTS, "0xabc", "basics-1", at())
      .await
      .unwrap();

  assert_eq!(outcome.xp_earned, 150);
  assert_eq!(outcome.new_total_xp, 150);
  assert_eq!(outcome.new_level, 1);
  assert!(!outcome.leveled_up);
  assert_eq!(outcome.new_streak, 1);
  assert_eq!(outcome.user.total_xp, 150);

  let unlocked: Vec<_> = s
    .list_unlocks("0xabc")
    .await
    .unwrap()
    .into_iter()
    .map(|u| u.achievement_id)
    .collect();
  assert_eq!(unlocked, ["first-lesson"]);
}

#[tokio::test]
async fn complete_lesson_crossing_threshold_levels_up() {
  let s = seeded_store().await;

  engine::complete_lesson(&s, DEFAULT_ACHIEVEMENTS, "0xabc", "basics-1", at())
    .await
    .unwrap();
  let outcome = engine::complete_lesson(
    &s,
    DEFAULT_ACHIEVEMENTS,
    "0xabc",
    "basics-2",
    at() + Duration::hours(3),
  )
  .await
  .unwrap();

  assert_eq!(outcome.new_total_xp, 550);
  assert_eq!(outcome.new_level, 2);
  assert!(outcome.leveled_up);
  // Same-day activity leaves the streak where it was.
  assert_eq!(outcome.new_streak, 1);
}

#[tokio::test]
async fn complete_lesson_twice_errors() {
  let s = seeded_store().await;

  engine::complete_lesson(&s, DEFAULT_ACHIEVEMENTS, "0xabc", "basics-1", at())
    .await
    .unwrap();
  let err = engine::complete_lesson(
    &s,
    DEFAULT_ACHIEVEMENTS,
    "0xabc",
    "basics-1",
    at() + Duration::hours(1),
  )
  .await
  .unwrap_err();

  assert!(matches!(err, lingo_core::Error::AlreadyCompleted { .. }));

  // XP awarded exactly once.
  let user = s.find_user("0xabc").await.unwrap().unwrap();
  assert_eq!(user.total_xp, 150);
}

#[tokio::test]
async fn complete_unknown_lesson_errors() {
  let s = seeded_store().await;

  let err =
    engine::complete_lesson(&s, DEFAULT_ACHIEVEMENTS, "0xabc", "ghost", at())
      .await
      .unwrap_err();
  assert!(matches!(err, lingo_core::Error::LessonNotFound(_)));
}

#[tokio::test]
async fn complete_lesson_rejects_empty_wallet() {
  let s = seeded_store().await;

  let err =
    engine::complete_lesson(&s, DEFAULT_ACHIEVEMENTS, "", "basics-1", at())
      .await
      .unwrap_err();
  assert!(matches!(err, lingo_core::Error::EmptyWallet));
}

#[tokio::test]
async fn user_progress_view_reports_achievements_and_activity() {
  let s = seeded_store().await;

  engine::complete_lesson(&s, DEFAULT_ACHIEVEMENTS, "0xabc", "basics-1", at())
    .await
    .unwrap();

  let view = engine::user_progress_view(
    &s,
    DEFAULT_ACHIEVEMENTS,
    "0xabc",
    at() + Duration::hours(1),
  )
  .await
  .unwrap();

  assert_eq!(view.completed_lessons, 1);
  assert_eq!(view.total_lessons, 3);
  assert_eq!(view.achievements.len(), DEFAULT_ACHIEVEMENTS.len());

  let first = view
    .achievements
    .iter()
    .find(|a| a.id == "first-lesson")
    .unwrap();
  assert!(first.unlocked);
  assert!(first.unlocked_at.is_some());

  let level5 = view.achievements.iter().find(|a| a.id == "level-5").unwrap();
  assert!(!level5.unlocked);
  assert!(level5.unlocked_at.is_none());

  assert_eq!(view.recent_activity.len(), 1);
  assert_eq!(view.recent_activity[0].lesson_id, "basics-1");
  assert_eq!(view.recent_activity[0].lesson_title, "Lesson 1");
  assert_eq!(view.recent_activity[0].xp_earned, 150);
}

#[tokio::test]
async fn path_view_tracks_unlock_chain() {
  let s = seeded_store().await;

  engine::complete_lesson(&s, DEFAULT_ACHIEVEMENTS, "0xabc", "basics-1", at())
    .await
    .unwrap();

  let view = engine::path_view(&s, "beginner", "0xabc").await.unwrap();
  assert_eq!(view.path.path_id, "beginner");
  assert_eq!(view.lessons.len(), 3);

  // Completed lesson, its unlocked successor, then a still-locked tail.
  assert!(view.lessons[0].completed);
  assert!(!view.lessons[0].locked);
  assert_eq!(view.lessons[0].xp_earned, 150);

  assert!(!view.lessons[1].completed);
  assert!(!view.lessons[1].locked);

  assert!(!view.lessons[2].completed);
  assert!(view.lessons[2].locked);
}

#[tokio::test]
async fn paths_overview_includes_progress_for_wallet() {
  let s = seeded_store().await;

  engine::complete_lesson(&s, DEFAULT_ACHIEVEMENTS, "0xabc", "basics-1", at())
    .await
    .unwrap();

  let overview = engine::paths_overview(&s, Some("0xabc")).await.unwrap();
  assert_eq!(overview.len(), 1);
  assert_eq!(overview[0].lessons.len(), 3);

  let progress = overview[0].progress.as_ref().unwrap();
  assert_eq!(progress.completed_count, 1);
  assert!((progress.percentage - 100.0 / 3.0).abs() < 1e-9);

  // Anonymous browsing carries no progress.
  let anon = engine::paths_overview(&s, None).await.unwrap();
  assert!(anon[0].progress.is_none());
}
