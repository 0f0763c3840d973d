//! Built-in curriculum seeding.
//!
//! The curriculum shipped with the binary lives in `data/curriculum.json`
//! and is compiled in. Seeding upserts every path and lesson through the
//! store, so re-running it refreshes content without touching user rows,
//! progress or unlocks.

use anyhow::Context as _;
use lingo_core::{lesson::Lesson, path::LearningPath, store::LearnStore};
use serde::Deserialize;

const CURRICULUM_JSON: &str = include_str!("../data/curriculum.json");

#[derive(Debug, Deserialize)]
struct Curriculum {
  paths:   Vec<LearningPath>,
  lessons: Vec<Lesson>,
}

/// Upsert the bundled curriculum into `store`.
///
/// Returns the number of paths and lessons written.
pub async fn load<S: LearnStore>(store: &S) -> anyhow::Result<(usize, usize)> {
  let curriculum: Curriculum = serde_json::from_str(CURRICULUM_JSON)
    .context("bundled curriculum is invalid")?;

  for path in &curriculum.paths {
    store
      .put_path(path)
      .await
      .with_context(|| format!("failed to write path {}", path.path_id))?;
  }
  for lesson in &curriculum.lessons {
    store
      .put_lesson(lesson)
      .await
      .with_context(|| format!("failed to write lesson {}", lesson.lesson_id))?;
  }

  Ok((curriculum.paths.len(), curriculum.lessons.len()))
}
