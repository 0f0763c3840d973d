//! Lesson and quiz content types.
//!
//! A lesson is an ordered quiz unit inside a learning path. Its content is a
//! list of typed questions; the engine treats the content as an opaque
//! payload and never grades answers server-side.

use serde::{Deserialize, Serialize};

use crate::Result;

// ─── Lesson ──────────────────────────────────────────────────────────────────

/// One quiz unit within a learning path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
  /// Human-readable slug, e.g. `blockchain-basics`.
  #[serde(rename = "id")]
  pub lesson_id: String,
  #[serde(rename = "learningPathId")]
  pub path_id:   String,
  pub title:     String,
  /// 1-based position within the path; drives sequential unlocking.
  pub order:     u32,
  /// Reward granted on completion, snapshotted into the progress row.
  pub xp_reward: u32,
  pub content:   LessonContent,
}

// ─── Content ─────────────────────────────────────────────────────────────────

/// The quiz payload of a lesson.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LessonContent {
  pub questions: Vec<Question>,
}

impl LessonContent {
  /// Serialise for the `content` database column.
  pub fn to_json(&self) -> Result<String> {
    Ok(serde_json::to_string(self)?)
  }

  /// Deserialise from the `content` database column.
  pub fn from_json(raw: &str) -> Result<Self> {
    Ok(serde_json::from_str(raw)?)
  }
}

/// A single quiz item. Serialises flat: the [`QuestionKind`] fields sit next
/// to `id`, `question` and `explanation` rather than under a nested key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
  pub id:          String,
  #[serde(rename = "question")]
  pub prompt:      String,
  /// Shown to the learner after answering, regardless of correctness.
  pub explanation: String,
  #[serde(flatten)]
  pub kind:        QuestionKind,
}

// ─── Question kinds ──────────────────────────────────────────────────────────

/// One term/definition pair of a matching question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchPair {
  pub term:       String,
  pub definition: String,
}

/// The typed body of a question, discriminated by a `type` field
/// (`"multiple-choice"`, `"true-false"`, `"fill-blank"`, `"matching"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum QuestionKind {
  MultipleChoice {
    options:        Vec<String>,
    /// Index into `options`.
    correct_answer: u32,
  },
  TrueFalse { correct_answer: bool },
  FillBlank { correct_answer: String },
  Matching { matching_pairs: Vec<MatchPair> },
}
