//! Error types for `lingo-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("lesson not found: {0}")]
  LessonNotFound(String),

  #[error("learning path not found: {0}")]
  PathNotFound(String),

  #[error("lesson {lesson_id} already completed by {wallet}")]
  AlreadyCompleted { wallet: String, lesson_id: String },

  #[error("wallet address must not be empty")]
  EmptyWallet,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error crossing the store seam as [`Error::Storage`].
  pub fn storage<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
