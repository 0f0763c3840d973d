//! User — the learner record, keyed by wallet address.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A learner. The wallet address doubles as the identifier; the core treats
/// it as an opaque string already verified by an upstream auth layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  #[serde(rename = "id")]
  pub wallet:      String,
  pub total_xp:    u32,
  /// Derived from `total_xp`, stored so reads stay a single lookup.
  pub level:       u32,
  pub streak_days: u32,
  /// `None` only before the first recorded activity.
  pub last_active: Option<DateTime<Utc>>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}
