//! User — a study buddy known to the tracker.
//!
//! Users are created on first contact and never deleted. The display name is
//! overwritten on every re-registration; the creation timestamp is not.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Externally assigned, stable identifier (e.g. a chat platform user id).
pub type UserId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:    UserId,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

/// Name used for users that are unknown or registered without a name.
pub fn placeholder_name(user_id: UserId) -> String { format!("User {user_id}") }

/// Resolve the name to store for a registration: trimmed `name`, or the
/// placeholder when absent or blank.
pub fn registration_name(user_id: UserId, name: Option<&str>) -> String {
  match name.map(str::trim) {
    Some(n) if !n.is_empty() => n.to_owned(),
    _ => placeholder_name(user_id),
  }
}
