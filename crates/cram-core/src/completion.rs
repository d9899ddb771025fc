//! Completion records and the day/week views derived from them.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::user::UserId;

/// Length of the trailing statistics window, reference day included.
pub const WEEK_DAYS: u64 = 7;

/// One (user, day, task) completion flag. Writing the same key again
/// overwrites the record in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
  pub user_id:      UserId,
  pub date:         NaiveDate,
  pub task_id:      String,
  pub completed:    bool,
  /// Set only while `completed` is true.
  pub completed_at: Option<DateTime<Utc>>,
}

impl CompletionRecord {
  pub fn new(
    user_id: UserId,
    date: NaiveDate,
    task_id: impl Into<String>,
    completed: bool,
    now: DateTime<Utc>,
  ) -> Self {
    Self {
      user_id,
      date,
      task_id: task_id.into(),
      completed,
      completed_at: completed.then_some(now),
    }
  }
}

/// Task id → completed flag for one user and day. Only tasks with an explicit
/// record appear; a missing key means "not yet acted on".
pub type DayStatus = BTreeMap<String, bool>;

/// Task id → number of completed days within a week window. Tasks never
/// completed in the window are absent.
pub type WeeklyCounts = BTreeMap<String, u32>;

/// The inclusive window `[reference − 6 days, reference]`.
pub fn week_window(reference: NaiveDate) -> (NaiveDate, NaiveDate) {
  let from = reference
    .checked_sub_days(Days::new(WEEK_DAYS - 1))
    .unwrap_or(NaiveDate::MIN);
  (from, reference)
}
