//! Read models returned by the [`Tracker`](crate::Tracker) — never stored,
//! always derived.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  completion::{CompletionRecord, WeeklyCounts},
  streak::{StreakState, StreakTransition},
  user::UserId,
};

/// Current and best streak, `(0, 0)` for users without a streak row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
  pub current: u32,
  pub best:    u32,
}

impl From<&StreakState> for Streak {
  fn from(s: &StreakState) -> Self { Self { current: s.current, best: s.best } }
}

/// One user's progress on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
  pub user_id:        UserId,
  pub name:           String,
  pub date:           NaiveDate,
  /// Completed tasks that belong to the catalog.
  pub completed:      usize,
  pub total_expected: usize,
  pub current_streak: u32,
  pub best_streak:    u32,
}

impl DaySummary {
  /// Fraction of expected tasks completed, in `[0, 1]`.
  pub fn ratio(&self) -> f64 {
    if self.total_expected == 0 {
      return 0.0;
    }
    (self.completed.min(self.total_expected)) as f64 / self.total_expected as f64
  }

  pub fn is_complete(&self) -> bool { self.completed >= self.total_expected }
}

/// Per-task completion counts over the trailing week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySummary {
  pub user_id: UserId,
  pub from:    NaiveDate,
  pub to:      NaiveDate,
  pub counts:  WeeklyCounts,
}

impl WeeklySummary {
  pub fn count_for(&self, task_id: &str) -> u32 {
    self.counts.get(task_id).copied().unwrap_or(0)
  }
}

/// Result of a completion write: the stored record, and what the streak
/// looks like afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionOutcome {
  pub record:     CompletionRecord,
  /// `None` when the write did not complete the day (or unmarked a task).
  pub transition: Option<StreakTransition>,
  pub streak:     Streak,
}
