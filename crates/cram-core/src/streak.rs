//! Streak state and its forward-only transition.
//!
//! A streak only ever extends or restarts in response to a qualifying
//! completion. It is never recomputed from history and never retracted when a
//! task is later unmarked.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::user::UserId;

/// Running and best-ever streak for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
  pub user_id:              UserId,
  /// Consecutive qualifying days ending at `last_completion_date`.
  pub current:              u32,
  /// Largest `current` ever observed; always `>= current`.
  pub best:                 u32,
  pub last_completion_date: Option<NaiveDate>,
}

/// What a qualifying completion did to the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakTransition {
  /// First qualifying day ever.
  Started,
  /// Day after the previous qualifying day.
  Extended,
  /// Same day as the previous qualifying day.
  Unchanged,
  /// A gap, or a date before the previous qualifying day.
  Reset,
}

impl StreakState {
  pub fn new(user_id: UserId) -> Self {
    Self { user_id, current: 0, best: 0, last_completion_date: None }
  }

  /// Apply a qualifying completion on `date`.
  pub fn advance(&mut self, date: NaiveDate) -> StreakTransition {
    let transition = match self.last_completion_date {
      None => {
        self.current = 1;
        StreakTransition::Started
      }
      Some(last) => match date.signed_duration_since(last).num_days() {
        1 => {
          self.current += 1;
          StreakTransition::Extended
        }
        0 => StreakTransition::Unchanged,
        _ => {
          self.current = 1;
          StreakTransition::Reset
        }
      },
    };

    self.best = self.best.max(self.current);
    self.last_completion_date = Some(date);
    transition
  }
}

/// A day qualifies once the completed count reaches the expected count.
pub fn is_day_complete(completed: usize, expected: usize) -> bool { completed >= expected }

/// Gate on day completeness, then advance. Returns `None` (state untouched)
/// when the day does not qualify.
pub fn recompute(
  state: &mut StreakState,
  date: NaiveDate,
  completed: usize,
  expected: usize,
) -> Option<StreakTransition> {
  is_day_complete(completed, expected).then(|| state.advance(date))
}

#[cfg(test)]
mod tests {
  use chrono::Days;

  use super::*;

  fn day(n: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap() + Days::new(n)
  }

  fn state_at(current: u32, best: u32, last: NaiveDate) -> StreakState {
    StreakState { user_id: 1, current, best, last_completion_date: Some(last) }
  }

  #[test]
  fn first_qualifying_day_starts_streak() {
    let mut s = StreakState::new(1);
    assert_eq!(s.advance(day(0)), StreakTransition::Started);
    assert_eq!((s.current, s.best), (1, 1));
    assert_eq!(s.last_completion_date, Some(day(0)));
  }

  #[test]
  fn consecutive_day_extends() {
    let mut s = state_at(5, 5, day(0));
    assert_eq!(s.advance(day(1)), StreakTransition::Extended);
    assert_eq!((s.current, s.best), (6, 6));
  }

  #[test]
  fn gap_resets_but_keeps_best() {
    let mut s = state_at(5, 5, day(0));
    assert_eq!(s.advance(day(2)), StreakTransition::Reset);
    assert_eq!((s.current, s.best), (1, 5));
    assert_eq!(s.last_completion_date, Some(day(2)));
  }

  #[test]
  fn same_day_is_idempotent() {
    let mut s = state_at(3, 4, day(1));
    assert_eq!(s.advance(day(1)), StreakTransition::Unchanged);
    assert_eq!(s, state_at(3, 4, day(1)));
  }

  #[test]
  fn backfilled_date_resets() {
    let mut s = state_at(4, 4, day(5));
    assert_eq!(s.advance(day(3)), StreakTransition::Reset);
    assert_eq!((s.current, s.best), (1, 4));
    assert_eq!(s.last_completion_date, Some(day(3)));
  }

  #[test]
  fn incomplete_day_does_not_touch_state() {
    let mut s = state_at(2, 2, day(0));
    assert_eq!(recompute(&mut s, day(1), 4, 5), None);
    assert_eq!(s, state_at(2, 2, day(0)));

    assert_eq!(recompute(&mut s, day(1), 5, 5), Some(StreakTransition::Extended));
    assert_eq!(s.current, 3);
  }

  #[test]
  fn best_never_decreases() {
    let offsets = [0, 1, 2, 2, 5, 6, 3, 4, 5, 6, 7, 20];
    let mut s = StreakState::new(1);
    let mut prev_best = 0;
    for n in offsets {
      s.advance(day(n));
      assert!(s.best >= s.current);
      assert!(s.best >= prev_best);
      prev_best = s.best;
    }
  }
}
