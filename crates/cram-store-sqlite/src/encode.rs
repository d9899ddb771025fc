//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Calendar days are stored as `YYYY-MM-DD` so that lexical order matches
//! date order. Timestamps are stored as RFC 3339 strings.

use chrono::{DateTime, NaiveDate, Utc};
use cram_core::{streak::StreakState, user::User};

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Counts ──────────────────────────────────────────────────────────────────

pub fn decode_count<T: TryFrom<i64>>(n: i64) -> Result<T> {
  T::try_from(n).map_err(|_| Error::Count(n))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_id:    i64,
  pub name:       String,
  pub created_at: String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    self.user_id,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `streaks` row.
pub struct RawStreak {
  pub user_id:              i64,
  pub current:              i64,
  pub best:                 i64,
  pub last_completion_date: Option<String>,
}

impl RawStreak {
  pub fn into_state(self) -> Result<StreakState> {
    Ok(StreakState {
      user_id:              self.user_id,
      current:              decode_count(self.current)?,
      best:                 decode_count(self.best)?,
      last_completion_date: self.last_completion_date.as_deref().map(decode_date).transpose()?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dates_sort_lexically() {
    let a = encode_date(NaiveDate::from_ymd_opt(2024, 9, 30).unwrap());
    let b = encode_date(NaiveDate::from_ymd_opt(2024, 10, 1).unwrap());
    assert_eq!(a, "2024-09-30");
    assert!(a < b);
    assert_eq!(decode_date(&b).unwrap(), NaiveDate::from_ymd_opt(2024, 10, 1).unwrap());
  }

  #[test]
  fn bad_values_are_reported() {
    assert!(matches!(decode_date("30/09/2024"), Err(Error::DateParse(_))));
    assert!(matches!(decode_count::<u32>(-1), Err(Error::Count(-1))));
  }
}
