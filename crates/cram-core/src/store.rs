//! The `TrackerStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `cram-store-sqlite`).
//! The [`Tracker`](crate::Tracker) and the HTTP layer depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
  completion::{CompletionRecord, DayStatus, WeeklyCounts},
  streak::{StreakState, StreakTransition},
  user::{User, UserId},
};

/// Abstraction over durable tracker storage.
///
/// Every write is durable before its future resolves. Nothing is cached:
/// every read goes to the store of record.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait TrackerStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Insert the user, or overwrite the name of an existing one. Creation time
  /// and registration order are preserved. Also creates a zeroed
  /// [`StreakState`] if none exists.
  fn upsert_user(
    &self,
    user_id: UserId,
    name: String,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// All users, first-registered first.
  fn list_users(&self) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  // ── Completions ───────────────────────────────────────────────────────

  /// Upsert the record for `(user_id, date, task_id)`. The task id is not
  /// checked against any catalog.
  fn set_completion(
    &self,
    record: CompletionRecord,
  ) -> impl Future<Output = Result<CompletionRecord, Self::Error>> + Send + '_;

  fn get_status(
    &self,
    user_id: UserId,
    date: NaiveDate,
  ) -> impl Future<Output = Result<DayStatus, Self::Error>> + Send + '_;

  /// Number of records for `(user_id, date)` with `completed = true`.
  fn count_completed(
    &self,
    user_id: UserId,
    date: NaiveDate,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Completed counts per task over `[reference − 6 days, reference]`.
  fn weekly_counts(
    &self,
    user_id: UserId,
    reference: NaiveDate,
  ) -> impl Future<Output = Result<WeeklyCounts, Self::Error>> + Send + '_;

  /// Delete completion records dated strictly before `cutoff`. Returns the
  /// number of rows removed.
  fn prune_completions(
    &self,
    cutoff: NaiveDate,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Streaks ───────────────────────────────────────────────────────────

  fn get_streak(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Option<StreakState>, Self::Error>> + Send + '_;

  /// Run [`streak::recompute`](crate::streak::recompute) for `date` as one
  /// atomic read-modify-write: count completions, load (or create) the
  /// streak, advance it if the day is complete, persist.
  ///
  /// Returns the transition (if any) and the resulting state.
  fn recompute_streak(
    &self,
    user_id: UserId,
    date: NaiveDate,
    expected: usize,
  ) -> impl Future<Output = Result<(Option<StreakTransition>, StreakState), Self::Error>>
  + Send
  + '_;
}
