//! [`Tracker`] — the progress-tracking engine.
//!
//! Ties a [`TrackerStore`] to the [`TaskCatalog`]: completion writes trigger
//! streak recomputes, and the statistics views are projected from the store
//! on every call. No method reads the wall clock; callers pass the date.

use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::{
  catalog::TaskCatalog,
  completion::{CompletionRecord, DayStatus, WeeklyCounts, week_window},
  store::TrackerStore,
  summary::{CompletionOutcome, DaySummary, Streak, WeeklySummary},
  user::{User, UserId, placeholder_name, registration_name},
};

pub struct Tracker<S> {
  store:   S,
  catalog: Arc<TaskCatalog>,
}

impl<S: TrackerStore> Tracker<S> {
  pub fn new(store: S, catalog: Arc<TaskCatalog>) -> Self { Self { store, catalog } }

  pub fn store(&self) -> &S { &self.store }

  pub fn catalog(&self) -> &TaskCatalog { &self.catalog }

  // ── Registry ──────────────────────────────────────────────────────────────

  /// Register `user_id`, or rename it if already known. A missing or blank
  /// name is replaced by the placeholder.
  pub async fn register_user(
    &self,
    user_id: UserId,
    name: Option<&str>,
    now: DateTime<Utc>,
  ) -> Result<User, S::Error> {
    let name = registration_name(user_id, name);
    let user = self.store.upsert_user(user_id, name, now).await?;
    tracing::debug!(user_id, name = %user.name, "registered user");
    Ok(user)
  }

  /// Stored name for `user_id`, or the placeholder when unknown.
  pub async fn display_name(&self, user_id: UserId) -> Result<String, S::Error> {
    Ok(
      self
        .store
        .get_user(user_id)
        .await?
        .map(|u| u.name)
        .unwrap_or_else(|| placeholder_name(user_id)),
    )
  }

  pub async fn list_users(&self) -> Result<Vec<User>, S::Error> { self.store.list_users().await }

  // ── Completions ───────────────────────────────────────────────────────────

  /// Record `completed` for `task_id` on `date`. Marking a task done runs the
  /// streak recompute once the write is durable; unmarking never touches the
  /// streak.
  pub async fn set_completion(
    &self,
    user_id: UserId,
    date: NaiveDate,
    task_id: &str,
    completed: bool,
    now: DateTime<Utc>,
  ) -> Result<CompletionOutcome, S::Error> {
    let record = self
      .store
      .set_completion(CompletionRecord::new(user_id, date, task_id, completed, now))
      .await?;

    if !completed {
      let streak = self.get_streak(user_id).await?;
      return Ok(CompletionOutcome { record, transition: None, streak });
    }

    let expected = self.catalog.expected_tasks(date).len();
    let (transition, state) = self.store.recompute_streak(user_id, date, expected).await?;
    if let Some(t) = transition {
      tracing::info!(
        user_id,
        %date,
        transition = ?t,
        current = state.current,
        best = state.best,
        "day complete"
      );
    }

    Ok(CompletionOutcome { record, transition, streak: Streak::from(&state) })
  }

  /// Flip the flag for `task_id` on `date`; a task never acted on counts as
  /// not done.
  pub async fn toggle_task(
    &self,
    user_id: UserId,
    date: NaiveDate,
    task_id: &str,
    now: DateTime<Utc>,
  ) -> Result<CompletionOutcome, S::Error> {
    let status = self.store.get_status(user_id, date).await?;
    let completed = !status.get(task_id).copied().unwrap_or(false);
    self.set_completion(user_id, date, task_id, completed, now).await
  }

  pub async fn get_status(&self, user_id: UserId, date: NaiveDate) -> Result<DayStatus, S::Error> {
    self.store.get_status(user_id, date).await
  }

  pub async fn count_completed(&self, user_id: UserId, date: NaiveDate) -> Result<usize, S::Error> {
    self.store.count_completed(user_id, date).await
  }

  pub async fn weekly_counts(
    &self,
    user_id: UserId,
    reference: NaiveDate,
  ) -> Result<WeeklyCounts, S::Error> {
    self.store.weekly_counts(user_id, reference).await
  }

  /// Current and best streak; `(0, 0)` for users the store has never seen.
  pub async fn get_streak(&self, user_id: UserId) -> Result<Streak, S::Error> {
    Ok(
      self
        .store
        .get_streak(user_id)
        .await?
        .as_ref()
        .map(Streak::from)
        .unwrap_or_default(),
    )
  }

  // ── Statistics ────────────────────────────────────────────────────────────

  pub async fn today_summary(&self, user_id: UserId, date: NaiveDate) -> Result<DaySummary, S::Error> {
    let name = self.display_name(user_id).await?;
    self.summarize(user_id, name, date).await
  }

  pub async fn weekly_summary_by_task(
    &self,
    user_id: UserId,
    reference: NaiveDate,
  ) -> Result<WeeklySummary, S::Error> {
    let (from, to) = week_window(reference);
    let counts = self.store.weekly_counts(user_id, reference).await?;
    Ok(WeeklySummary { user_id, from, to, counts })
  }

  /// One summary per registered user, in registration order.
  pub async fn progress_board(&self, date: NaiveDate) -> Result<Vec<DaySummary>, S::Error> {
    let users = self.store.list_users().await?;
    let mut board = Vec::with_capacity(users.len());
    for user in users {
      board.push(self.summarize(user.user_id, user.name, date).await?);
    }
    Ok(board)
  }

  async fn summarize(
    &self,
    user_id: UserId,
    name: String,
    date: NaiveDate,
  ) -> Result<DaySummary, S::Error> {
    let expected = self.catalog.expected_tasks(date);
    let status = self.store.get_status(user_id, date).await?;
    let completed = expected
      .iter()
      .filter(|id| status.get(**id).copied().unwrap_or(false))
      .count();
    let streak = self.get_streak(user_id).await?;

    Ok(DaySummary {
      user_id,
      name,
      date,
      completed,
      total_expected: expected.len(),
      current_streak: streak.current,
      best_streak: streak.best,
    })
  }

  // ── Retention ─────────────────────────────────────────────────────────────

  /// Drop completion records older than `retain_days` days before `today`.
  /// Streaks are unaffected.
  pub async fn prune_before(&self, retain_days: u32, today: NaiveDate) -> Result<usize, S::Error> {
    let cutoff = today
      .checked_sub_days(Days::new(u64::from(retain_days)))
      .unwrap_or(NaiveDate::MIN);
    let removed = self.store.prune_completions(cutoff).await?;
    tracing::info!(%cutoff, removed, "pruned completion records");
    Ok(removed)
  }
}
