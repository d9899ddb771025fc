//! Morning and afternoon checklist reminders.
//!
//! The dispatcher reads only the task catalog and the clock. A failed
//! delivery is logged and the loop carries on with the next slot.

use std::{fmt::Write as _, sync::Arc};

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime};
use cram_core::{
  catalog::{Phase, TaskCatalog},
  clock::LocalClock,
};

use crate::{Error, ReminderConfig, Result, notify::Notifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
  Morning,
  Afternoon,
}

impl ReminderKind {
  fn phase(self) -> Phase {
    match self {
      Self::Morning => Phase::Morning,
      Self::Afternoon => Phase::Afternoon,
    }
  }
}

// ─── Schedule ─────────────────────────────────────────────────────────────────

/// Local times at which each reminder fires, every day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSchedule {
  pub morning:   NaiveTime,
  pub afternoon: NaiveTime,
}

fn parse_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|_| Error::InvalidTime(s.to_owned()))
}

impl ReminderSchedule {
  pub fn from_config(cfg: &ReminderConfig) -> Result<Self> {
    Ok(Self { morning: parse_time(&cfg.morning)?, afternoon: parse_time(&cfg.afternoon)? })
  }

  /// The first reminder strictly after `now`, with slot times read in
  /// `clock`'s zone. A slot skipped by a DST change does not fire that day.
  pub fn next_after(
    &self,
    clock: &LocalClock,
    now: DateTime<FixedOffset>,
  ) -> (ReminderKind, DateTime<FixedOffset>) {
    let today = now.date_naive();
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);

    [today, tomorrow]
      .into_iter()
      .flat_map(|day| {
        [(ReminderKind::Morning, self.morning), (ReminderKind::Afternoon, self.afternoon)]
          .map(|(kind, time)| (kind, day.and_time(time)))
      })
      .filter_map(|(kind, local)| Some((kind, clock.localize(local)?)))
      .filter(|(_, at)| *at > now)
      .min_by_key(|(_, at)| *at)
      // Only reachable at the end of chrono's date range.
      .unwrap_or((ReminderKind::Morning, now))
  }
}

// ─── Message text ─────────────────────────────────────────────────────────────

/// Reminder text for `kind` on `date`.
pub fn compose(kind: ReminderKind, catalog: &TaskCatalog, date: NaiveDate) -> String {
  let mut text = String::new();
  let title = match kind {
    ReminderKind::Morning => "Morning reminder",
    ReminderKind::Afternoon => "Afternoon reminder",
  };
  let _ = writeln!(text, "{title} - {}", date.format("%d.%m.%Y"));

  match kind {
    ReminderKind::Morning if catalog.is_mock_test_day(date) => {
      let _ = writeln!(text, "Mock test day!");
    }
    ReminderKind::Afternoon if catalog.is_rest_day(date) => {
      let _ = writeln!(text, "Light mode today.");
    }
    _ => {}
  }

  let _ = writeln!(text, "\nTasks:");
  for task in catalog.tasks_in(kind.phase()) {
    let _ = writeln!(text, "- {}", catalog.label_for(&task.id, date));
  }
  text.push_str("\nMark tasks as done to keep your streak going.");
  text
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

/// Deliver `text`, logging instead of propagating a failure. Returns whether
/// delivery succeeded.
pub async fn deliver_best_effort<N: Notifier>(notifier: &N, kind: ReminderKind, text: &str) -> bool {
  match notifier.deliver(text).await {
    Ok(()) => {
      tracing::info!(?kind, "reminder sent");
      true
    }
    Err(e) => {
      tracing::warn!(?kind, error = %e, "reminder delivery failed");
      false
    }
  }
}

/// Sleep until each reminder slot and send it. Never returns.
pub async fn run<N: Notifier>(
  schedule: ReminderSchedule,
  catalog: Arc<TaskCatalog>,
  clock: LocalClock,
  notifier: N,
) {
  tracing::info!(morning = %schedule.morning, afternoon = %schedule.afternoon, "reminders scheduled");
  loop {
    let now = clock.now_local();
    let (kind, at) = schedule.next_after(&clock, now);
    let wait = (at - now).to_std().unwrap_or_default();
    tracing::debug!(?kind, %at, "waiting for next reminder");
    tokio::time::sleep(wait).await;

    let text = compose(kind, &catalog, at.date_naive());
    deliver_best_effort(&notifier, kind, &text).await;
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use super::*;

  fn schedule() -> ReminderSchedule {
    ReminderSchedule::from_config(&ReminderConfig::default()).unwrap()
  }

  fn at(s: &str) -> DateTime<FixedOffset> { DateTime::parse_from_rfc3339(s).unwrap() }

  fn day(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

  #[test]
  fn rejects_bad_times() {
    let cfg = ReminderConfig { morning: "9am".into(), ..ReminderConfig::default() };
    assert!(matches!(ReminderSchedule::from_config(&cfg), Err(Error::InvalidTime(t)) if t == "9am"));
  }

  #[test]
  fn next_slot_is_picked_in_order() {
    let s = schedule();
    let clock = LocalClock::parse("+05:00").unwrap();
    assert_eq!(
      s.next_after(&clock, at("2024-03-04T07:00:00+05:00")),
      (ReminderKind::Morning, at("2024-03-04T09:00:00+05:00"))
    );
    assert_eq!(
      s.next_after(&clock, at("2024-03-04T09:00:00+05:00")),
      (ReminderKind::Afternoon, at("2024-03-04T14:30:00+05:00"))
    );
    assert_eq!(
      s.next_after(&clock, at("2024-03-04T20:00:00+05:00")),
      (ReminderKind::Morning, at("2024-03-05T09:00:00+05:00"))
    );
  }

  #[test]
  fn slots_keep_wall_clock_time_across_dst() {
    let s = schedule();
    let berlin = LocalClock::parse("Europe/Berlin").unwrap();
    // Evening before the clocks go forward: tomorrow's 09:00 is CEST.
    assert_eq!(
      s.next_after(&berlin, at("2024-03-30T20:00:00+01:00")),
      (ReminderKind::Morning, at("2024-03-31T09:00:00+02:00"))
    );
    assert_eq!(
      s.next_after(&berlin, at("2024-10-27T10:00:00+01:00")),
      (ReminderKind::Afternoon, at("2024-10-27T14:30:00+01:00"))
    );
  }

  #[test]
  fn morning_text_lists_morning_tasks() {
    let catalog = TaskCatalog::default();
    let text = compose(ReminderKind::Morning, &catalog, day(2024, 3, 4));
    assert!(text.starts_with("Morning reminder - 04.03.2024"));
    assert!(text.contains("- Reading (60-90 min)"));
    assert!(text.contains("- Listening (30-45 min)"));
    assert!(!text.contains("Speaking"));
    assert!(!text.contains("Mock test"));

    let saturday = compose(ReminderKind::Morning, &catalog, day(2024, 3, 9));
    assert!(saturday.contains("Mock test day!"));
  }

  #[test]
  fn afternoon_text_uses_weekday_writing_label() {
    let catalog = TaskCatalog::default();
    let tuesday = compose(ReminderKind::Afternoon, &catalog, day(2024, 3, 5));
    assert!(tuesday.contains("- Writing (Task 1)"));
    assert!(tuesday.contains("- Articles (10 min)"));
    assert!(!tuesday.contains("Reading"));

    let sunday = compose(ReminderKind::Afternoon, &catalog, day(2024, 3, 10));
    assert!(sunday.contains("Light mode today."));
    assert!(sunday.contains("- Writing (rest)"));
  }

  struct FailingNotifier {
    attempts: AtomicUsize,
  }

  impl Notifier for FailingNotifier {
    async fn deliver(&self, _text: &str) -> Result<()> {
      self.attempts.fetch_add(1, Ordering::SeqCst);
      Err(Error::Delivery("chat unreachable".into()))
    }
  }

  #[tokio::test]
  async fn delivery_failures_are_swallowed() {
    let notifier = FailingNotifier { attempts: AtomicUsize::new(0) };
    assert!(!deliver_best_effort(&notifier, ReminderKind::Morning, "hi").await);
    assert!(!deliver_best_effort(&notifier, ReminderKind::Afternoon, "hi").await);
    assert_eq!(notifier.attempts.load(Ordering::SeqCst), 2);

    assert!(deliver_best_effort(&crate::notify::LogNotifier, ReminderKind::Morning, "hi").await);
  }
}
