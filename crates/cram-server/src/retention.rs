//! Daily sweep that prunes old completion rows.

use std::{sync::Arc, time::Duration};

use cram_core::{Tracker, clock::LocalClock, store::TrackerStore};

const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Prune once immediately, then once a day. Never returns; storage errors are
/// logged and retried at the next sweep.
pub async fn run<S: TrackerStore>(tracker: Arc<Tracker<S>>, clock: LocalClock, retain_days: u32) {
  let mut interval = tokio::time::interval(SWEEP_INTERVAL);
  loop {
    interval.tick().await;
    if let Err(e) = tracker.prune_before(retain_days, clock.today()).await {
      tracing::error!(error = %e, "retention sweep failed");
    }
  }
}
