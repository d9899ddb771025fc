//! Wall-clock access for the outermost boundary.
//!
//! Everything below the API takes dates explicitly; only the HTTP layer and
//! the reminder loop ask a [`LocalClock`] what "today" is.

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset as _, TimeZone as _, Utc};
use chrono_tz::Tz;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
  Fixed(FixedOffset),
  /// IANA zone; the offset follows its DST rules.
  Named(Tz),
}

/// The deployment's local timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalClock {
  zone: Zone,
}

impl LocalClock {
  pub fn new(offset: FixedOffset) -> Self { Self { zone: Zone::Fixed(offset) } }

  pub fn named(tz: Tz) -> Self { Self { zone: Zone::Named(tz) } }

  /// Parse an IANA zone such as `Asia/Almaty`, or a fixed offset such as
  /// `+05:00` or `-03:30`.
  pub fn parse(zone: &str) -> Result<Self> {
    let zone = zone.trim();
    if let Ok(offset) = FixedOffset::from_str(zone) {
      return Ok(Self::new(offset));
    }
    Tz::from_str(zone)
      .map(Self::named)
      .map_err(|_| Error::InvalidTimezone(zone.to_owned()))
  }

  pub fn now_utc(&self) -> DateTime<Utc> { Utc::now() }

  pub fn now_local(&self) -> DateTime<FixedOffset> { self.local_time(Utc::now()) }

  /// `instant` in the local zone, with the offset in force at that instant.
  pub fn local_time(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
    match self.zone {
      Zone::Fixed(offset) => instant.with_timezone(&offset),
      Zone::Named(tz) => instant.with_timezone(&tz).fixed_offset(),
    }
  }

  /// The local calendar date at `instant`.
  pub fn date_at(&self, instant: DateTime<Utc>) -> NaiveDate { self.local_time(instant).date_naive() }

  /// The calendar date in the local timezone.
  pub fn today(&self) -> NaiveDate { self.date_at(Utc::now()) }

  /// Resolve a local wall-clock time to an instant. Returns `None` for times
  /// skipped by a DST change; ambiguous times resolve to the earlier instant.
  pub fn localize(&self, local: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    match self.zone {
      Zone::Fixed(offset) => offset.from_local_datetime(&local).single(),
      Zone::Named(tz) => tz.from_local_datetime(&local).earliest().map(|dt| dt.fixed_offset()),
    }
  }
}

impl Default for LocalClock {
  fn default() -> Self { Self::new(Utc.fix()) }
}
