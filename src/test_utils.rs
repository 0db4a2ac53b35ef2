//! Shared fixtures for the unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::events::Event;

/// A fixed reference instant, so window math in tests never races midnight.
pub fn fixed_now() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

/// Event dated `days` before `now`; negative puts it in the future.
pub fn event_days_ago(now: DateTime<Utc>, days: i64, is_race: bool, wkg_ftp: f64) -> Event {
  let kind = if is_race { "Race" } else { "Ride" };
  Event {
    date: now - Duration::days(days),
    is_race,
    title: format!("{} {} days back", kind, days),
    avg_wkg: 2.8,
    wkg_ftp,
  }
}
