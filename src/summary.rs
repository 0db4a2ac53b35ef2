//! Rolling per-rider activity summaries.
//!
//! One pass over a rider's normalized events produces the counters and
//! trailing maxima the club report is built from. Events are scored against
//! day-windows relative to an injected reference instant, so nothing here
//! reads the wall clock and results are reproducible.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::Event;

/// Trailing window widths in days. An event exactly on a boundary is inside
/// the window.
const WINDOW_YEAR_DAYS: i64 = 365;
const WINDOW_90_DAYS: i64 = 90;
const WINDOW_60_DAYS: i64 = 60;
const WINDOW_30_DAYS: i64 = 30;

/// ---------------------------------------------------------------------------
/// Summary types
/// ---------------------------------------------------------------------------

/// Title and date of the most recent event on record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestEvent {
  pub title: String,
  pub date: DateTime<Utc>,
}

/// The most recent race on record, with the ratios it was ridden at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestRace {
  pub title: String,
  pub date: DateTime<Utc>,
  pub avg_wkg: f64,
  pub wkg_ftp: f64,
}

/// Aggregated activity for one rider at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiderSummary {
  /// Events of any kind in the last 365 days.
  pub rides_last_year: u32,
  /// Races in the last 365 days.
  pub races_last_year: u32,
  pub races_90: u32,
  pub races_30: u32,
  /// Best w/kg-vs-FTP ratio inside the trailing window; 0.0 when no event
  /// falls inside it.
  pub best_wkg_ftp_90: f64,
  pub best_wkg_ftp_60: f64,
  pub best_wkg_ftp_30: f64,
  /// Latest event over the whole history, windows notwithstanding.
  pub latest_event: Option<LatestEvent>,
  /// Latest race over the whole history.
  pub latest_race: Option<LatestRace>,
}

impl RiderSummary {
  /// Fold a rider's events into a summary relative to `now`.
  ///
  /// Input order never changes the result, except that the latest-event
  /// pointers advance on strictly newer dates only, so among events sharing
  /// a date the one seen first is kept.
  pub fn compute(events: &[Event], now: DateTime<Utc>) -> Self {
    let mut summary = Self::default();

    for event in events {
      // Whole 24-hour periods, truncated toward zero; a future-dated event
      // goes negative and lands inside every window.
      let days_ago = (now - event.date).num_days();

      if days_ago <= WINDOW_YEAR_DAYS {
        summary.rides_last_year += 1;
        if event.is_race {
          summary.races_last_year += 1;
        }
      }

      if days_ago <= WINDOW_90_DAYS {
        summary.best_wkg_ftp_90 = summary.best_wkg_ftp_90.max(event.wkg_ftp);
        if event.is_race {
          summary.races_90 += 1;
        }
      }

      if days_ago <= WINDOW_60_DAYS {
        summary.best_wkg_ftp_60 = summary.best_wkg_ftp_60.max(event.wkg_ftp);
      }

      if days_ago <= WINDOW_30_DAYS {
        summary.best_wkg_ftp_30 = summary.best_wkg_ftp_30.max(event.wkg_ftp);
        if event.is_race {
          summary.races_30 += 1;
        }
      }

      let newer_event = summary
        .latest_event
        .as_ref()
        .map_or(true, |latest| event.date > latest.date);
      if newer_event {
        summary.latest_event = Some(LatestEvent {
          title: event.title.clone(),
          date: event.date,
        });
      }

      if event.is_race {
        let newer_race = summary
          .latest_race
          .as_ref()
          .map_or(true, |latest| event.date > latest.date);
        if newer_race {
          summary.latest_race = Some(LatestRace {
            title: event.title.clone(),
            date: event.date,
            avg_wkg: event.avg_wkg,
            wkg_ftp: event.wkg_ftp,
          });
        }
      }
    }

    summary
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{event_days_ago, fixed_now};
  use chrono::Duration;

  #[test]
  fn test_mixed_history_lands_in_the_right_windows() {
    // Arrange: a race 40 days ago, a race 10 days ago, and an old free ride.
    let now = fixed_now();
    let events = vec![
      event_days_ago(now, 40, true, 1.10),
      event_days_ago(now, 10, true, 1.05),
      event_days_ago(now, 400, false, 2.0),
    ];

    // Act
    let summary = RiderSummary::compute(&events, now);

    // Assert: the old ride is outside every window, the 40-day race clears
    // the 90 and 60 day bars but not 30, the 10-day race clears them all.
    assert_eq!(summary.rides_last_year, 2);
    assert_eq!(summary.races_last_year, 2);
    assert_eq!(summary.races_90, 2);
    assert_eq!(summary.races_30, 1);
    assert_eq!(summary.best_wkg_ftp_90, 1.10);
    assert_eq!(summary.best_wkg_ftp_60, 1.10);
    assert_eq!(summary.best_wkg_ftp_30, 1.05);

    let latest = summary.latest_event.expect("latest event should be set");
    assert_eq!(latest.date, now - Duration::days(10));

    let race = summary.latest_race.expect("latest race should be set");
    assert_eq!(race.date, now - Duration::days(10));
    assert_eq!(race.wkg_ftp, 1.05);
  }

  #[test]
  fn test_empty_history_is_all_zeroes() {
    let summary = RiderSummary::compute(&[], fixed_now());

    assert_eq!(summary, RiderSummary::default());
    assert!(summary.latest_event.is_none());
    assert!(summary.latest_race.is_none());
  }

  #[test]
  fn test_events_exactly_on_a_boundary_are_inside() {
    let now = fixed_now();
    let events = vec![
      event_days_ago(now, 30, true, 1.0),
      event_days_ago(now, 60, true, 2.0),
      event_days_ago(now, 90, true, 3.0),
      event_days_ago(now, 365, true, 4.0),
    ];

    let summary = RiderSummary::compute(&events, now);

    assert_eq!(summary.rides_last_year, 4);
    assert_eq!(summary.races_last_year, 4);
    assert_eq!(summary.races_90, 3);
    assert_eq!(summary.races_30, 1);
    assert_eq!(summary.best_wkg_ftp_90, 3.0);
    assert_eq!(summary.best_wkg_ftp_60, 2.0);
    assert_eq!(summary.best_wkg_ftp_30, 1.0);
  }

  #[test]
  fn test_events_one_day_past_a_boundary_are_outside() {
    let now = fixed_now();
    let events = vec![
      event_days_ago(now, 31, true, 5.0),
      event_days_ago(now, 61, true, 6.0),
      event_days_ago(now, 91, true, 7.0),
      event_days_ago(now, 366, true, 8.0),
    ];

    let summary = RiderSummary::compute(&events, now);

    assert_eq!(summary.rides_last_year, 3);
    assert_eq!(summary.races_last_year, 3);
    assert_eq!(summary.races_90, 2);
    assert_eq!(summary.races_30, 0);
    assert_eq!(summary.best_wkg_ftp_90, 6.0);
    assert_eq!(summary.best_wkg_ftp_60, 5.0);
    assert_eq!(summary.best_wkg_ftp_30, 0.0);
  }

  #[test]
  fn test_partial_days_round_down_to_whole_days() {
    // 30 days and 23 hours ago still counts as 30 days ago.
    let now = fixed_now();
    let mut almost_31 = event_days_ago(now, 30, true, 1.2);
    almost_31.date = almost_31.date - Duration::hours(23);

    let summary = RiderSummary::compute(&[almost_31], now);

    assert_eq!(summary.races_30, 1);
    assert_eq!(summary.best_wkg_ftp_30, 1.2);
  }

  #[test]
  fn test_future_events_count_in_every_window() {
    let now = fixed_now();
    let events = vec![event_days_ago(now, -3, true, 9.9)];

    let summary = RiderSummary::compute(&events, now);

    assert_eq!(summary.rides_last_year, 1);
    assert_eq!(summary.races_last_year, 1);
    assert_eq!(summary.races_90, 1);
    assert_eq!(summary.races_30, 1);
    assert_eq!(summary.best_wkg_ftp_30, 9.9);
    assert!(summary.latest_event.is_some());
  }

  #[test]
  fn test_latest_pointers_ignore_windows() {
    // A rider whose only activity predates every window still has a latest
    // event and race.
    let now = fixed_now();
    let events = vec![event_days_ago(now, 400, true, 2.0)];

    let summary = RiderSummary::compute(&events, now);

    assert_eq!(summary.rides_last_year, 0);
    assert_eq!(summary.races_last_year, 0);
    assert_eq!(summary.best_wkg_ftp_90, 0.0);

    let latest = summary.latest_event.expect("latest event should be set");
    assert_eq!(latest.date, now - Duration::days(400));
    assert!(summary.latest_race.is_some());
  }

  #[test]
  fn test_date_ties_keep_the_first_event_seen() {
    let now = fixed_now();
    let date = now - Duration::days(5);
    let first = Event {
      date,
      is_race: false,
      title: "Morning ride".to_string(),
      avg_wkg: 2.5,
      wkg_ftp: 0.9,
    };
    let second = Event {
      date,
      is_race: false,
      title: "Evening ride".to_string(),
      avg_wkg: 2.6,
      wkg_ftp: 0.95,
    };

    let forwards = RiderSummary::compute(&[first.clone(), second.clone()], now);
    let backwards = RiderSummary::compute(&[second, first], now);

    assert_eq!(forwards.latest_event.unwrap().title, "Morning ride");
    assert_eq!(backwards.latest_event.unwrap().title, "Evening ride");
  }

  #[test]
  fn test_counters_are_order_independent() {
    let now = fixed_now();
    let mut events = vec![
      event_days_ago(now, 3, true, 1.3),
      event_days_ago(now, 25, false, 1.1),
      event_days_ago(now, 75, true, 1.4),
      event_days_ago(now, 120, true, 1.6),
      event_days_ago(now, 300, false, 1.0),
      event_days_ago(now, 400, true, 2.0),
    ];

    let forwards = RiderSummary::compute(&events, now);
    events.reverse();
    let backwards = RiderSummary::compute(&events, now);

    assert_eq!(forwards, backwards);
  }

  #[test]
  fn test_window_counts_nest() {
    let now = fixed_now();
    let events = vec![
      event_days_ago(now, -2, true, 1.2),
      event_days_ago(now, 3, true, 1.3),
      event_days_ago(now, 25, false, 1.1),
      event_days_ago(now, 40, true, 1.4),
      event_days_ago(now, 75, true, 1.5),
      event_days_ago(now, 120, true, 1.6),
      event_days_ago(now, 300, false, 1.0),
    ];

    let summary = RiderSummary::compute(&events, now);

    assert!(summary.races_30 <= summary.races_90);
    assert!(summary.races_90 <= summary.races_last_year);
    assert!(summary.races_last_year <= summary.rides_last_year);
    assert!(summary.best_wkg_ftp_30 <= summary.best_wkg_ftp_60);
    assert!(summary.best_wkg_ftp_60 <= summary.best_wkg_ftp_90);
  }

  #[test]
  fn test_epoch_dated_events_stay_out_of_windows_but_can_be_latest() {
    // An undated event normalizes to the epoch: decades outside every
    // window, yet still the only candidate for the latest pointers.
    let now = fixed_now();
    let undated = Event {
      date: DateTime::UNIX_EPOCH,
      is_race: true,
      title: "Lost to time".to_string(),
      avg_wkg: 2.0,
      wkg_ftp: 1.0,
    };

    let summary = RiderSummary::compute(&[undated], now);

    assert_eq!(summary.rides_last_year, 0);
    assert_eq!(summary.races_last_year, 0);
    assert_eq!(summary.latest_event.unwrap().title, "Lost to time");
    assert_eq!(summary.latest_race.unwrap().date, DateTime::UNIX_EPOCH);
  }
}
