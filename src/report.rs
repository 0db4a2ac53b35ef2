//! Spreadsheet rows for the club report.
//!
//! Pure formatting: a `RiderSummary` plus roster identity in, one row of
//! cells out. Column order is a contract with the sheet the report feeds.

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::summary::RiderSummary;
use crate::zwiftpower;

/// Column headers matching `rider_row`, for sheets that want a first row.
pub const HEADERS: [&str; 14] = [
  "Name",
  "ZwiftPower ID",
  "Latest event date",
  "When",
  "Latest event",
  "Rides (1y)",
  "Profile",
  "Best w/kg FTP (30d)",
  "Best w/kg FTP (90d)",
  "Races (30d)",
  "Races (90d)",
  "Races (1y)",
  "Latest race",
  "Latest race date",
];

/// Human phrase for how long ago the rider's latest event was.
///
/// Within the last year the phrase counts calendar months, not elapsed
/// days, so late June against early June of the previous year still reads
/// "This month".
pub fn months_ago(latest_event: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
  let latest = match latest_event {
    Some(latest) => latest,
    None => return "No latest event".to_string(),
  };

  if now - latest > Duration::days(365) {
    return "Over a year ago".to_string();
  }

  let mut months = now.month() as i32 - latest.month() as i32;
  if months < 0 {
    months += 12;
  }

  match months {
    0 => "This month".to_string(),
    1 => "Last month".to_string(),
    n => format!("{} months ago", n),
  }
}

/// One report row for a rider. Unset dates and titles render as empty
/// cells; the ratio cells always carry one fractional digit.
pub fn rider_row(name: &str, zwid: i64, summary: &RiderSummary, now: DateTime<Utc>) -> Vec<String> {
  let latest_event_date = summary.latest_event.as_ref().map(|event| event.date);
  let latest_event_title = summary
    .latest_event
    .as_ref()
    .map(|event| event.title.clone())
    .unwrap_or_default();
  let latest_race_title = summary
    .latest_race
    .as_ref()
    .map(|race| race.title.clone())
    .unwrap_or_default();
  let latest_race_date = summary.latest_race.as_ref().map(|race| race.date);

  vec![
    name.to_string(),
    zwid.to_string(),
    date_cell(latest_event_date),
    months_ago(latest_event_date, now),
    latest_event_title,
    summary.rides_last_year.to_string(),
    zwiftpower::profile_url(zwid),
    format!("{:.1}", summary.best_wkg_ftp_30),
    format!("{:.1}", summary.best_wkg_ftp_90),
    summary.races_30.to_string(),
    summary.races_90.to_string(),
    summary.races_last_year.to_string(),
    latest_race_title,
    date_cell(latest_race_date),
  ]
}

fn date_cell(date: Option<DateTime<Utc>>) -> String {
  date
    .map(|date| date.format("%Y-%m-%d").to_string())
    .unwrap_or_default()
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
