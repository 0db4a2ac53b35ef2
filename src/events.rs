//! ZwiftPower event records and their normalization.
//!
//! The profile feed is loosely typed: dates are sometimes empty strings and
//! the ratio columns arrive as single-element arrays holding either a number
//! or a numeric string. Everything downstream works with the canonical
//! `Event` produced here, so the ambiguity is resolved exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ---------------------------------------------------------------------------
/// Raw wire shapes
/// ---------------------------------------------------------------------------

/// One event row from `cache3/profile/{zwid}_all.json`, as served.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
  /// Event type label; races carry "RACE" somewhere in this string.
  #[serde(rename = "f_t", default)]
  pub event_type: String,

  /// Seconds since the epoch, except when the feed sends "" or junk.
  #[serde(default)]
  pub event_date: RawTimestamp,

  #[serde(default)]
  pub event_title: String,

  /// Average w/kg for the event; only the first element carries the value.
  #[serde(default)]
  pub avg_wkg: Vec<RawNumber>,

  /// w/kg relative to the rider's FTP; only the first element carries the value.
  #[serde(default)]
  pub wkg_ftp: Vec<RawNumber>,
}

/// A numeric cell that may arrive as a JSON number or as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
  Number(f64),
  Text(String),
}

/// An event timestamp as served: usually epoch seconds, occasionally "".
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
  Seconds(i64),
  Text(String),
}

impl Default for RawTimestamp {
  fn default() -> Self {
    RawTimestamp::Text(String::new())
  }
}

impl RawTimestamp {
  /// Resolve to an instant; unknown or unreadable dates collapse to the epoch.
  pub fn to_utc(&self) -> DateTime<Utc> {
    let secs = match self {
      RawTimestamp::Seconds(secs) => *secs,
      RawTimestamp::Text(text) => text.trim().parse().unwrap_or(0),
    };
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH)
  }
}

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

/// Which ratio column a normalization failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioField {
  AvgWkg,
  WkgFtp,
}

impl RatioField {
  pub fn as_str(&self) -> &'static str {
    match self {
      RatioField::AvgWkg => "avg_wkg",
      RatioField::WkgFtp => "wkg_ftp",
    }
  }
}

impl fmt::Display for RatioField {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A ratio column whose leading element was missing or not a number.
///
/// Unknown dates are tolerated; an unreadable ratio never degrades to a
/// zero that would flow into the rolling maxima. The caller picks the
/// recovery policy, usually dropping the event or failing the rider.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedRatio {
  #[error("event {event_title:?}: {field} column is empty")]
  Missing { field: RatioField, event_title: String },

  #[error("event {event_title:?}: {field} value {value:?} is not numeric")]
  NotNumeric {
    field: RatioField,
    event_title: String,
    value: String,
  },
}

/// ---------------------------------------------------------------------------
/// Normalized events
/// ---------------------------------------------------------------------------

/// A canonical event: one ZwiftPower result with its ambiguity resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
  pub date: DateTime<Utc>,
  pub is_race: bool,
  pub title: String,
  /// Average w/kg reported for the event.
  pub avg_wkg: f64,
  /// w/kg relative to the rider's FTP at the time.
  pub wkg_ftp: f64,
}

impl Event {
  /// Normalize one raw record.
  ///
  /// Unreadable dates degrade to the epoch; unreadable ratio columns are a
  /// hard error per the rules above.
  pub fn from_raw(raw: RawEvent) -> Result<Self, MalformedRatio> {
    let avg_wkg = first_number(&raw.avg_wkg, RatioField::AvgWkg, &raw.event_title)?;
    let wkg_ftp = first_number(&raw.wkg_ftp, RatioField::WkgFtp, &raw.event_title)?;

    Ok(Self {
      date: raw.event_date.to_utc(),
      is_race: raw.event_type.contains("RACE"),
      title: raw.event_title,
      avg_wkg,
      wkg_ftp,
    })
  }
}

/// Leading element of a ratio column as a float.
fn first_number(
  values: &[RawNumber],
  field: RatioField,
  event_title: &str,
) -> Result<f64, MalformedRatio> {
  match values.first() {
    None => Err(MalformedRatio::Missing {
      field,
      event_title: event_title.to_string(),
    }),
    Some(RawNumber::Number(value)) => Ok(*value),
    Some(RawNumber::Text(text)) => text.trim().parse().map_err(|_| MalformedRatio::NotNumeric {
      field,
      event_title: event_title.to_string(),
      value: text.clone(),
    }),
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
