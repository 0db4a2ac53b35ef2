//! ZwiftPower data retrieval.
//!
//! Fetches the club roster and per-rider event histories from the public
//! cache endpoints. ZwiftPower only materializes the cached profile JSON
//! for clients that look like a browser session, so the client keeps a
//! cookie jar and loads the rider's profile page before asking for the
//! JSON behind it.

use chrono::Utc;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::events::{Event, MalformedRatio, RawEvent};
use crate::summary::RiderSummary;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const ZWIFTPOWER_BASE: &str = "https://www.zwiftpower.com/";

/// Longest body excerpt worth logging when a response fails to decode.
const LOG_BODY_CHARS: usize = 500;

/// Public profile page for a rider; also the link cell in the report.
pub fn profile_url(zwid: i64) -> String {
  format!("{}profile.php?z={}", ZWIFTPOWER_BASE, zwid)
}

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ZwiftPowerError {
  #[error("HTTP request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("unexpected status {status} for {url}")]
  Status {
    status: reqwest::StatusCode,
    url: String,
  },

  #[error("failed to decode {what}: {source}")]
  Decode {
    what: &'static str,
    #[source]
    source: serde_json::Error,
  },

  #[error("rider {zwid}: {source}")]
  Rider {
    zwid: i64,
    #[source]
    source: MalformedRatio,
  },

  #[error("invalid URL: {0}")]
  Url(#[from] url::ParseError),
}

/// ---------------------------------------------------------------------------
/// Wire envelopes
/// ---------------------------------------------------------------------------

/// Roster entry from the team cache. The payload carries far more columns;
/// these are the only ones the report reads.
#[derive(Debug, Clone, Deserialize)]
pub struct ClubMember {
  #[serde(default)]
  pub name: String,
  pub zwid: i64,
}

#[derive(Debug, Deserialize)]
struct ClubRoster {
  #[serde(default)]
  data: Vec<ClubMember>,
}

#[derive(Debug, Deserialize)]
struct RiderHistory {
  #[serde(default)]
  data: Vec<RawEvent>,
}

/// ---------------------------------------------------------------------------
/// Client
/// ---------------------------------------------------------------------------

pub struct ZwiftPower {
  client: Client,
  base: Url,
}

impl ZwiftPower {
  /// Client against the public site.
  pub fn new() -> Result<Self, ZwiftPowerError> {
    Self::with_base(Url::parse(ZWIFTPOWER_BASE)?)
  }

  /// Client against an alternate site root. Tests point this at a local
  /// server; the cookie jar and request flow stay identical.
  pub fn with_base(base: Url) -> Result<Self, ZwiftPowerError> {
    let client = Client::builder().cookie_store(true).build()?;
    Ok(Self { client, base })
  }

  /// Fetch the roster of a club.
  pub async fn import_club(&self, club_id: i64) -> Result<Vec<ClubMember>, ZwiftPowerError> {
    let url = self
      .base
      .join(&format!("cache3/teams/{}_riders.json", club_id))?;
    let roster: ClubRoster = self.get_json(url, "club roster").await?;
    Ok(roster.data)
  }

  /// Fetch a rider's full raw event history.
  ///
  /// The profile page is requested first and its outcome ignored; loading
  /// that page is what makes the site populate the cached JSON behind it.
  pub async fn fetch_rider_events(&self, zwid: i64) -> Result<Vec<RawEvent>, ZwiftPowerError> {
    let profile = self.base.join(&format!("profile.php?z={}", zwid))?;
    let _ = self.client.get(profile).send().await;

    let url = self.base.join(&format!("cache3/profile/{}_all.json", zwid))?;
    let history: RiderHistory = self.get_json(url, "rider history").await?;
    Ok(history.data)
  }

  /// Fetch, normalize, and summarize one rider against the current instant.
  ///
  /// The first malformed ratio fails the whole rider. Callers that would
  /// rather keep a partial summary fetch the raw events and apply their own
  /// policy before calling `RiderSummary::compute`.
  pub async fn import_rider(&self, zwid: i64) -> Result<RiderSummary, ZwiftPowerError> {
    debug!(zwid, "importing rider");
    let raw = self.fetch_rider_events(zwid).await?;
    if raw.is_empty() {
      debug!(zwid, "no event history");
      return Ok(RiderSummary::default());
    }

    let events = raw
      .into_iter()
      .map(Event::from_raw)
      .collect::<Result<Vec<_>, _>>()
      .map_err(|source| ZwiftPowerError::Rider { zwid, source })?;

    Ok(RiderSummary::compute(&events, Utc::now()))
  }

  async fn get_json<T>(&self, url: Url, what: &'static str) -> Result<T, ZwiftPowerError>
  where
    T: DeserializeOwned,
  {
    debug!(url = %url, "fetching");
    let response = self.client.get(url.clone()).send().await?;

    if !response.status().is_success() {
      return Err(ZwiftPowerError::Status {
        status: response.status(),
        url: url.to_string(),
      });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|source| {
      let excerpt: String = body.chars().take(LOG_BODY_CHARS).collect();
      warn!(url = %url, body = %excerpt, "response did not decode");
      ZwiftPowerError::Decode { what, source }
    })
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
