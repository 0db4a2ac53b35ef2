//! Club report CLI.
//!
//! Imports a ZwiftPower club and prints one tab-separated report row per
//! rider on stdout. Logs go to stderr so the output can be piped straight
//! into a sheet import.

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

use zp_report::events::{Event, RawEvent};
use zp_report::report;
use zp_report::summary::RiderSummary;
use zp_report::zwiftpower::ZwiftPower;

#[derive(Parser, Debug)]
#[command(name = "zp-report", about = "ZwiftPower club activity report")]
struct Cli {
  /// ZwiftPower club id to report on
  club_id: i64,

  /// Drop events with unreadable ratio columns instead of failing the rider
  #[arg(long)]
  skip_malformed: bool,

  /// Print the column header row first
  #[arg(long)]
  header: bool,

  /// Alternate ZwiftPower root, mainly for pointing tests at a local server
  #[arg(long, env = "ZP_BASE_URL")]
  base_url: Option<Url>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();
  init_tracing();

  let cli = Cli::parse();

  let zp = match &cli.base_url {
    Some(base) => ZwiftPower::with_base(base.clone()),
    None => ZwiftPower::new(),
  }
  .context("building ZwiftPower client")?;

  let members = zp
    .import_club(cli.club_id)
    .await
    .with_context(|| format!("importing club {}", cli.club_id))?;
  info!(club_id = cli.club_id, riders = members.len(), "imported club roster");

  if cli.header {
    println!("{}", report::HEADERS.join("\t"));
  }

  let now = Utc::now();
  for member in &members {
    let summary = if cli.skip_malformed {
      let raw = zp
        .fetch_rider_events(member.zwid)
        .await
        .with_context(|| format!("fetching rider {}", member.zwid))?;
      RiderSummary::compute(&normalize_skipping(raw, member.zwid), now)
    } else {
      zp.import_rider(member.zwid)
        .await
        .with_context(|| format!("importing rider {}", member.zwid))?
    };

    let row = report::rider_row(&member.name, member.zwid, &summary, now);
    println!("{}", row.join("\t"));
  }

  Ok(())
}

/// The lenient recovery policy: events with unreadable ratio columns are
/// logged and dropped, leaving a partial summary.
fn normalize_skipping(raw: Vec<RawEvent>, zwid: i64) -> Vec<Event> {
  raw
    .into_iter()
    .filter_map(|raw_event| match Event::from_raw(raw_event) {
      Ok(event) => Some(event),
      Err(error) => {
        warn!(zwid, %error, "skipping event with malformed ratio");
        None
      }
    })
    .collect()
}

fn init_tracing() {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("zp_report=info")),
    )
    .with_writer(std::io::stderr)
    .init();
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
