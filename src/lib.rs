//! ZwiftPower club reporting.
//!
//! Imports a club's riders from ZwiftPower and reduces each event history
//! into the rolling activity summary behind the club report rows.

pub mod events;
pub mod report;
pub mod summary;
pub mod zwiftpower;

#[cfg(test)]
mod test_utils;

pub use events::{Event, MalformedRatio, RawEvent};
pub use summary::RiderSummary;
pub use zwiftpower::{ZwiftPower, ZwiftPowerError};
