//! Fleet telemetry report engine.
//!
//! Turns a batch of spreadsheet tabs (one row per vehicle per reporting
//! period) into per-month continuity and alignment analysis plus client and
//! location rollups for the latest reporting date.

pub mod analysis;
pub mod config;
pub mod error;
pub mod loader;
pub mod months;
pub mod output;
pub mod reports;
pub mod rollup;
pub mod tracker;
pub mod types;
pub mod util;

pub use analysis::{analyze, LatestDate};
pub use error::{FleetError, Result};
pub use types::{Batch, Cell, Report, ValueRange};
