//! Run-once application services.
//!
//! Each run fetches a full snapshot, computes results, persists what the
//! run persists, and returns. No sleeps or retry loops live here beyond the
//! fixed inter-request pacing of the depth scan; scheduling repeated runs
//! is the CLI watch loop's job.

pub mod depth;
pub mod monitor;
pub mod report;
pub mod scan;

pub use depth::{DepthScanOutcome, SkipReason, SkippedMarket};
pub use monitor::MonitorOutcome;
