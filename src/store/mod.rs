//! Append-only persistence for tick, divergence, and alert history.
//!
//! The store is strictly append-only: no updates, no deletes, one writer
//! per run. Tick inserts are idempotent-or-additive on their natural key;
//! divergence and alert rows are always appended.

pub mod model;
pub mod schema;
mod sqlite;

pub use model::{NewAlertRow, NewDivergenceRow, TickRow};
pub use sqlite::{DbPool, SqliteStore};

use crate::error::Result;

/// Sink for one run's history rows.
pub trait MarketStore: Send + Sync {
    /// Insert tick rows; duplicates of (ts_ms, exchange, symbol) are
    /// silently ignored. Returns the number of rows actually written.
    fn insert_ticks(&self, rows: &[TickRow]) -> Result<usize>;

    /// Append divergence rows. Returns the number written.
    fn insert_divergences(&self, rows: &[NewDivergenceRow]) -> Result<usize>;

    /// Append a single alert row.
    fn insert_alert(&self, row: &NewAlertRow) -> Result<()>;
}
