//! Database row types for the append-only history tables.

use diesel::prelude::*;

use super::schema::{alerts, divergences, ticks};

/// One market quote observation. The (ts_ms, exchange, symbol) key makes
/// re-inserting the same snapshot a no-op.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = ticks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TickRow {
    pub ts_ms: i64,
    pub exchange: String,
    pub symbol: String,
    pub base: String,
    pub quote: String,
    pub bid: f64,
    pub ask: f64,
    pub mid: f64,
    pub spread_bps: f64,
}

/// Divergence row (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = divergences)]
pub struct NewDivergenceRow {
    pub ts_ms: i64,
    pub pair: String,
    pub ex_a: String,
    pub ex_b: String,
    pub mid_a: f64,
    pub mid_b: f64,
    pub div_pct: f64,
    pub spread_bps_a: f64,
    pub spread_bps_b: f64,
}

/// Divergence row (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = divergences)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DivergenceRow {
    pub id: Option<i32>,
    pub ts_ms: i64,
    pub pair: String,
    pub ex_a: String,
    pub ex_b: String,
    pub mid_a: f64,
    pub mid_b: f64,
    pub div_pct: f64,
    pub spread_bps_a: f64,
    pub spread_bps_b: f64,
}

/// Alert row (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = alerts)]
pub struct NewAlertRow {
    pub ts_ms: i64,
    pub kind: String,
    pub severity: String,
    pub message: String,
}

/// Alert row (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = alerts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AlertRow {
    pub id: Option<i32>,
    pub ts_ms: i64,
    pub kind: String,
    pub severity: String,
    pub message: String,
}
