//! SQLite-backed append-only history store.

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::SqliteConnection;
use std::path::Path;
use tracing::debug;

use super::model::{NewAlertRow, NewDivergenceRow, TickRow};
use super::schema::{alerts, divergences, ticks};
use super::MarketStore;
use crate::error::{Error, Result};

/// Type alias for a SQLite connection pool.
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Three fixed append-only tables; bootstrap is idempotent so the store can
/// be opened against a fresh or an existing database file.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS ticks (
        ts_ms BIGINT NOT NULL,
        exchange TEXT NOT NULL,
        symbol TEXT NOT NULL,
        base TEXT NOT NULL,
        quote TEXT NOT NULL,
        bid DOUBLE NOT NULL,
        ask DOUBLE NOT NULL,
        mid DOUBLE NOT NULL,
        spread_bps DOUBLE NOT NULL,
        PRIMARY KEY (ts_ms, exchange, symbol)
    )",
    "CREATE TABLE IF NOT EXISTS divergences (
        id INTEGER PRIMARY KEY,
        ts_ms BIGINT NOT NULL,
        pair TEXT NOT NULL,
        ex_a TEXT NOT NULL,
        ex_b TEXT NOT NULL,
        mid_a DOUBLE NOT NULL,
        mid_b DOUBLE NOT NULL,
        div_pct DOUBLE NOT NULL,
        spread_bps_a DOUBLE NOT NULL,
        spread_bps_b DOUBLE NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS alerts (
        id INTEGER PRIMARY KEY,
        ts_ms BIGINT NOT NULL,
        kind TEXT NOT NULL,
        severity TEXT NOT NULL,
        message TEXT NOT NULL
    )",
];

/// Append-only SQLite store for tick, divergence, and alert history.
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Open (creating parent directories and tables as needed) a store at
    /// the given path. `:memory:` works for tests.
    pub fn open(database_url: &str) -> Result<Self> {
        if database_url != ":memory:" {
            if let Some(parent) = Path::new(database_url).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| Error::Connection(e.to_string()))?;

        let store = Self { pool };
        store.bootstrap()?;
        Ok(store)
    }

    fn bootstrap(&self) -> Result<()> {
        let mut conn = self.conn()?;
        for pragma in ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL"] {
            diesel::sql_query(pragma)
                .execute(&mut conn)
                .map_err(|e| Error::Database(e.to_string()))?;
        }
        for statement in SCHEMA {
            diesel::sql_query(*statement)
                .execute(&mut conn)
                .map_err(|e| Error::Database(e.to_string()))?;
        }
        Ok(())
    }

    fn conn(&self) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>> {
        self.pool.get().map_err(|e| Error::Connection(e.to_string()))
    }
}

impl MarketStore for SqliteStore {
    fn insert_ticks(&self, rows: &[TickRow]) -> Result<usize> {
        let mut conn = self.conn()?;
        // Duplicate (ts_ms, exchange, symbol) keys are silently ignored,
        // so re-running against the same snapshot is idempotent.
        let inserted = diesel::insert_or_ignore_into(ticks::table)
            .values(rows)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        debug!(inserted, total = rows.len(), "tick rows written");
        Ok(inserted)
    }

    fn insert_divergences(&self, rows: &[NewDivergenceRow]) -> Result<usize> {
        let mut conn = self.conn()?;
        let inserted = diesel::insert_into(divergences::table)
            .values(rows)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        debug!(inserted, "divergence rows written");
        Ok(inserted)
    }

    fn insert_alert(&self, row: &NewAlertRow) -> Result<()> {
        let mut conn = self.conn()?;
        diesel::insert_into(alerts::table)
            .values(row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        debug!(kind = %row.kind, "alert written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::model::{AlertRow, DivergenceRow};

    fn tick(ts_ms: i64, symbol: &str) -> TickRow {
        TickRow {
            ts_ms,
            exchange: "kraken".to_string(),
            symbol: symbol.to_string(),
            base: "BTC".to_string(),
            quote: "USD".to_string(),
            bid: 100.0,
            ask: 101.0,
            mid: 100.5,
            spread_bps: 99.5,
        }
    }

    #[test]
    fn open_bootstraps_schema() {
        let store = SqliteStore::open(":memory:").unwrap();
        // Bootstrapping again over the same pool is a no-op.
        store.bootstrap().unwrap();
    }

    #[test]
    fn duplicate_ticks_are_ignored() {
        let store = SqliteStore::open(":memory:").unwrap();
        let rows = vec![tick(1, "BTC/USD"), tick(1, "ETH/USD")];

        assert_eq!(store.insert_ticks(&rows).unwrap(), 2);
        // Same primary keys again: nothing new lands.
        assert_eq!(store.insert_ticks(&rows).unwrap(), 0);
        // A new timestamp is a new row.
        assert_eq!(store.insert_ticks(&[tick(2, "BTC/USD")]).unwrap(), 1);
    }

    #[test]
    fn divergences_always_append() {
        let store = SqliteStore::open(":memory:").unwrap();
        let row = NewDivergenceRow {
            ts_ms: 1,
            pair: "BTC/USD".to_string(),
            ex_a: "kraken".to_string(),
            ex_b: "binance".to_string(),
            mid_a: 100.0,
            mid_b: 100.5,
            div_pct: 0.5,
            spread_bps_a: 10.0,
            spread_bps_b: 12.0,
        };
        store.insert_divergences(&[row.clone()]).unwrap();
        store.insert_divergences(&[row]).unwrap();

        let mut conn = store.conn().unwrap();
        let stored: Vec<DivergenceRow> = divergences::table
            .select(DivergenceRow::as_select())
            .load(&mut conn)
            .unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].div_pct, 0.5);
    }

    #[test]
    fn alerts_round_trip() {
        let store = SqliteStore::open(":memory:").unwrap();
        store
            .insert_alert(&NewAlertRow {
                ts_ms: 42,
                kind: "divergence".to_string(),
                severity: "high".to_string(),
                message: "TOP divergence BTC/USD: 0.500% (kraken vs binance)".to_string(),
            })
            .unwrap();

        let mut conn = store.conn().unwrap();
        let stored: Vec<AlertRow> = alerts::table
            .select(AlertRow::as_select())
            .load(&mut conn)
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].kind, "divergence");
        assert_eq!(stored[0].ts_ms, 42);
    }
}
