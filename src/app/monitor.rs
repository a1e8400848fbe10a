//! Two-exchange divergence run.
//!
//! Fetches both exchanges' snapshots sequentially, persisting each
//! exchange's ticks as soon as they are available: if the second exchange's
//! batch fetch fails, the first exchange's history rows already sit in the
//! store even though the divergence evaluation cannot proceed.

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::{info, warn};

use crate::config::Config;
use crate::domain::{
    evaluate_divergences, maybe_alert, normalize_markets, Alert, Divergence, ExchangeSnapshot,
};
use crate::error::Result;
use crate::exchange::QuoteSource;
use crate::store::{MarketStore, NewAlertRow, NewDivergenceRow, TickRow};

/// Result of one divergence run.
#[derive(Debug)]
pub struct MonitorOutcome {
    pub exchange_a: String,
    pub exchange_b: String,
    pub divergences: Vec<Divergence>,
    pub alert: Option<Alert>,
    pub ticks_written: usize,
}

/// Run one divergence evaluation across exactly two exchanges, persisting
/// tick, divergence, and alert rows.
pub async fn run(
    source_a: &dyn QuoteSource,
    source_b: &dyn QuoteSource,
    config: &Config,
    store: &dyn MarketStore,
) -> Result<MonitorOutcome> {
    let ts_ms = Utc::now().timestamp_millis();
    let allowed: BTreeSet<String> = config.scan.quote_currencies.iter().cloned().collect();

    let mut ticks_written = 0;
    let snap_a = fetch_snapshot(source_a, &allowed).await?;
    ticks_written += persist_ticks(&snap_a, ts_ms, config, store)?;
    let snap_b = fetch_snapshot(source_b, &allowed).await?;
    ticks_written += persist_ticks(&snap_b, ts_ms, config, store)?;

    let divergences = evaluate_divergences(&snap_a, &snap_b);
    let alert = maybe_alert(
        &divergences,
        &snap_a.exchange,
        &snap_b.exchange,
        config.monitor.alert_threshold_pct,
    );

    let div_rows: Vec<NewDivergenceRow> = divergences
        .iter()
        .map(|d| NewDivergenceRow {
            ts_ms,
            pair: d.pair.clone(),
            ex_a: snap_a.exchange.clone(),
            ex_b: snap_b.exchange.clone(),
            mid_a: d.mid_a,
            mid_b: d.mid_b,
            div_pct: d.div_pct,
            spread_bps_a: d.spread_bps_a,
            spread_bps_b: d.spread_bps_b,
        })
        .collect();
    store.insert_divergences(&div_rows)?;

    if let Some(ref alert) = alert {
        warn!(message = %alert.message, "divergence alert");
        store.insert_alert(&NewAlertRow {
            ts_ms,
            kind: alert.kind.clone(),
            severity: alert.severity.clone(),
            message: alert.message.clone(),
        })?;
    }

    info!(
        common_pairs = divergences.len(),
        ticks_written,
        alerted = alert.is_some(),
        "divergence run complete"
    );

    Ok(MonitorOutcome {
        exchange_a: snap_a.exchange,
        exchange_b: snap_b.exchange,
        divergences,
        alert,
        ticks_written,
    })
}

async fn fetch_snapshot(
    source: &dyn QuoteSource,
    allowed: &BTreeSet<String>,
) -> Result<ExchangeSnapshot> {
    let markets = source.load_markets().await?;
    let pairs = normalize_markets(&markets, allowed);
    let tickers = source.fetch_tickers().await?;

    info!(
        exchange = source.id(),
        markets = markets.len(),
        eligible = pairs.len(),
        tickers = tickers.len(),
        "snapshot fetched"
    );

    Ok(ExchangeSnapshot {
        exchange: source.id().to_string(),
        pairs,
        tickers,
    })
}

fn persist_ticks(
    snapshot: &ExchangeSnapshot,
    ts_ms: i64,
    config: &Config,
    store: &dyn MarketStore,
) -> Result<usize> {
    let rows: Vec<TickRow> = snapshot
        .pairs
        .iter()
        .take(config.monitor.max_markets_per_exchange)
        .filter_map(|((base, quote), symbol)| {
            let ticker = snapshot.tickers.get(symbol)?;
            if !ticker.is_valid() {
                return None;
            }
            Some(TickRow {
                ts_ms,
                exchange: snapshot.exchange.clone(),
                symbol: symbol.clone(),
                base: base.clone(),
                quote: quote.clone(),
                bid: ticker.bid,
                ask: ticker.ask,
                mid: ticker.mid(),
                spread_bps: ticker.spread_bps(),
            })
        })
        .collect();

    store.insert_ticks(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MarketInfo, OrderBook, Ticker};
    use crate::error::Error;
    use crate::store::SqliteStore;
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    struct FakeSource {
        id: String,
        markets: Vec<MarketInfo>,
        tickers: BTreeMap<String, Ticker>,
        fail_tickers: bool,
    }

    impl FakeSource {
        fn new(id: &str, entries: &[(&str, &str, f64, f64)]) -> Self {
            let mut markets = Vec::new();
            let mut tickers = BTreeMap::new();
            for (base, quote, bid, ask) in entries {
                let symbol = format!("{base}/{quote}");
                markets.push(MarketInfo {
                    symbol: symbol.clone(),
                    base: base.to_string(),
                    quote: quote.to_string(),
                    active: true,
                    spot: true,
                });
                tickers.insert(symbol, Ticker::new(*bid, *ask));
            }
            Self {
                id: id.to_string(),
                markets,
                tickers,
                fail_tickers: false,
            }
        }
    }

    #[async_trait]
    impl QuoteSource for FakeSource {
        fn id(&self) -> &str {
            &self.id
        }

        async fn load_markets(&self) -> Result<Vec<MarketInfo>> {
            Ok(self.markets.clone())
        }

        async fn fetch_tickers(&self) -> Result<BTreeMap<String, Ticker>> {
            if self.fail_tickers {
                return Err(Error::exchange(&self.id, "snapshot unavailable"));
            }
            Ok(self.tickers.clone())
        }

        async fn fetch_order_book(&self, symbol: &str, _depth: u32) -> Result<OrderBook> {
            Err(Error::Parse(format!("no book for {symbol}")))
        }

        fn taker_fee(&self) -> Option<f64> {
            None
        }
    }

    #[tokio::test]
    async fn persists_ticks_divergences_and_alert() {
        // mids 100 vs 100.5 -> 0.5% divergence, above the 0.3% threshold.
        let a = FakeSource::new("kraken", &[("BTC", "USD", 99.5, 100.5)]);
        let b = FakeSource::new("binance", &[("BTC", "USD", 100.0, 101.0)]);
        let store = SqliteStore::open(":memory:").unwrap();
        let config = Config::default();

        let outcome = run(&a, &b, &config, &store).await.unwrap();

        assert_eq!(outcome.ticks_written, 2);
        assert_eq!(outcome.divergences.len(), 1);
        assert!((outcome.divergences[0].div_pct - 0.5).abs() < 1e-9);
        let alert = outcome.alert.unwrap();
        assert!(alert.message.contains("BTC/USD"));
    }

    #[tokio::test]
    async fn no_alert_below_threshold() {
        // mids 100 vs 100.2 -> 0.2%, below 0.3%.
        let a = FakeSource::new("kraken", &[("BTC", "USD", 99.5, 100.5)]);
        let b = FakeSource::new("binance", &[("BTC", "USD", 99.7, 100.7)]);
        let store = SqliteStore::open(":memory:").unwrap();

        let outcome = run(&a, &b, &Config::default(), &store).await.unwrap();
        assert!(outcome.alert.is_none());
        assert_eq!(outcome.divergences.len(), 1);
    }

    #[tokio::test]
    async fn second_exchange_batch_failure_keeps_first_exchanges_ticks() {
        use crate::store::schema::ticks::dsl as ticks_dsl;
        use diesel::prelude::*;

        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("market.db");
        let db_url = db_path.to_str().unwrap().to_string();

        let a = FakeSource::new("kraken", &[("BTC", "USD", 99.5, 100.5)]);
        let mut b = FakeSource::new("binance", &[("BTC", "USD", 100.0, 101.0)]);
        b.fail_tickers = true;

        let store = SqliteStore::open(&db_url).unwrap();
        let err = run(&a, &b, &Config::default(), &store).await.unwrap_err();
        assert!(matches!(err, Error::Exchange { .. }));
        drop(store);

        // Kraken's tick was persisted before binance's batch fetch failed.
        let mut conn = SqliteConnection::establish(&db_url).unwrap();
        let count: i64 = ticks_dsl::ticks.count().get_result(&mut conn).unwrap();
        assert_eq!(count, 1);
    }
}
