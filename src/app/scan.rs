//! Ticker-based triangle scan.
//!
//! Uses top-of-book quotes as achievable execution prices, which assumes
//! each leg is small relative to top-of-book liquidity. For size-aware
//! rates see the depth scan.

use std::collections::BTreeSet;

use tracing::info;

use crate::config::Config;
use crate::domain::{build_ticker_graph, find_triangles, normalize_markets, Triangle};
use crate::error::Result;
use crate::exchange::QuoteSource;

/// Run one ticker-based scan against a single exchange.
///
/// A batch-level fetch failure (market list or ticker snapshot) aborts the
/// run; there is nothing useful to compute without either.
pub async fn run(source: &dyn QuoteSource, config: &Config) -> Result<Vec<Triangle>> {
    let allowed: BTreeSet<String> = config.scan.quote_currencies.iter().cloned().collect();
    let taker_fee = config.fees.resolve(source.taker_fee());

    let markets = source.load_markets().await?;
    let pairs = normalize_markets(&markets, &allowed);
    let tickers = source.fetch_tickers().await?;

    info!(
        exchange = source.id(),
        markets = markets.len(),
        eligible = pairs.len(),
        tickers = tickers.len(),
        taker_fee,
        "snapshot fetched"
    );

    let graph = build_ticker_graph(&pairs, &tickers, taker_fee);
    let mut assets = graph.assets();
    assets.truncate(config.scan.max_assets);
    let pruned = graph.prune_top_k(config.scan.top_k);

    info!(
        assets = assets.len(),
        edges = graph.edge_count(),
        pruned_edges = pruned.edge_count(),
        "rate graph built"
    );

    Ok(find_triangles(&pruned, &assets, config.scan.min_profit_pct))
}
