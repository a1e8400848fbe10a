//! Order-book (depth-walking) triangle scan.
//!
//! Edge rates come from simulating a fixed quote-notional fill against each
//! market's ladder, so large notionals produce worse rates than top-of-book
//! prices suggest. Order books are fetched one at a time with a fixed pacing
//! delay; a single bad market never aborts the batch.

use std::collections::BTreeSet;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::Config;
use crate::domain::{find_triangles, graph::insert_depth_edges, RateGraph, Triangle};
use crate::error::Result;
use crate::exchange::QuoteSource;

/// Why a market contributed no order book this run.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The per-symbol fetch failed; recovered locally, never fatal.
    FetchFailed(String),
    /// The snapshot came back with an empty bid or ask side.
    EmptyBook,
}

/// An explicit record of a market skipped during the paced fetch loop.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedMarket {
    pub symbol: String,
    pub reason: SkipReason,
}

/// Result of one depth scan.
#[derive(Debug)]
pub struct DepthScanOutcome {
    pub triangles: Vec<Triangle>,
    /// Markets whose books contributed at least one candidate edge.
    pub markets_used: usize,
    pub skipped: Vec<SkippedMarket>,
}

/// Run one depth-based scan against a single exchange.
pub async fn run(source: &dyn QuoteSource, config: &Config) -> Result<DepthScanOutcome> {
    let allowed: BTreeSet<String> = config.scan.quote_currencies.iter().cloned().collect();
    let taker_fee = config.fees.resolve(source.taker_fee());
    let pacing = Duration::from_millis(config.depth.pacing_delay_ms);

    let markets = source.load_markets().await?;
    let pairs = normalize_capped(&markets, &allowed, config.depth.max_markets);

    info!(
        exchange = source.id(),
        markets = pairs.len(),
        notional = config.depth.notional,
        taker_fee,
        "depth scan starting"
    );

    let mut graph = RateGraph::new();
    let mut markets_used = 0;
    let mut skipped = Vec::new();

    for ((base, quote), symbol) in &pairs {
        let book = match source.fetch_order_book(symbol, config.depth.book_depth).await {
            Ok(book) => book,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "order book fetch failed, skipping");
                skipped.push(SkippedMarket {
                    symbol: symbol.clone(),
                    reason: SkipReason::FetchFailed(e.to_string()),
                });
                tokio::time::sleep(pacing).await;
                continue;
            }
        };
        tokio::time::sleep(pacing).await;

        if book.bids.is_empty() || book.asks.is_empty() {
            skipped.push(SkippedMarket {
                symbol: symbol.clone(),
                reason: SkipReason::EmptyBook,
            });
            continue;
        }

        markets_used += 1;
        insert_depth_edges(
            &mut graph,
            base,
            quote,
            &book,
            config.depth.notional,
            taker_fee,
        );
    }

    let assets = graph.assets();
    let triangles = find_triangles(&graph, &assets, config.scan.min_profit_pct);

    info!(
        markets_used,
        skipped = skipped.len(),
        edges = graph.edge_count(),
        triangles = triangles.len(),
        "depth scan complete"
    );

    Ok(DepthScanOutcome {
        triangles,
        markets_used,
        skipped,
    })
}

/// Normalize and cap the market universe for the paced fetch loop.
fn normalize_capped(
    markets: &[crate::domain::MarketInfo],
    allowed: &BTreeSet<String>,
    max_markets: usize,
) -> Vec<((String, String), String)> {
    crate::domain::normalize_markets(markets, allowed)
        .into_iter()
        .take(max_markets)
        .collect()
}
