//! Exchange abstraction layer.
//!
//! Defines the quote-source port that exchange clients fulfill, so the scan
//! and monitor services work against any exchange (and tests against mocks)
//! through a common interface. Clients own no retry policy; the only pacing
//! is the caller's fixed inter-request delay.

mod binance;
mod factory;
mod kraken;

pub use binance::Binance;
pub use factory::create_source;
pub use kraken::Kraken;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::{MarketInfo, OrderBook, Ticker};
use crate::error::Result;

/// Read-only access to one exchange's public market data.
///
/// `load_markets` and `fetch_tickers` are batch calls; their failure aborts
/// the exchange's contribution to a run. `fetch_order_book` is per-symbol;
/// its failure is recoverable and must be skipped by the caller.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Stable exchange identifier ("kraken", "binance").
    fn id(&self) -> &str;

    /// Fetch all market metadata. Symbols are canonical `BASE/QUOTE`.
    async fn load_markets(&self) -> Result<Vec<MarketInfo>>;

    /// Fetch best bid/ask for every market, keyed by canonical symbol.
    /// Requires a prior `load_markets` call in the same run.
    async fn fetch_tickers(&self) -> Result<BTreeMap<String, Ticker>>;

    /// Fetch a depth snapshot for one canonical symbol.
    async fn fetch_order_book(&self, symbol: &str, depth: u32) -> Result<OrderBook>;

    /// Exchange-reported taker fee fraction, when known.
    fn taker_fee(&self) -> Option<f64>;
}
