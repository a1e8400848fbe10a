//! Exchange-agnostic market types and the arbitrage math.
//!
//! Everything in this module is pure: no I/O, no clocks, no hidden state.
//! The app layer feeds it snapshots and persists what comes back.

pub mod book;
pub mod divergence;
pub mod graph;
pub mod market;
pub mod ticker;
pub mod triangle;

pub use book::{OrderBook, PriceLevel};
pub use divergence::{evaluate_divergences, maybe_alert, Alert, Divergence, ExchangeSnapshot};
pub use graph::{build_ticker_graph, insert_depth_edges, RateGraph};
pub use market::{normalize_markets, Asset, MarketInfo, PairMap};
pub use ticker::Ticker;
pub use triangle::{find_triangles, Triangle};
