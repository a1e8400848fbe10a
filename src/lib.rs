//! arbscan - cross-exchange price dislocation and triangular arbitrage
//! detection.
//!
//! The crate polls public market data (best bid/ask quotes or order-book
//! depth) and evaluates whether a sequence of currency conversions yields a
//! net gain after fees. The core is a directed graph of achievable
//! conversion rates between assets; profitable loops show up as 3-cycles
//! whose compounded rate exceeds one.
//!
//! # Modules
//!
//! - [`config`] - TOML configuration with per-run overrides and defaults
//! - [`domain`] - pure market types and the arbitrage math: normalization,
//!   rate graphs, depth walking, cycle search, divergence evaluation
//! - [`error`] - error types for the crate
//! - [`exchange`] - the quote-source port and public REST clients
//! - [`store`] - append-only SQLite history (ticks, divergences, alerts)
//! - [`app`] - stateless run-once services tying the above together
//! - [`cli`] - command definitions and handlers
//!
//! # Example
//!
//! ```no_run
//! use arbscan::domain::{find_triangles, RateGraph};
//!
//! let mut graph = RateGraph::new();
//! graph.insert_max("BTC", "USDT", 64_000.0 * 0.999);
//! graph.insert_max("USDT", "ETH", (1.0 / 2_600.0) * 0.999);
//! graph.insert_max("ETH", "BTC", 0.041 * 0.999);
//!
//! let assets = graph.assets();
//! for triangle in find_triangles(&graph, &assets, 0.0) {
//!     println!("{} {:+.4}%", triangle.route(), triangle.profit_pct);
//! }
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod exchange;
pub mod store;
