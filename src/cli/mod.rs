//! Command-line interface definitions.

pub mod depth;
pub mod monitor;
pub mod scan;
pub mod watch;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;

/// Shared HTTP client for exchange REST calls.
pub(crate) fn http_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .user_agent(concat!("arbscan/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// arbscan - cross-exchange dislocation and triangular arbitrage scanner.
#[derive(Parser, Debug)]
#[command(name = "arbscan")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "arbscan.toml", global = true)]
    pub config: PathBuf,

    /// Override log level (debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan one exchange for triangular arbitrage using top-of-book quotes
    Scan(ScanArgs),

    /// Scan one exchange using order-book depth for a fixed trade notional
    Depth(DepthArgs),

    /// Compare two exchanges' mids and record divergences (run once)
    Monitor(MonitorArgs),

    /// Run the divergence monitor repeatedly on a jittered interval
    Watch(WatchArgs),
}

#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Exchange to scan
    #[arg(short, long, default_value = "kraken")]
    pub exchange: String,

    /// Override minimum profit percentage filter
    #[arg(long)]
    pub min_profit: Option<f64>,

    /// Override per-node out-degree cap
    #[arg(long)]
    pub top_k: Option<usize>,

    /// How many ranked triangles to print
    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(Parser, Debug)]
pub struct DepthArgs {
    /// Exchange to scan
    #[arg(short, long, default_value = "kraken")]
    pub exchange: String,

    /// Override the simulated trade notional (quote-currency units)
    #[arg(long)]
    pub notional: Option<f64>,

    /// Override the order-book fetch cap
    #[arg(long)]
    pub max_markets: Option<usize>,

    /// How many ranked triangles to print
    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(Parser, Debug)]
pub struct MonitorArgs {
    /// Comma-separated pair of exchanges to compare
    #[arg(long)]
    pub exchanges: Option<String>,

    /// Override the history database path
    #[arg(long)]
    pub db: Option<String>,

    /// How many ranked divergences to print
    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(Parser, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub monitor: MonitorArgs,

    /// Seconds between runs
    #[arg(long, default_value_t = 60)]
    pub interval: u64,

    /// Random jitter in seconds added or subtracted per sleep
    #[arg(long, default_value_t = 5)]
    pub jitter: u64,
}
