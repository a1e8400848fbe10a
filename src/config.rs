//! Configuration loading and validation.
//!
//! All tunables live in a TOML file with serde defaults, so a missing file
//! (or a file with only the sections the operator cares about) still yields
//! a fully usable configuration. Every component receives its settings at
//! construction time; there is no global mutable state.

use serde::Deserialize;
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub depth: DepthConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub fees: FeeConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the ticker-based triangle scan.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// Quote currencies a market must settle in to be considered.
    #[serde(default = "default_quote_currencies")]
    pub quote_currencies: Vec<String>,

    /// Per-node out-degree cap applied before cycle enumeration.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Minimum profit percentage a triangle must show to be reported.
    #[serde(default = "default_min_profit_pct")]
    pub min_profit_pct: f64,

    /// Cap on the asset universe fed to the cycle search.
    #[serde(default = "default_max_assets")]
    pub max_assets: usize,

    /// How many ranked triangles to render.
    #[serde(default = "default_scan_top_n")]
    pub top_n: usize,
}

fn default_quote_currencies() -> Vec<String> {
    ["USD", "USDT", "EUR", "GBP"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_top_k() -> usize {
    40
}

fn default_min_profit_pct() -> f64 {
    // Show everything by default; positive triangles are rare enough that
    // the ranked tail is useful signal.
    -100.0
}

fn default_max_assets() -> usize {
    120
}

fn default_scan_top_n() -> usize {
    15
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            quote_currencies: default_quote_currencies(),
            top_k: default_top_k(),
            min_profit_pct: default_min_profit_pct(),
            max_assets: default_max_assets(),
            top_n: default_scan_top_n(),
        }
    }
}

/// Settings for the order-book (depth-walking) triangle scan.
#[derive(Debug, Clone, Deserialize)]
pub struct DepthConfig {
    /// Fixed trade size in quote-currency units used to simulate fills.
    #[serde(default = "default_notional")]
    pub notional: f64,

    /// Cap on how many order books are fetched per run.
    #[serde(default = "default_max_markets")]
    pub max_markets: usize,

    /// Delay between successive order-book requests.
    #[serde(default = "default_pacing_delay_ms")]
    pub pacing_delay_ms: u64,

    /// Order-book depth cutoff requested from the exchange.
    #[serde(default = "default_book_depth")]
    pub book_depth: u32,
}

fn default_notional() -> f64 {
    200.0
}

fn default_max_markets() -> usize {
    80
}

fn default_pacing_delay_ms() -> u64 {
    250
}

fn default_book_depth() -> u32 {
    50
}

impl Default for DepthConfig {
    fn default() -> Self {
        Self {
            notional: default_notional(),
            max_markets: default_max_markets(),
            pacing_delay_ms: default_pacing_delay_ms(),
            book_depth: default_book_depth(),
        }
    }
}

/// Settings for the two-exchange divergence run.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Exactly two exchange ids to compare.
    #[serde(default = "default_monitor_exchanges")]
    pub exchanges: Vec<String>,

    /// Cap on persisted ticks per exchange per run.
    #[serde(default = "default_max_markets_per_exchange")]
    pub max_markets_per_exchange: usize,

    /// Divergence percentage above which a single alert is emitted.
    #[serde(default = "default_alert_threshold_pct")]
    pub alert_threshold_pct: f64,

    /// How many ranked divergences to render.
    #[serde(default = "default_monitor_top_n")]
    pub top_n: usize,
}

fn default_monitor_exchanges() -> Vec<String> {
    vec!["kraken".to_string(), "binance".to_string()]
}

fn default_max_markets_per_exchange() -> usize {
    500
}

fn default_alert_threshold_pct() -> f64 {
    0.3
}

fn default_monitor_top_n() -> usize {
    20
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            exchanges: default_monitor_exchanges(),
            max_markets_per_exchange: default_max_markets_per_exchange(),
            alert_threshold_pct: default_alert_threshold_pct(),
            top_n: default_monitor_top_n(),
        }
    }
}

/// Taker-fee settings.
#[derive(Debug, Clone, Deserialize)]
pub struct FeeConfig {
    /// Overrides the exchange-reported taker fee when set.
    #[serde(default)]
    pub taker_override: Option<f64>,

    /// Fallback when the exchange reports no fee.
    #[serde(default = "default_taker")]
    pub default_taker: f64,
}

fn default_taker() -> f64 {
    0.001
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            taker_override: None,
            default_taker: default_taker(),
        }
    }
}

impl FeeConfig {
    /// Resolve the taker fee for an exchange: override first, then the
    /// exchange-reported value, then the documented default.
    pub fn resolve(&self, reported: Option<f64>) -> f64 {
        self.taker_override
            .or(reported)
            .unwrap_or(self.default_taker)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/market.db".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file. A missing file yields defaults;
    /// a present-but-invalid file is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Self = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.scan.quote_currencies.is_empty() {
            return Err(ConfigError::MissingField {
                field: "scan.quote_currencies",
            }
            .into());
        }
        if self.scan.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scan.top_k",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        if !self.scan.min_profit_pct.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "scan.min_profit_pct",
                reason: "must be finite".to_string(),
            }
            .into());
        }
        if self.depth.notional <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "depth.notional",
                reason: "must be positive".to_string(),
            }
            .into());
        }
        if self.monitor.exchanges.len() != 2 {
            return Err(ConfigError::InvalidValue {
                field: "monitor.exchanges",
                reason: format!("need exactly 2 exchanges, got {}", self.monitor.exchanges.len()),
            }
            .into());
        }
        if !(0.0..1.0).contains(&self.fees.default_taker) {
            return Err(ConfigError::InvalidValue {
                field: "fees.default_taker",
                reason: "must be a fraction in [0, 1)".to_string(),
            }
            .into());
        }
        if let Some(fee) = self.fees.taker_override {
            if !(0.0..1.0).contains(&fee) {
                return Err(ConfigError::InvalidValue {
                    field: "fees.taker_override",
                    reason: "must be a fraction in [0, 1)".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.level));

        match self.logging.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}
