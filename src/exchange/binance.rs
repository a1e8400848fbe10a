//! Binance public REST client.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::QuoteSource;
use crate::domain::{MarketInfo, OrderBook, PriceLevel, Ticker};
use crate::error::{Error, Result};

const API_URL: &str = "https://api.binance.com";

/// Binance spot taker fee for the default (VIP 0) tier.
const TAKER_FEE: f64 = 0.001;

pub struct Binance {
    http: reqwest::Client,
    base_url: String,
    /// Native symbol ("BTCUSDT") to canonical ("BTC/USDT"), filled by
    /// `load_markets` and read by `fetch_tickers` within the same run.
    symbols: Mutex<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolInfo {
    symbol: String,
    status: String,
    base_asset: String,
    quote_asset: String,
    #[serde(default)]
    is_spot_trading_allowed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookTicker {
    symbol: String,
    bid_price: String,
    ask_price: String,
}

#[derive(Debug, Deserialize)]
struct Depth {
    bids: Vec<[String; 2]>,
    asks: Vec<[String; 2]>,
}

impl Binance {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(http, API_URL)
    }

    /// Point the client at a different host (local stub in tests).
    pub fn with_base_url(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            symbols: Mutex::new(BTreeMap::new()),
        }
    }

    fn batch_err(&self, reason: impl std::fmt::Display) -> Error {
        Error::exchange(self.id(), reason.to_string())
    }
}

fn parse_levels(raw: &[[String; 2]]) -> Vec<PriceLevel> {
    raw.iter()
        .filter_map(|[price, qty]| {
            let price = price.parse::<f64>().ok()?;
            let quantity = qty.parse::<f64>().ok()?;
            Some(PriceLevel::new(price, quantity))
        })
        .collect()
}

#[async_trait]
impl QuoteSource for Binance {
    fn id(&self) -> &str {
        "binance"
    }

    async fn load_markets(&self) -> Result<Vec<MarketInfo>> {
        let url = format!("{}/api/v3/exchangeInfo", self.base_url);
        let info: ExchangeInfo = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.batch_err(e))?
            .error_for_status()
            .map_err(|e| self.batch_err(e))?
            .json()
            .await
            .map_err(|e| self.batch_err(e))?;

        let mut markets = Vec::with_capacity(info.symbols.len());
        let mut symbols = self.symbols.lock().expect("symbol map poisoned");
        symbols.clear();

        for s in info.symbols {
            let canonical = format!("{}/{}", s.base_asset, s.quote_asset);
            symbols.insert(s.symbol.clone(), canonical.clone());
            markets.push(MarketInfo {
                symbol: canonical,
                base: s.base_asset,
                quote: s.quote_asset,
                active: s.status == "TRADING",
                spot: s.is_spot_trading_allowed,
            });
        }

        debug!(count = markets.len(), "binance markets loaded");
        Ok(markets)
    }

    async fn fetch_tickers(&self) -> Result<BTreeMap<String, Ticker>> {
        let url = format!("{}/api/v3/ticker/bookTicker", self.base_url);
        let raw: Vec<BookTicker> = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.batch_err(e))?
            .error_for_status()
            .map_err(|e| self.batch_err(e))?
            .json()
            .await
            .map_err(|e| self.batch_err(e))?;

        let symbols = self.symbols.lock().expect("symbol map poisoned");
        let mut out = BTreeMap::new();
        for t in raw {
            let Some(canonical) = symbols.get(&t.symbol) else {
                continue;
            };
            let (Ok(bid), Ok(ask)) = (t.bid_price.parse::<f64>(), t.ask_price.parse::<f64>())
            else {
                continue;
            };
            out.insert(canonical.clone(), Ticker::new(bid, ask));
        }

        debug!(count = out.len(), "binance tickers fetched");
        Ok(out)
    }

    async fn fetch_order_book(&self, symbol: &str, depth: u32) -> Result<OrderBook> {
        // Native Binance symbols are the canonical form with the slash removed.
        let native = symbol.replace('/', "");
        let url = format!(
            "{}/api/v3/depth?symbol={}&limit={}",
            self.base_url, native, depth
        );
        let raw: Depth = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(OrderBook::new(parse_levels(&raw.bids), parse_levels(&raw.asks)))
    }

    fn taker_fee(&self) -> Option<f64> {
        Some(TAKER_FEE)
    }
}
