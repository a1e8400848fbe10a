//! Kraken public REST client.
//!
//! Kraken reports three names per market: an internal pair key ("XXBTZUSD"),
//! an altname ("XBTUSD"), and a websocket name ("XBT/USD"). The wsname is
//! the canonical `BASE/QUOTE` form used crate-wide; the other two are kept
//! in per-run lookup tables for the ticker and depth endpoints.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::QuoteSource;
use crate::domain::{MarketInfo, OrderBook, PriceLevel, Ticker};
use crate::error::{Error, Result};

const API_URL: &str = "https://api.kraken.com";

/// Kraken spot taker fee for the lowest volume tier.
const TAKER_FEE: f64 = 0.0026;

pub struct Kraken {
    http: reqwest::Client,
    base_url: String,
    /// Pair key ("XXBTZUSD") to canonical wsname ("XBT/USD").
    by_pair_key: Mutex<BTreeMap<String, String>>,
    /// Canonical wsname to altname, for depth requests.
    altnames: Mutex<BTreeMap<String, String>>,
}

/// Standard Kraken envelope: a non-empty error array means the call failed
/// even when HTTP status is 200.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    error: Vec<String>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct AssetPair {
    altname: String,
    wsname: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TickerInfo {
    /// Ask: [price, whole lot volume, lot volume].
    a: Vec<String>,
    /// Bid: same layout.
    b: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DepthInfo {
    bids: Vec<(String, String, f64)>,
    asks: Vec<(String, String, f64)>,
}

impl Kraken {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(http, API_URL)
    }

    /// Point the client at a different host (local stub in tests).
    pub fn with_base_url(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            by_pair_key: Mutex::new(BTreeMap::new()),
            altnames: Mutex::new(BTreeMap::new()),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let envelope: Envelope<T> = self
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

        if !envelope.error.is_empty() {
            return Err(self.batch_err(envelope.error.join("; ")));
        }
        envelope
            .result
            .ok_or_else(|| self.batch_err("empty result"))
    }

    fn batch_err(&self, reason: impl std::fmt::Display) -> Error {
        Error::exchange(self.id(), reason.to_string())
    }
}

fn parse_levels(raw: &[(String, String, f64)]) -> Vec<PriceLevel> {
    raw.iter()
        .filter_map(|(price, volume, _ts)| {
            let price = price.parse::<f64>().ok()?;
            let quantity = volume.parse::<f64>().ok()?;
            Some(PriceLevel::new(price, quantity))
        })
        .collect()
}

#[async_trait]
impl QuoteSource for Kraken {
    fn id(&self) -> &str {
        "kraken"
    }

    async fn load_markets(&self) -> Result<Vec<MarketInfo>> {
        let pairs: BTreeMap<String, AssetPair> = self.get("/0/public/AssetPairs").await?;

        let mut markets = Vec::with_capacity(pairs.len());
        let mut by_pair_key = self.by_pair_key.lock().expect("pair key map poisoned");
        let mut altnames = self.altnames.lock().expect("altname map poisoned");
        by_pair_key.clear();
        altnames.clear();

        for (pair_key, pair) in pairs {
            // Pairs without a wsname (dark pools, delisted relics) have no
            // canonical BASE/QUOTE form and are dropped by the normalizer.
            let Some(wsname) = pair.wsname else {
                continue;
            };
            let Some((base, quote)) = wsname.split_once('/') else {
                continue;
            };
            by_pair_key.insert(pair_key, wsname.clone());
            altnames.insert(wsname.clone(), pair.altname);
            markets.push(MarketInfo {
                symbol: wsname.clone(),
                base: base.to_string(),
                quote: quote.to_string(),
                active: pair.status.as_deref().unwrap_or("online") == "online",
                // The AssetPairs endpoint only lists spot markets.
                spot: true,
            });
        }

        debug!(count = markets.len(), "kraken markets loaded");
        Ok(markets)
    }

    async fn fetch_tickers(&self) -> Result<BTreeMap<String, Ticker>> {
        let raw: BTreeMap<String, TickerInfo> = self.get("/0/public/Ticker").await?;

        let by_pair_key = self.by_pair_key.lock().expect("pair key map poisoned");
        let mut out = BTreeMap::new();
        for (pair_key, info) in raw {
            let Some(canonical) = by_pair_key.get(&pair_key) else {
                continue;
            };
            let (Some(ask), Some(bid)) = (info.a.first(), info.b.first()) else {
                continue;
            };
            let (Ok(ask), Ok(bid)) = (ask.parse::<f64>(), bid.parse::<f64>()) else {
                continue;
            };
            out.insert(canonical.clone(), Ticker::new(bid, ask));
        }

        debug!(count = out.len(), "kraken tickers fetched");
        Ok(out)
    }

    async fn fetch_order_book(&self, symbol: &str, depth: u32) -> Result<OrderBook> {
        let native = {
            let altnames = self.altnames.lock().expect("altname map poisoned");
            altnames
                .get(symbol)
                .cloned()
                .unwrap_or_else(|| symbol.replace('/', ""))
        };
        let path = format!("/0/public/Depth?pair={native}&count={depth}");
        let raw: BTreeMap<String, DepthInfo> = self.get(&path).await?;

        // The result is keyed by Kraken's internal pair key; a single-pair
        // request returns exactly one entry.
        let info = raw
            .into_values()
            .next()
            .ok_or_else(|| Error::Parse(format!("no depth data for {symbol}")))?;

        Ok(OrderBook::new(parse_levels(&info.bids), parse_levels(&info.asks)))
    }

    fn taker_fee(&self) -> Option<f64> {
        Some(TAKER_FEE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_levels_ignoring_timestamps() {
        let raw = vec![
            ("30300.1".to_string(), "2.34".to_string(), 1_656_671.0),
            ("oops".to_string(), "1.0".to_string(), 0.0),
        ];
        let levels = parse_levels(&raw);
        assert_eq!(levels, vec![PriceLevel::new(30300.1, 2.34)]);
    }

    #[test]
    fn envelope_error_array_deserializes() {
        let json = r#"{"error":["EGeneral:Invalid arguments"],"result":null}"#;
        let env: Envelope<serde_json::Value> = serde_json::from_str(json).unwrap();
        assert_eq!(env.error.len(), 1);
        assert!(env.result.is_none() || env.result == Some(serde_json::Value::Null));
    }

    #[test]
    fn reports_lowest_tier_taker_fee() {
        let client = Kraken::new(reqwest::Client::new());
        assert_eq!(client.taker_fee(), Some(0.0026));
        assert_eq!(client.id(), "kraken");
    }
}
