//! Market metadata normalization.

use std::collections::{BTreeMap, BTreeSet};

/// A currency/token identifier as reported by the exchange.
/// Equality is exact string match, case-sensitive.
pub type Asset = String;

/// Canonical mapping from (base, quote) to the exchange's tradable symbol.
pub type PairMap = BTreeMap<(Asset, Asset), String>;

/// Raw per-market metadata as reported by a quote source.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketInfo {
    /// Canonical `BASE/QUOTE` symbol.
    pub symbol: String,
    pub base: Asset,
    pub quote: Asset,
    pub active: bool,
    pub spot: bool,
}

/// Filter raw market metadata down to eligible spot pairs.
///
/// A market qualifies when its symbol contains a `/` separator, it is active
/// and spot, base and quote are non-empty, and the quote currency is in the
/// allow-list. Malformed entries are silently skipped rather than reported;
/// this is a pure function of its input and always yields the same mapping
/// for the same metadata.
pub fn normalize_markets(markets: &[MarketInfo], allowed_quotes: &BTreeSet<String>) -> PairMap {
    let mut mapping = PairMap::new();

    for m in markets {
        if !m.symbol.contains('/') {
            continue;
        }
        if !m.active || !m.spot {
            continue;
        }
        if m.base.is_empty() || m.quote.is_empty() {
            continue;
        }
        if !allowed_quotes.contains(&m.quote) {
            continue;
        }
        mapping.insert((m.base.clone(), m.quote.clone()), m.symbol.clone());
    }

    mapping
}
