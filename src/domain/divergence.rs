//! Cross-exchange price divergence evaluation.
//!
//! Compares midpoint prices for the same (base, quote) pair across two
//! exchanges and flags large relative gaps. The divergence magnitude is
//! always non-negative; direction is recoverable from which mid is larger.

use std::collections::BTreeMap;

use super::market::PairMap;
use super::ticker::Ticker;

/// One exchange's view of the market at a single fetch time.
#[derive(Debug, Clone)]
pub struct ExchangeSnapshot {
    pub exchange: String,
    pub pairs: PairMap,
    pub tickers: BTreeMap<String, Ticker>,
}

/// Relative midpoint gap for one pair across two exchanges.
#[derive(Debug, Clone, PartialEq)]
pub struct Divergence {
    pub pair: String,
    pub mid_a: f64,
    pub mid_b: f64,
    /// `(max(mid) - min(mid)) / min(mid) * 100`, never negative.
    pub div_pct: f64,
    pub spread_bps_a: f64,
    pub spread_bps_b: f64,
}

/// A side-effect record emitted when the top divergence of a run crosses
/// the alert threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub kind: String,
    pub severity: String,
    pub message: String,
}

/// Evaluate divergences for every pair present on both exchanges with valid
/// ticker data, ranked descending by `div_pct`.
pub fn evaluate_divergences(a: &ExchangeSnapshot, b: &ExchangeSnapshot) -> Vec<Divergence> {
    let mut rows = Vec::new();

    for ((base, quote), sym_a) in &a.pairs {
        let Some(sym_b) = b.pairs.get(&(base.clone(), quote.clone())) else {
            continue;
        };
        let (Some(ta), Some(tb)) = (a.tickers.get(sym_a), b.tickers.get(sym_b)) else {
            continue;
        };
        if !ta.is_valid() || !tb.is_valid() {
            continue;
        }

        let mid_a = ta.mid();
        let mid_b = tb.mid();
        let lo = mid_a.min(mid_b);
        let hi = mid_a.max(mid_b);

        rows.push(Divergence {
            pair: format!("{base}/{quote}"),
            mid_a,
            mid_b,
            div_pct: (hi - lo) / lo * 100.0,
            spread_bps_a: ta.spread_bps(),
            spread_bps_b: tb.spread_bps(),
        });
    }

    rows.sort_by(|x, y| {
        y.div_pct
            .partial_cmp(&x.div_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows
}

/// At most one alert per run: emitted only when the top-ranked divergence
/// strictly exceeds `threshold_pct`.
pub fn maybe_alert(
    ranked: &[Divergence],
    exchange_a: &str,
    exchange_b: &str,
    threshold_pct: f64,
) -> Option<Alert> {
    let top = ranked.first()?;
    if top.div_pct <= threshold_pct {
        return None;
    }
    Some(Alert {
        kind: "divergence".to_string(),
        severity: "high".to_string(),
        message: format!(
            "TOP divergence {}: {:.3}% ({exchange_a} vs {exchange_b})",
            top.pair, top.div_pct
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(exchange: &str, entries: &[(&str, &str, f64, f64)]) -> ExchangeSnapshot {
        let mut pairs = PairMap::new();
        let mut tickers = BTreeMap::new();
        for (base, quote, bid, ask) in entries {
            let symbol = format!("{base}/{quote}");
            pairs.insert((base.to_string(), quote.to_string()), symbol.clone());
            tickers.insert(symbol, Ticker::new(*bid, *ask));
        }
        ExchangeSnapshot {
            exchange: exchange.to_string(),
            pairs,
            tickers,
        }
    }

    #[test]
    fn div_pct_from_known_mids() {
        // mids: 100 and 100.5 -> 0.5% exactly.
        let a = snapshot("kraken", &[("BTC", "USD", 99.5, 100.5)]);
        let b = snapshot("binance", &[("BTC", "USD", 100.0, 101.0)]);

        let rows = evaluate_divergences(&a, &b);
        assert_eq!(rows.len(), 1);
        assert!((rows[0].div_pct - 0.5).abs() < 1e-9);
        assert!(rows[0].div_pct >= 0.0);
    }

    #[test]
    fn alert_emitted_above_threshold_only() {
        let a = snapshot("kraken", &[("BTC", "USD", 99.5, 100.5)]);
        let b = snapshot("binance", &[("BTC", "USD", 100.0, 101.0)]);
        let rows = evaluate_divergences(&a, &b);

        let alert = maybe_alert(&rows, "kraken", "binance", 0.3).unwrap();
        assert_eq!(alert.kind, "divergence");
        assert_eq!(alert.severity, "high");
        assert!(alert.message.contains("BTC/USD"));

        // 100 vs 100.2 -> 0.2%, below threshold.
        let a = snapshot("kraken", &[("BTC", "USD", 99.5, 100.5)]);
        let b = snapshot("binance", &[("BTC", "USD", 99.7, 100.7)]);
        let rows = evaluate_divergences(&a, &b);
        assert!(maybe_alert(&rows, "kraken", "binance", 0.3).is_none());
    }

    #[test]
    fn no_alert_for_empty_common_set() {
        let a = snapshot("kraken", &[("BTC", "USD", 99.0, 101.0)]);
        let b = snapshot("binance", &[("ETH", "USD", 99.0, 101.0)]);
        let rows = evaluate_divergences(&a, &b);
        assert!(rows.is_empty());
        assert!(maybe_alert(&rows, "kraken", "binance", 0.3).is_none());
    }

    #[test]
    fn invalid_tickers_are_excluded() {
        let a = snapshot("kraken", &[("BTC", "USD", 0.0, 101.0)]);
        let b = snapshot("binance", &[("BTC", "USD", 99.0, 101.0)]);
        assert!(evaluate_divergences(&a, &b).is_empty());
    }

    #[test]
    fn ranked_descending() {
        let a = snapshot(
            "kraken",
            &[("BTC", "USD", 99.5, 100.5), ("ETH", "USD", 10.0, 10.2)],
        );
        let b = snapshot(
            "binance",
            &[("BTC", "USD", 100.0, 101.0), ("ETH", "USD", 11.0, 11.2)],
        );
        let rows = evaluate_divergences(&a, &b);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].div_pct >= rows[1].div_pct);
        assert_eq!(rows[0].pair, "ETH/USD");
    }
}
