//! Conversion-rate graph construction and pruning.
//!
//! Nodes are assets; a directed edge `from -> to` carries the best
//! achievable conversion rate for one unit of `from`, net of taker fees
//! (and of slippage, in the depth-based variant). When several markets
//! realize the same directional conversion only the maximum rate is kept;
//! that discards alternative routes on purpose (see DESIGN.md).

use std::collections::BTreeMap;

use super::book::{buy_base_with_quote, sell_base_for_quote, OrderBook};
use super::market::{Asset, PairMap};
use super::ticker::Ticker;

/// Directed weighted graph of achievable conversion rates.
///
/// Backed by ordered maps so iteration, and therefore ranking and pruning
/// tie-breaks, is deterministic across runs.
#[derive(Debug, Clone, Default)]
pub struct RateGraph {
    edges: BTreeMap<Asset, BTreeMap<Asset, f64>>,
}

impl RateGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a conversion rate, keeping the maximum across contributing
    /// markets for the same directed pair.
    pub fn insert_max(&mut self, from: &str, to: &str, rate: f64) {
        if !rate.is_finite() || rate <= 0.0 {
            return;
        }
        let entry = self
            .edges
            .entry(from.to_string())
            .or_default()
            .entry(to.to_string())
            .or_insert(0.0);
        if rate > *entry {
            *entry = rate;
        }
    }

    pub fn rate(&self, from: &str, to: &str) -> Option<f64> {
        self.edges.get(from)?.get(to).copied()
    }

    pub fn neighbors(&self, from: &str) -> Option<&BTreeMap<Asset, f64>> {
        self.edges.get(from)
    }

    /// Every asset that appears as an edge endpoint, sorted.
    pub fn assets(&self) -> Vec<Asset> {
        let mut assets: Vec<Asset> = self.edges.keys().cloned().collect();
        for nbrs in self.edges.values() {
            for to in nbrs.keys() {
                if !self.edges.contains_key(to) {
                    assets.push(to.clone());
                }
            }
        }
        assets.sort();
        assets.dedup();
        assets
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(|n| n.len()).sum()
    }

    /// Cap each node's out-degree to the `k` highest-rate edges.
    ///
    /// Sort is stable: rate descending, ties keep the adjacency map's
    /// lexical asset order, so pruning is reproducible.
    pub fn prune_top_k(&self, k: usize) -> RateGraph {
        let mut pruned = RateGraph::new();
        for (from, nbrs) in &self.edges {
            let mut ranked: Vec<(&Asset, f64)> = nbrs.iter().map(|(to, r)| (to, *r)).collect();
            ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            for (to, rate) in ranked.into_iter().take(k) {
                pruned.insert_max(from, to, rate);
            }
        }
        pruned
    }
}

/// Build a rate graph from top-of-book quotes.
///
/// For each eligible market with a valid ticker:
/// selling one base unit at the bid gives `base -> quote = bid * (1-fee)`;
/// buying base with one quote unit at the ask gives
/// `quote -> base = (1/ask) * (1-fee)`. Invalid tickers are dropped.
pub fn build_ticker_graph(
    pairs: &PairMap,
    tickers: &BTreeMap<String, Ticker>,
    taker_fee: f64,
) -> RateGraph {
    let fee_mult = 1.0 - taker_fee;
    let mut graph = RateGraph::new();

    for ((base, quote), symbol) in pairs {
        let Some(ticker) = tickers.get(symbol) else {
            continue;
        };
        if !ticker.is_valid() {
            continue;
        }
        graph.insert_max(base, quote, ticker.bid * fee_mult);
        graph.insert_max(quote, base, (1.0 / ticker.ask) * fee_mult);
    }

    graph
}

/// Add both directional edges for one market from a depth snapshot,
/// simulating a fixed quote-notional fill in each direction.
///
/// A direction whose ladder cannot absorb the notional contributes no edge;
/// a market with an empty side contributes nothing at all.
pub fn insert_depth_edges(
    graph: &mut RateGraph,
    base: &str,
    quote: &str,
    book: &OrderBook,
    notional: f64,
    taker_fee: f64,
) {
    let Some(mid) = book.mid() else {
        return;
    };
    let fee_mult = 1.0 - taker_fee;

    // quote -> base: spend the notional against the asks.
    if let Some(base_out) = buy_base_with_quote(&book.asks, notional) {
        graph.insert_max(quote, base, (base_out / notional) * fee_mult);
    }

    // base -> quote: sell a mid-equivalent base quantity into the bids.
    let base_amount = notional / mid;
    if let Some(quote_out) = sell_base_for_quote(&book.bids, base_amount) {
        graph.insert_max(base, quote, (quote_out / base_amount) * fee_mult);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::book::PriceLevel;

    fn pair_map(entries: &[(&str, &str, &str)]) -> PairMap {
        entries
            .iter()
            .map(|(b, q, s)| ((b.to_string(), q.to_string()), s.to_string()))
            .collect()
    }

    fn tickers(entries: &[(&str, f64, f64)]) -> BTreeMap<String, Ticker> {
        entries
            .iter()
            .map(|(s, bid, ask)| (s.to_string(), Ticker::new(*bid, *ask)))
            .collect()
    }

    #[test]
    fn ticker_graph_has_both_directions_net_of_fee() {
        let pairs = pair_map(&[("BTC", "USD", "BTC/USD")]);
        let quotes = tickers(&[("BTC/USD", 100.0, 102.0)]);
        let graph = build_ticker_graph(&pairs, &quotes, 0.001);

        let sell = graph.rate("BTC", "USD").unwrap();
        assert!((sell - 100.0 * 0.999).abs() < 1e-9);

        let buy = graph.rate("USD", "BTC").unwrap();
        assert!((buy - (1.0 / 102.0) * 0.999).abs() < 1e-12);
    }

    #[test]
    fn invalid_tickers_contribute_no_edges() {
        let pairs = pair_map(&[("BTC", "USD", "BTC/USD"), ("ETH", "USD", "ETH/USD")]);
        let quotes = tickers(&[("BTC/USD", 0.0, 102.0), ("ETH/USD", -1.0, 5.0)]);
        let graph = build_ticker_graph(&pairs, &quotes, 0.0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn duplicate_markets_keep_the_maximum_rate() {
        // Two markets both realize USDT -> BTC; the better ask must win,
        // and a strictly worse duplicate must not change the result.
        let mut graph = RateGraph::new();
        graph.insert_max("USDT", "BTC", 0.000010);
        graph.insert_max("USDT", "BTC", 0.000008);
        assert_eq!(graph.rate("USDT", "BTC"), Some(0.000010));

        graph.insert_max("USDT", "BTC", 0.000012);
        assert_eq!(graph.rate("USDT", "BTC"), Some(0.000012));
    }

    #[test]
    fn non_positive_or_non_finite_rates_are_ignored() {
        let mut graph = RateGraph::new();
        graph.insert_max("A", "B", 0.0);
        graph.insert_max("A", "B", -1.0);
        graph.insert_max("A", "B", f64::NAN);
        assert_eq!(graph.rate("A", "B"), None);
    }

    #[test]
    fn prune_keeps_top_k_by_rate() {
        let mut graph = RateGraph::new();
        graph.insert_max("A", "B", 3.0);
        graph.insert_max("A", "C", 2.0);
        graph.insert_max("A", "D", 1.0);

        let pruned = graph.prune_top_k(2);
        assert_eq!(pruned.rate("A", "B"), Some(3.0));
        assert_eq!(pruned.rate("A", "C"), Some(2.0));
        assert_eq!(pruned.rate("A", "D"), None);
    }

    #[test]
    fn prune_tie_break_is_deterministic() {
        let mut graph = RateGraph::new();
        graph.insert_max("A", "C", 1.0);
        graph.insert_max("A", "B", 1.0);
        graph.insert_max("A", "D", 1.0);

        // Equal rates: lexical adjacency order wins, so B is kept.
        let pruned = graph.prune_top_k(1);
        assert_eq!(pruned.rate("A", "B"), Some(1.0));
        assert_eq!(pruned.edge_count(), 1);
    }

    #[test]
    fn assets_cover_edge_targets() {
        let mut graph = RateGraph::new();
        graph.insert_max("A", "B", 1.0);
        assert_eq!(graph.assets(), vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn depth_edges_capture_slippage() {
        let mut graph = RateGraph::new();
        let book = OrderBook::new(
            vec![PriceLevel::new(10.0, 100.0)],
            vec![PriceLevel::new(10.0, 1.0), PriceLevel::new(11.0, 2.0)],
        );
        insert_depth_edges(&mut graph, "ETH", "USD", &book, 15.0, 0.0);

        // 15 quote buys 1 @ 10 plus 5/11 at the next level.
        let expected = (1.0 + 5.0 / 11.0) / 15.0;
        let rate = graph.rate("USD", "ETH").unwrap();
        assert!((rate - expected).abs() < 1e-12);

        // Selling the mid-equivalent base amount fills entirely at 10.
        let rate = graph.rate("ETH", "USD").unwrap();
        assert!((rate - 10.0).abs() < 1e-9);
    }

    #[test]
    fn depth_edges_absent_when_ladder_is_too_thin() {
        let mut graph = RateGraph::new();
        // 33 quote units of total ask depth cannot absorb a 100 notional.
        let book = OrderBook::new(
            vec![PriceLevel::new(10.0, 0.1)],
            vec![PriceLevel::new(11.0, 3.0)],
        );
        insert_depth_edges(&mut graph, "ETH", "USD", &book, 100.0, 0.0);
        assert_eq!(graph.rate("USD", "ETH"), None);
        assert_eq!(graph.rate("ETH", "USD"), None);
    }

    #[test]
    fn depth_edges_skip_one_sided_books() {
        let mut graph = RateGraph::new();
        let book = OrderBook::new(vec![], vec![PriceLevel::new(10.0, 5.0)]);
        insert_depth_edges(&mut graph, "ETH", "USD", &book, 10.0, 0.0);
        assert_eq!(graph.edge_count(), 0);
    }
}
