//! Three-leg cycle enumeration over the rate graph.

use super::graph::RateGraph;
use super::market::Asset;

/// One A -> B -> C -> A conversion loop with its compounded outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub path: [Asset; 3],
    pub rates: [f64; 3],
    /// Units of A held after the loop, per unit of A in.
    pub compounded: f64,
    pub profit_pct: f64,
}

impl Triangle {
    /// `A -> B -> C -> A` display form.
    pub fn route(&self) -> String {
        format!(
            "{} -> {} -> {} -> {}",
            self.path[0], self.path[1], self.path[2], self.path[0]
        )
    }
}

/// Enumerate every distinct ordered triple (A, B, C) whose three edges all
/// exist, compounding the rates into a profit percentage.
///
/// The traversal is an exhaustive walk over the adjacency structure; cost is
/// bounded by pruning the graph beforehand, not by a smarter algorithm. The
/// three nodes of a triple must be mutually distinct, so self-loops and
/// two-asset round trips never show up as degenerate "profit".
///
/// Results are filtered by `min_profit_pct` and stably sorted descending by
/// profit, so ties keep discovery order (which itself is deterministic given
/// the graph's ordered adjacency).
pub fn find_triangles(graph: &RateGraph, assets: &[Asset], min_profit_pct: f64) -> Vec<Triangle> {
    let mut results = Vec::new();

    for a in assets {
        let Some(ab_edges) = graph.neighbors(a) else {
            continue;
        };
        for (b, &rate_ab) in ab_edges {
            if b == a {
                continue;
            }
            let Some(bc_edges) = graph.neighbors(b) else {
                continue;
            };
            for (c, &rate_bc) in bc_edges {
                if c == a || c == b {
                    continue;
                }
                let Some(rate_ca) = graph.rate(c, a) else {
                    continue;
                };

                let compounded = rate_ab * rate_bc * rate_ca;
                if !compounded.is_finite() {
                    continue;
                }
                let profit_pct = (compounded - 1.0) * 100.0;
                if profit_pct < min_profit_pct {
                    continue;
                }

                results.push(Triangle {
                    path: [a.clone(), b.clone(), c.clone()],
                    rates: [rate_ab, rate_bc, rate_ca],
                    compounded,
                    profit_pct,
                });
            }
        }
    }

    results.sort_by(|x, y| {
        y.profit_pct
            .partial_cmp(&x.profit_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_of(edges: &[(&str, &str, f64)]) -> RateGraph {
        let mut g = RateGraph::new();
        for (from, to, rate) in edges {
            g.insert_max(from, to, *rate);
        }
        g
    }

    fn assets_of(list: &[&str]) -> Vec<Asset> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn compounds_known_rates_exactly() {
        let g = graph_of(&[("A", "B", 1.01), ("B", "C", 1.01), ("C", "A", 0.99)]);
        let tris = find_triangles(&g, &assets_of(&["A", "B", "C"]), f64::NEG_INFINITY);

        let t = tris
            .iter()
            .find(|t| t.path == ["A".to_string(), "B".to_string(), "C".to_string()])
            .unwrap();
        let expected = (1.01 * 1.01 * 0.99 - 1.0) * 100.0;
        assert!((t.profit_pct - expected).abs() < 1e-6);
        assert!((t.profit_pct - 0.9899).abs() < 1e-4);
    }

    #[test]
    fn all_rotations_are_distinct_triples() {
        let g = graph_of(&[("A", "B", 1.0), ("B", "C", 1.0), ("C", "A", 1.0)]);
        let tris = find_triangles(&g, &assets_of(&["A", "B", "C"]), f64::NEG_INFINITY);
        // One cycle seen from three starting points.
        assert_eq!(tris.len(), 3);
    }

    #[test]
    fn excludes_degenerate_two_asset_loops() {
        // A -> B -> A -> ... must never appear as a "triangle".
        let g = graph_of(&[("A", "B", 1.1), ("B", "A", 1.1)]);
        let tris = find_triangles(&g, &assets_of(&["A", "B"]), f64::NEG_INFINITY);
        assert!(tris.is_empty());
    }

    #[test]
    fn min_profit_filter_applies() {
        let g = graph_of(&[("A", "B", 1.0), ("B", "C", 1.0), ("C", "A", 0.5)]);
        let tris = find_triangles(&g, &assets_of(&["A", "B", "C"]), 0.0);
        assert!(tris.is_empty());
    }

    #[test]
    fn sorted_descending_by_profit() {
        let g = graph_of(&[
            ("A", "B", 1.0),
            ("B", "C", 1.0),
            ("C", "A", 1.2),
            ("A", "C", 1.0),
            ("C", "B", 1.0),
            ("B", "A", 0.9),
        ]);
        let tris = find_triangles(&g, &assets_of(&["A", "B", "C"]), f64::NEG_INFINITY);
        assert!(!tris.is_empty());
        for pair in tris.windows(2) {
            assert!(pair[0].profit_pct >= pair[1].profit_pct);
        }
    }

    #[test]
    fn pruning_strictly_reduces_candidates_when_cut_edges_cycle() {
        // Two cycles share node A; pruning A to out-degree 1 removes the
        // lower-rate cycle through C entirely.
        let g = graph_of(&[
            ("A", "B", 2.0),
            ("B", "D", 1.0),
            ("D", "A", 1.0),
            ("A", "C", 1.0),
            ("C", "D", 1.0),
        ]);
        let assets = assets_of(&["A", "B", "C", "D"]);

        let full = find_triangles(&g, &assets, f64::NEG_INFINITY);
        let pruned = find_triangles(&g.prune_top_k(1), &assets, f64::NEG_INFINITY);
        assert!(pruned.len() < full.len());
    }

    #[test]
    fn route_renders_full_loop() {
        let g = graph_of(&[("A", "B", 1.0), ("B", "C", 1.0), ("C", "A", 1.0)]);
        let tris = find_triangles(&g, &assets_of(&["A"]), f64::NEG_INFINITY);
        assert_eq!(tris[0].route(), "A -> B -> C -> A");
    }
}
