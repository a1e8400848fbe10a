//! Ranked-result rendering.
//!
//! Formatting is a presentation concern; the set and ordering of results is
//! decided by the domain layer and reproduced here verbatim.

use tabled::{Table, Tabled};

use crate::domain::{Alert, Divergence, Triangle};

#[derive(Tabled)]
struct TriangleRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Route")]
    route: String,
    #[tabled(rename = "Profit")]
    profit: String,
    #[tabled(rename = "Compounded")]
    compounded: String,
    #[tabled(rename = "Leg rates")]
    rates: String,
}

#[derive(Tabled)]
struct DivergenceRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Pair")]
    pair: String,
    #[tabled(rename = "Divergence")]
    div: String,
    #[tabled(rename = "Mid A")]
    mid_a: String,
    #[tabled(rename = "Mid B")]
    mid_b: String,
    #[tabled(rename = "Spread A")]
    spread_a: String,
    #[tabled(rename = "Spread B")]
    spread_b: String,
}

/// Print the top `n` triangles as a ranked table.
pub fn print_triangles(triangles: &[Triangle], n: usize) {
    if triangles.is_empty() {
        println!("No triangles found this run.");
        return;
    }

    let rows: Vec<TriangleRow> = triangles
        .iter()
        .take(n)
        .enumerate()
        .map(|(i, t)| TriangleRow {
            rank: i + 1,
            route: t.route(),
            profit: format!("{:+.4}%", t.profit_pct),
            compounded: format!("{:.6}", t.compounded),
            rates: format!("{:.6} x {:.6} x {:.6}", t.rates[0], t.rates[1], t.rates[2]),
        })
        .collect();

    println!("Top {} triangles ({} candidates):", rows.len(), triangles.len());
    println!("{}", Table::new(rows));
}

/// Print the top `n` divergences as a ranked table.
pub fn print_divergences(
    divergences: &[Divergence],
    exchange_a: &str,
    exchange_b: &str,
    n: usize,
) {
    if divergences.is_empty() {
        println!("No common pairs with valid quotes this run.");
        return;
    }

    let rows: Vec<DivergenceRow> = divergences
        .iter()
        .take(n)
        .enumerate()
        .map(|(i, d)| DivergenceRow {
            rank: i + 1,
            pair: d.pair.clone(),
            div: format!("{:+.3}%", d.div_pct),
            mid_a: format!("{:.8}", d.mid_a),
            mid_b: format!("{:.8}", d.mid_b),
            spread_a: format!("{:.1} bps", d.spread_bps_a),
            spread_b: format!("{:.1} bps", d.spread_bps_b),
        })
        .collect();

    println!(
        "Common pairs: {} | top {} divergences ({exchange_a} vs {exchange_b}):",
        divergences.len(),
        rows.len()
    );
    println!("{}", Table::new(rows));
}

/// Print an emitted alert.
pub fn print_alert(alert: &Alert) {
    println!("ALERT [{}/{}] {}", alert.kind, alert.severity, alert.message);
}
