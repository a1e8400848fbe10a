//! Order-book snapshots and fill simulation.
//!
//! The walk functions answer "what do I actually receive for a fixed-size
//! taker order against this ladder". Insufficient depth is `None`, which is
//! the absence of an achievable conversion, not a rate of zero and not an
//! error.

/// Residual below which a fill counts as complete.
const FILL_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceLevel {
    pub price: f64,
    /// Quantity in base-currency units.
    pub quantity: f64,
}

impl PriceLevel {
    pub fn new(price: f64, quantity: f64) -> Self {
        Self { price, quantity }
    }
}

/// A depth snapshot: bids descending by price, asks ascending.
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

impl OrderBook {
    pub fn new(bids: Vec<PriceLevel>, asks: Vec<PriceLevel>) -> Self {
        Self { bids, asks }
    }

    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.first()
    }

    /// Midpoint of the top of book. `None` when either side is empty.
    pub fn mid(&self) -> Option<f64> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        Some((bid.price + ask.price) / 2.0)
    }
}

/// Spend `quote_amount` of quote currency against ascending asks.
///
/// Returns the base quantity received, or `None` when the ladder cannot
/// absorb the full amount.
pub fn buy_base_with_quote(asks: &[PriceLevel], quote_amount: f64) -> Option<f64> {
    let mut remaining_quote = quote_amount;
    let mut base_out = 0.0;

    for level in asks {
        let cost = level.quantity * level.price;
        if cost <= remaining_quote {
            base_out += level.quantity;
            remaining_quote -= cost;
        } else {
            base_out += remaining_quote / level.price;
            return Some(base_out);
        }
        if remaining_quote <= FILL_EPSILON {
            return Some(base_out);
        }
    }

    None
}

/// Sell `base_amount` of base currency into descending bids.
///
/// Returns the quote received, or `None` when the ladder cannot absorb the
/// full amount.
pub fn sell_base_for_quote(bids: &[PriceLevel], base_amount: f64) -> Option<f64> {
    let mut remaining = base_amount;
    let mut quote_out = 0.0;

    for level in bids {
        let take = remaining.min(level.quantity);
        quote_out += take * level.price;
        remaining -= take;
        if remaining <= FILL_EPSILON {
            return Some(quote_out);
        }
    }

    None
}
