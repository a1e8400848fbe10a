//! Best bid/ask quotes and derived values.

/// A top-of-book quote for one market at fetch time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ticker {
    pub bid: f64,
    pub ask: f64,
}

impl Ticker {
    pub fn new(bid: f64, ask: f64) -> Self {
        Self { bid, ask }
    }

    /// Whether both sides are present, finite, and positive.
    /// Invalid quotes are dropped by callers, never zero-filled.
    pub fn is_valid(&self) -> bool {
        self.bid.is_finite() && self.ask.is_finite() && self.bid > 0.0 && self.ask > 0.0
    }

    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }

    /// Bid/ask spread in basis points of the midpoint.
    pub fn spread_bps(&self) -> f64 {
        (self.ask - self.bid) / self.mid() * 10_000.0
    }
}
