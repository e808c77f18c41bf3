/// One inbound price observation from the live feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub price: f64,
    /// Feed-reported confidence interval. Carried for logging; the engine
    /// math does not use it.
    pub confidence: f64,
    pub timestamp_ms: u64,
}

impl Tick {
    /// Create a bare tick (tests and synthetic replays).
    pub fn new(price: f64, timestamp_ms: u64) -> Self {
        Self {
            price,
            confidence: 0.0,
            timestamp_ms,
        }
    }
}
