use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Buy => write!(f, "BUY"),
            SignalKind::Sell => write!(f, "SELL"),
            SignalKind::Hold => write!(f, "HOLD"),
        }
    }
}

/// Per-tick classification of the latest price against the cached
/// indicators. Transient: produced, handed to the sink, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub kind: SignalKind,
    pub price: f64,
}

impl Signal {
    pub fn hold(price: f64) -> Self {
        Self {
            kind: SignalKind::Hold,
            price,
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.kind != SignalKind::Hold
    }
}
