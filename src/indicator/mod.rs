pub mod bollinger;
pub mod rsi;
pub mod sma;

pub use bollinger::{bollinger_bands, Bands};
pub use rsi::rsi;
pub use sma::sma;

use crate::model::candle::Candle;

/// Lookback configuration for the indicator recompute.
#[derive(Debug, Clone)]
pub struct IndicatorParams {
    pub sma_period: usize,
    pub rsi_period: usize,
    pub bollinger_period: usize,
    pub bollinger_multiplier: f64,
}

/// Derived statistics for one window snapshot. Recomputed in full on every
/// candle close rather than maintained incrementally; each field is `None`
/// while history is shorter than its period.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSet {
    pub sma: Option<f64>,
    pub rsi: Option<f64>,
    pub bands: Option<Bands>,
}

impl IndicatorSet {
    /// The three indicators are independent; each sees the same snapshot.
    pub fn compute(candles: &[Candle], params: &IndicatorParams) -> Self {
        Self {
            sma: sma(candles, params.sma_period),
            rsi: rsi(candles, params.rsi_period),
            bands: bollinger_bands(
                candles,
                params.bollinger_period,
                params.bollinger_multiplier,
            ),
        }
    }

    /// Signal evaluation needs RSI and bands; SMA is informational.
    pub fn is_ready(&self) -> bool {
        self.rsi.is_some() && self.bands.is_some()
    }
}
