use crate::model::candle::Candle;

/// Relative strength index over the last `period` close-to-close deltas.
/// Needs `period + 1` candles for the first delta. A lookback with zero
/// average loss saturates to exactly 100 instead of dividing by zero.
pub fn rsi(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period + 1 {
        return None;
    }

    let tail = &candles[candles.len() - (period + 1)..];
    let mut gains = 0.0;
    let mut losses = 0.0;
    for pair in tail.windows(2) {
        let delta = pair[1].close - pair[0].close;
        if delta > 0.0 {
            gains += delta;
        } else {
            losses -= delta;
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}
