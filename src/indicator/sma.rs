use crate::model::candle::Candle;

/// Arithmetic mean of closing prices over the trailing `period` candles.
/// Returns `None` until enough history exists.
pub fn sma(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period {
        return None;
    }
    let tail = &candles[candles.len() - period..];
    let sum: f64 = tail.iter().map(|c| c.close).sum();
    Some(sum / period as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| Candle {
                open: *close,
                high: *close,
                low: *close,
                close: *close,
                open_time: i as u64 * 1_000,
                close_time: (i as u64 + 1) * 1_000,
            })
            .collect()
    }

    #[test]
    fn basic_sma() {
        let candles = candles_from_closes(&[10.0, 20.0, 30.0]);
        let v = sma(&candles, 3).unwrap();
        assert!((v - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn trailing_slice_only() {
        let candles = candles_from_closes(&[1_000.0, 10.0, 20.0, 30.0]);
        let v = sma(&candles, 3).unwrap();
        assert!((v - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn undefined_below_period() {
        let candles = candles_from_closes(&[10.0, 20.0]);
        assert_eq!(sma(&candles, 3), None);
        assert_eq!(sma(&candles, 0), None);
    }

    #[test]
    fn single_period() {
        let candles = candles_from_closes(&[42.0]);
        assert!((sma(&candles, 1).unwrap() - 42.0).abs() < f64::EPSILON);
    }
}
