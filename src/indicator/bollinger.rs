use super::sma::sma;
use crate::model::candle::Candle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub middle: f64,
    pub upper: f64,
    pub lower: f64,
}

/// Volatility envelope: SMA plus/minus `multiplier` population standard
/// deviations of the trailing `period` closes (variance divides by the
/// period, not period - 1).
pub fn bollinger_bands(candles: &[Candle], period: usize, multiplier: f64) -> Option<Bands> {
    let middle = sma(candles, period)?;

    let tail = &candles[candles.len() - period..];
    let variance = tail
        .iter()
        .map(|c| {
            let d = c.close - middle;
            d * d
        })
        .sum::<f64>()
        / period as f64;
    let std_dev = variance.sqrt();

    Some(Bands {
        middle,
        upper: middle + multiplier * std_dev,
        lower: middle - multiplier * std_dev,
    })
}
