use anyhow::Result;
use tokio::sync::{mpsc, watch};

use crate::error::AppError;
use crate::indicator::{IndicatorParams, IndicatorSet};
use crate::model::candle::{Candle, CandleWindow};
use crate::model::signal::{Signal, SignalKind};
use crate::model::tick::Tick;

/// RSI levels that gate buy/sell classification.
#[derive(Debug, Clone)]
pub struct SignalThresholds {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
}

/// Stateful core: the candle window plus the indicator snapshot cached from
/// the last candle close.
///
/// Ticks between closes are evaluated against the cached indicators, stale
/// by up to one bucket. Refreshing per tick would change the signal
/// semantics; the cache is refreshed only when a candle closes.
#[derive(Debug)]
pub struct SignalEngine {
    window: CandleWindow,
    params: IndicatorParams,
    thresholds: SignalThresholds,
    indicators: IndicatorSet,
}

impl SignalEngine {
    pub fn new(
        window: CandleWindow,
        params: IndicatorParams,
        thresholds: SignalThresholds,
    ) -> Self {
        Self {
            window,
            params,
            thresholds,
            indicators: IndicatorSet::default(),
        }
    }

    /// Populate the window from bootstrap history and compute the initial
    /// indicator snapshot, so signals are live from the first tick.
    pub fn seed(&mut self, records: Vec<Candle>) -> Result<usize, AppError> {
        let appended = self.window.seed(records)?;
        self.refresh_indicators();
        Ok(appended)
    }

    /// Process one tick to completion: window update, indicator refresh if
    /// a candle closed, then classification of the tick price.
    pub fn on_tick(&mut self, tick: &Tick) -> Result<Signal, AppError> {
        let closed = self.window.on_tick(tick.price, tick.timestamp_ms)?;
        if closed {
            self.refresh_indicators();
            tracing::debug!(
                len = self.window.len(),
                sma = ?self.indicators.sma,
                rsi = ?self.indicators.rsi,
                "Candle closed, indicators refreshed"
            );
        }
        Ok(self.evaluate(tick.price))
    }

    /// Classify a price against the cached indicators. Missing indicators
    /// (insufficient history) always classify as hold, never as an error.
    pub fn evaluate(&self, price: f64) -> Signal {
        let (Some(rsi), Some(bands)) = (self.indicators.rsi, self.indicators.bands) else {
            return Signal::hold(price);
        };

        if rsi < self.thresholds.rsi_oversold && price < bands.lower {
            Signal {
                kind: SignalKind::Buy,
                price,
            }
        } else if rsi > self.thresholds.rsi_overbought && price > bands.upper {
            Signal {
                kind: SignalKind::Sell,
                price,
            }
        } else {
            Signal::hold(price)
        }
    }

    pub fn indicators(&self) -> &IndicatorSet {
        &self.indicators
    }

    pub fn window(&self) -> &CandleWindow {
        &self.window
    }

    fn refresh_indicators(&mut self) {
        self.indicators = IndicatorSet::compute(self.window.candles(), &self.params);
    }
}

/// Single-consumer run loop: one tick is processed to completion before the
/// next is accepted, so the window has a single writer. Every resulting
/// signal is handed to the caller-supplied `sink`.
///
/// Returns an error when the feed channel closes (terminal, never a silent
/// stall) and `Ok(())` on a shutdown request.
pub async fn run<F>(
    engine: &mut SignalEngine,
    tick_rx: &mut mpsc::Receiver<Tick>,
    mut shutdown: watch::Receiver<bool>,
    mut sink: F,
) -> Result<()>
where
    F: FnMut(&Signal),
{
    loop {
        tokio::select! {
            tick = tick_rx.recv() => {
                match tick {
                    Some(tick) => {
                        let signal = engine.on_tick(&tick)?;
                        sink(&signal);
                    }
                    None => anyhow::bail!("tick feed closed"),
                }
            }
            _ = shutdown.changed() => {
                tracing::info!("Shutdown requested, stopping engine loop");
                return Ok(());
            }
        }
    }
}
