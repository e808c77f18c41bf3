use crate::error::AppError;

/// One OHLC bucket. `open_time` is the bucket's open, not the wall clock of
/// the last update.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub open_time: u64,
    pub close_time: u64,
}

impl Candle {
    /// Open a fresh candle from the tick that crossed the previous bucket's
    /// close boundary. All four prices start at the triggering tick.
    pub fn from_tick(price: f64, open_time: u64, bucket_ms: u64) -> Self {
        Self {
            open: price,
            high: price,
            low: price,
            close: price,
            open_time,
            close_time: open_time + bucket_ms,
        }
    }

    /// Fold an in-bucket tick into the candle.
    pub fn apply(&mut self, price: f64) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
    }

    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    pub(crate) fn is_well_formed(&self) -> bool {
        let finite = self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite();
        finite
            && self.low <= self.open.min(self.close)
            && self.high >= self.open.max(self.close)
    }
}

/// Bounded ordered candle history, oldest to newest. Owns rollover (deciding
/// when a tick closes the active candle and opens the next) and FIFO
/// eviction once `capacity` is exceeded. Only the last candle is ever
/// mutated; everything before it is closed.
#[derive(Debug, Clone)]
pub struct CandleWindow {
    candles: Vec<Candle>,
    bucket_ms: u64,
    capacity: usize,
}

impl CandleWindow {
    pub fn new(bucket_ms: u64, capacity: usize) -> Self {
        assert!(bucket_ms > 0, "bucket_ms must be > 0");
        assert!(capacity > 0, "capacity must be > 0");
        Self {
            candles: Vec::with_capacity(capacity + 1),
            bucket_ms,
            capacity,
        }
    }

    /// Feed one tick. Returns `Ok(true)` when the tick closed the active
    /// candle and opened a new one, `Ok(false)` when it only updated the
    /// active candle.
    ///
    /// An unseeded window rejects ticks with `EmptyWindow`: there is no
    /// bucket grid to anchor against until the caller seeds history.
    pub fn on_tick(&mut self, price: f64, timestamp_ms: u64) -> Result<bool, AppError> {
        if !price.is_finite() {
            return Err(AppError::InvalidTick(format!("non-finite price {price}")));
        }
        let Some(active) = self.candles.last_mut() else {
            return Err(AppError::EmptyWindow);
        };

        let active_end = active.close_time;
        if timestamp_ms >= active_end {
            // The new bucket is anchored at the previous bucket's close, not
            // at the tick timestamp. A gap of several buckets still advances
            // the grid by exactly one bucket; missing buckets are not
            // backfilled.
            let opened = Candle::from_tick(price, active_end, self.bucket_ms);
            self.push_and_evict(opened);
            Ok(true)
        } else {
            active.apply(price);
            Ok(false)
        }
    }

    /// Bulk-append already-closed candles from the bootstrap source, oldest
    /// first, applying the same per-append eviction rule. The source's
    /// chronological ordering is trusted.
    pub fn seed(&mut self, records: Vec<Candle>) -> Result<usize, AppError> {
        let mut appended = 0;
        for candle in records {
            if !candle.is_well_formed() {
                return Err(AppError::InvalidSeed(format!(
                    "malformed OHLC at open_time {}",
                    candle.open_time
                )));
            }
            self.push_and_evict(candle);
            appended += 1;
        }
        Ok(appended)
    }

    /// Read-only snapshot, oldest to newest.
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn latest(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn bucket_ms(&self) -> u64 {
        self.bucket_ms
    }

    fn push_and_evict(&mut self, candle: Candle) {
        self.candles.push(candle);
        if self.candles.len() > self.capacity {
            self.candles.remove(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candle_from_tick_and_apply() {
        let mut candle = Candle::from_tick(100.0, 60_000, 1_000);
        assert_eq!(candle.open_time, 60_000);
        assert_eq!(candle.close_time, 61_000);

        candle.apply(105.0);
        candle.apply(95.0);
        candle.apply(102.0);

        assert!((candle.open - 100.0).abs() < f64::EPSILON);
        assert!((candle.high - 105.0).abs() < f64::EPSILON);
        assert!((candle.low - 95.0).abs() < f64::EPSILON);
        assert!((candle.close - 102.0).abs() < f64::EPSILON);
        assert!(candle.is_bullish());
    }

    #[test]
    fn bearish_candle() {
        let candle = Candle {
            open: 100.0,
            high: 105.0,
            low: 90.0,
            close: 95.0,
            open_time: 0,
            close_time: 1_000,
        };
        assert!(!candle.is_bullish());
        assert!(candle.is_well_formed());
    }

    #[test]
    fn inverted_extremes_are_malformed() {
        let candle = Candle {
            open: 100.0,
            high: 99.0,
            low: 101.0,
            close: 100.0,
            open_time: 0,
            close_time: 1_000,
        };
        assert!(!candle.is_well_formed());
    }

    #[test]
    #[should_panic(expected = "bucket_ms must be > 0")]
    fn window_rejects_zero_bucket() {
        let _ = CandleWindow::new(0, 20);
    }

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn window_rejects_zero_capacity() {
        let _ = CandleWindow::new(1_000, 0);
    }
}
