use pulse_quant::error::AppError;
use pulse_quant::model::candle::{Candle, CandleWindow};

fn closed_candle(open_time: u64, close: f64) -> Candle {
    Candle {
        open: close,
        high: close,
        low: close,
        close,
        open_time,
        close_time: open_time + 1_000,
    }
}

#[test]
fn tick_before_seed_is_rejected() {
    let mut window = CandleWindow::new(1_000, 20);
    let err = window.on_tick(100.0, 0).unwrap_err();
    assert!(matches!(err, AppError::EmptyWindow));
}

#[test]
fn boundary_tick_closes_and_anchors_new_candle() {
    let mut window = CandleWindow::new(1_000, 20);
    window.seed(vec![closed_candle(0, 100.0)]).unwrap();

    assert!(!window.on_tick(101.0, 400).unwrap());
    assert!(!window.on_tick(99.0, 900).unwrap());
    // a tick exactly on the boundary closes the active candle
    assert!(window.on_tick(102.0, 1_000).unwrap());

    let candles = window.candles();
    assert_eq!(candles.len(), 2);
    // the new bucket opens at the boundary, not at the tick timestamp
    assert_eq!(candles[1].open_time, 1_000);
    assert!((candles[1].open - 102.0).abs() < f64::EPSILON);
    // the closed candle kept its extremes
    assert!((candles[0].high - 101.0).abs() < f64::EPSILON);
    assert!((candles[0].low - 99.0).abs() < f64::EPSILON);
    assert!((candles[0].close - 99.0).abs() < f64::EPSILON);
}

#[test]
fn gap_creates_single_bucket_anchored_at_previous_close() {
    let mut window = CandleWindow::new(1_000, 20);
    window.seed(vec![closed_candle(0, 100.0)]).unwrap();

    // several buckets elapse without a tick; the grid still advances by one
    assert!(window.on_tick(100.0, 7_500).unwrap());

    let candles = window.candles();
    assert_eq!(candles.len(), 2);
    assert_eq!(candles[1].open_time, 1_000);
}

#[test]
fn eviction_is_strict_fifo() {
    let mut window = CandleWindow::new(1_000, 3);
    let records: Vec<Candle> = (0..3u64)
        .map(|i| closed_candle(i * 1_000, 100.0 + i as f64))
        .collect();
    window.seed(records).unwrap();

    let before: Vec<u64> = window.candles().iter().map(|c| c.open_time).collect();
    assert!(window.on_tick(200.0, 3_000).unwrap());
    let after: Vec<u64> = window.candles().iter().map(|c| c.open_time).collect();

    assert_eq!(window.len(), 3);
    assert_eq!(&after[..2], &before[1..]);
    assert_eq!(after[2], 3_000);
}

#[test]
fn length_never_exceeds_capacity() {
    let mut window = CandleWindow::new(1_000, 5);
    window.seed(vec![closed_candle(0, 100.0)]).unwrap();
    for i in 1..50u64 {
        window.on_tick(100.0 + i as f64, i * 1_000).unwrap();
        assert!(window.len() <= 5);
    }
}

#[test]
fn closed_candles_keep_ohlc_ordering() {
    let mut window = CandleWindow::new(1_000, 10);
    window.seed(vec![closed_candle(0, 100.0)]).unwrap();

    let prices = [101.0, 97.5, 103.2, 99.9, 98.1, 104.0, 100.5];
    for (i, price) in prices.iter().enumerate() {
        window.on_tick(*price, (i as u64) * 300).unwrap();
    }
    window.on_tick(100.0, 10_000).unwrap();

    for candle in window.candles() {
        assert!(candle.low <= candle.open.min(candle.close));
        assert!(candle.high >= candle.open.max(candle.close));
    }
}

#[test]
fn snapshot_is_idempotent_between_ticks() {
    let mut window = CandleWindow::new(1_000, 5);
    window
        .seed(vec![closed_candle(0, 100.0), closed_candle(1_000, 101.0)])
        .unwrap();
    let first = window.candles().to_vec();
    let second = window.candles().to_vec();
    assert_eq!(first, second);
}

#[test]
fn non_finite_price_fails_fast() {
    let mut window = CandleWindow::new(1_000, 5);
    window.seed(vec![closed_candle(0, 100.0)]).unwrap();

    assert!(matches!(
        window.on_tick(f64::NAN, 500),
        Err(AppError::InvalidTick(_))
    ));
    assert!(window.on_tick(f64::INFINITY, 500).is_err());

    // window state is untouched
    assert_eq!(window.len(), 1);
    assert!((window.latest().unwrap().close - 100.0).abs() < f64::EPSILON);
}

#[test]
fn seed_rejects_malformed_records() {
    let mut window = CandleWindow::new(1_000, 5);
    let inverted = Candle {
        open: 100.0,
        high: 99.0,
        low: 101.0,
        close: 100.0,
        open_time: 0,
        close_time: 1_000,
    };
    assert!(matches!(
        window.seed(vec![inverted]),
        Err(AppError::InvalidSeed(_))
    ));

    let not_finite = Candle {
        open: f64::NAN,
        high: 1.0,
        low: 1.0,
        close: 1.0,
        open_time: 0,
        close_time: 1_000,
    };
    assert!(window.seed(vec![not_finite]).is_err());
}

#[test]
fn seed_applies_eviction_per_append() {
    let mut window = CandleWindow::new(1_000, 3);
    let records: Vec<Candle> = (0..5u64).map(|i| closed_candle(i * 1_000, 100.0)).collect();
    assert_eq!(window.seed(records).unwrap(), 5);
    assert_eq!(window.len(), 3);
    assert_eq!(window.candles()[0].open_time, 2_000);
}

#[test]
fn late_tick_folds_into_active_candle() {
    let mut window = CandleWindow::new(1_000, 5);
    window.seed(vec![closed_candle(5_000, 100.0)]).unwrap();

    // a tick stamped before the active bucket still updates the active
    // candle; the window never rewrites closed history
    assert!(!window.on_tick(90.0, 1_234).unwrap());
    assert!((window.latest().unwrap().low - 90.0).abs() < f64::EPSILON);
}
