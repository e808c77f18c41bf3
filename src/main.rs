use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch};

use pulse_quant::config::Config;
use pulse_quant::engine::{self, SignalEngine};
use pulse_quant::feed::ws::PythWsClient;
use pulse_quant::history::rest::{HistoryClient, MAX_KLINE_LIMIT};
use pulse_quant::model::candle::CandleWindow;
use pulse_quant::model::tick::Tick;

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (required by rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                config
                    .logging
                    .level
                    .parse()
                    .unwrap_or_else(|_| "info".parse().unwrap())
            }),
        )
        .init();

    let bucket_ms = config.engine.bucket_ms()?;
    tracing::info!(
        asset = %config.feed.asset,
        symbol = %config.history.symbol,
        interval = %config.engine.candle_interval,
        capacity = config.engine.window_capacity,
        "Starting pulse-quant"
    );

    let window = CandleWindow::new(bucket_ms, config.engine.window_capacity);
    let mut signal_engine = SignalEngine::new(
        window,
        config.engine.indicator_params(),
        config.engine.thresholds(),
    );

    // Bootstrap before subscribing to the live feed: the window is seeded
    // and indicators are defined by the time the first tick arrives, and no
    // tick can precede the seed.
    let history = HistoryClient::new(&config.history.rest_base_url);
    let end_ms = chrono::Utc::now().timestamp_millis() as u64;
    let start_ms = end_ms.saturating_sub(bucket_ms * config.engine.window_capacity as u64);
    tracing::info!(start_ms, end_ms, "Fetching historical candles");
    let records = history
        .get_klines(
            &config.history.symbol,
            &config.engine.candle_interval,
            bucket_ms,
            start_ms,
            end_ms,
            MAX_KLINE_LIMIT,
        )
        .await
        .context("bootstrap fetch failed")?;
    let seeded = signal_engine.seed(records).context("bootstrap seed failed")?;
    tracing::info!(candles = seeded, "Seeded candle window");

    // Channels
    let (tick_tx, mut tick_rx) = mpsc::channel::<Tick>(256);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let ws_client = PythWsClient::new(&config.feed.ws_url, &config.feed.feed_id);
    let feed_shutdown = shutdown_rx.clone();
    let feed_task = tokio::spawn(async move {
        if let Err(e) = ws_client.connect_and_run(tick_tx, feed_shutdown).await {
            tracing::error!(error = %e, "Feed task failed");
        }
    });

    let ctrl_c_shutdown = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Ctrl-C received, shutting down");
        let _ = ctrl_c_shutdown.send(true);
    });

    let result = engine::run(&mut signal_engine, &mut tick_rx, shutdown_rx, |signal| {
        if signal.is_actionable() {
            tracing::info!(kind = %signal.kind, price = signal.price, "Signal");
        }
    })
    .await;

    let _ = shutdown_tx.send(true);
    let _ = feed_task.await;
    result
}
