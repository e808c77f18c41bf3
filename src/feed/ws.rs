use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite;

use super::types::PythStreamMessage;
use crate::model::tick::Tick;

/// Exponential backoff for reconnection.
struct ExponentialBackoff {
    current: Duration,
    initial: Duration,
    max: Duration,
    factor: f64,
}

impl ExponentialBackoff {
    fn new(initial: Duration, max: Duration, factor: f64) -> Self {
        Self {
            current: initial,
            initial,
            max,
            factor,
        }
    }

    fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = Duration::from_secs_f64(
            (self.current.as_secs_f64() * self.factor).min(self.max.as_secs_f64()),
        );
        delay
    }

    fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Push-based price feed client. Subscribes to one feed id and forwards
/// `price_update` events as ticks; every other message type is ignored.
pub struct PythWsClient {
    url: String,
    feed_id: String,
}

impl PythWsClient {
    pub fn new(ws_url: &str, feed_id: &str) -> Self {
        Self {
            url: ws_url.to_string(),
            feed_id: feed_id.to_string(),
        }
    }

    /// Connect and run the WebSocket loop with automatic reconnection,
    /// sending ticks through `tick_tx`.
    pub async fn connect_and_run(
        &self,
        tick_tx: mpsc::Sender<Tick>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        let mut backoff =
            ExponentialBackoff::new(Duration::from_secs(1), Duration::from_secs(60), 2.0);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match self.connect_once(&tick_tx, &mut shutdown, &mut backoff).await {
                Ok(()) => {
                    // Clean shutdown requested
                    tracing::info!("Feed connection closed");
                    break;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Feed connection lost");

                    let delay = backoff.next_delay();
                    tracing::info!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Reconnecting to feed"
                    );

                    tokio::select! {
                        _ = tokio::time::sleep(delay) => continue,
                        _ = shutdown.changed() => {
                            tracing::info!("Shutdown during reconnect");
                            break;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    async fn connect_once(
        &self,
        tick_tx: &mpsc::Sender<Tick>,
        shutdown: &mut watch::Receiver<bool>,
        backoff: &mut ExponentialBackoff,
    ) -> Result<()> {
        tracing::info!(url = %self.url, "Connecting to price feed");

        let (ws_stream, _resp) = tokio_tungstenite::connect_async(&self.url)
            .await
            .context("WebSocket connect failed")?;
        backoff.reset();

        let (mut write, mut read) = ws_stream.split();

        let subscribe = serde_json::json!({
            "type": "subscribe",
            "ids": [self.feed_id],
        });
        write
            .send(tungstenite::Message::Text(subscribe.to_string()))
            .await
            .context("subscribe request failed")?;
        tracing::info!(feed_id = %self.feed_id, "Subscribed to price updates");

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(tungstenite::Message::Text(text))) => {
                            self.handle_text(&text, tick_tx);
                        }
                        Some(Ok(tungstenite::Message::Ping(_))) => {
                            // tokio-tungstenite answers pings automatically
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            return Err(anyhow::anyhow!("WebSocket read error: {}", e));
                        }
                        None => {
                            return Err(anyhow::anyhow!("WebSocket stream ended"));
                        }
                    }
                }
                _ = shutdown.changed() => {
                    return Ok(());
                }
            }
        }
    }

    fn handle_text(&self, text: &str, tick_tx: &mpsc::Sender<Tick>) {
        let message = match serde_json::from_str::<PythStreamMessage>(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to parse feed message");
                return;
            }
        };
        if message.message_type != "price_update" {
            return;
        }
        let Some(feed) = message.price_feed else {
            return;
        };
        if feed.id != self.feed_id {
            return;
        }

        let Some(timestamp_ms) = feed.price.publish_time_ms() else {
            tracing::warn!(
                publish_time = feed.price.publish_time,
                "Dropping tick with invalid publish time"
            );
            return;
        };
        let tick = Tick {
            price: feed.price.scaled_price(),
            confidence: feed.price.scaled_confidence(),
            timestamp_ms,
        };
        if tick_tx.try_send(tick).is_err() {
            tracing::warn!("Tick channel full, dropping tick");
        }
    }
}
