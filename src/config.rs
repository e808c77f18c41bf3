use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::engine::SignalThresholds;
use crate::indicator::IndicatorParams;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub feed: FeedConfig,
    pub history: HistoryConfig,
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub ws_url: String,
    /// Price feed id of the tracked asset on the streaming service.
    pub feed_id: String,
    pub asset: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    pub rest_base_url: String,
    pub symbol: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Candle bucket duration as an interval label ("1s", "1m", ...). The
    /// same label is passed to the historical klines request, so the seeded
    /// candles land on the live bucket grid.
    pub candle_interval: String,
    pub window_capacity: usize,
    pub sma_period: usize,
    pub rsi_period: usize,
    pub bollinger_period: usize,
    pub bollinger_multiplier: f64,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Parse a kline interval string (e.g. "1s", "1m", "1h", "1d", "1w", "1M") into milliseconds.
pub fn parse_interval_ms(s: &str) -> Result<u64> {
    if s.len() < 2 {
        bail!("invalid interval '{}': expected format like '1m'", s);
    }

    let (num_str, suffix) = s.split_at(s.len() - 1);
    let n: u64 = num_str.parse().with_context(|| {
        format!(
            "invalid interval '{}': quantity must be a positive integer",
            s
        )
    })?;
    if n == 0 {
        bail!("invalid interval '{}': quantity must be > 0", s);
    }

    let unit_ms = match suffix {
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        "d" => 86_400_000,
        "w" => 7 * 86_400_000,
        "M" => 30 * 86_400_000,
        _ => bail!(
            "invalid interval '{}': unsupported suffix '{}', expected one of s/m/h/d/w/M",
            s,
            suffix
        ),
    };

    n.checked_mul(unit_ms)
        .with_context(|| format!("invalid interval '{}': value is too large", s))
}

impl EngineConfig {
    pub fn bucket_ms(&self) -> Result<u64> {
        parse_interval_ms(&self.candle_interval)
    }

    pub fn indicator_params(&self) -> IndicatorParams {
        IndicatorParams {
            sma_period: self.sma_period,
            rsi_period: self.rsi_period,
            bollinger_period: self.bollinger_period,
            bollinger_multiplier: self.bollinger_multiplier,
        }
    }

    pub fn thresholds(&self) -> SignalThresholds {
        SignalThresholds {
            rsi_oversold: self.rsi_oversold,
            rsi_overbought: self.rsi_overbought,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bucket_ms().context("engine.candle_interval is invalid")?;
        if self.window_capacity == 0 {
            bail!("engine.window_capacity must be > 0");
        }
        if self.sma_period == 0 || self.rsi_period == 0 || self.bollinger_period == 0 {
            bail!("indicator periods must be > 0");
        }
        // A window that cannot hold an indicator's lookback leaves that
        // indicator permanently undefined.
        if self.window_capacity < self.rsi_period + 1 {
            bail!(
                "engine.window_capacity ({}) must be at least rsi_period + 1 ({})",
                self.window_capacity,
                self.rsi_period + 1
            );
        }
        if self.window_capacity < self.sma_period || self.window_capacity < self.bollinger_period {
            bail!("engine.window_capacity must cover the sma and bollinger periods");
        }
        if self.bollinger_multiplier <= 0.0 {
            bail!("engine.bollinger_multiplier must be > 0");
        }
        if self.rsi_oversold >= self.rsi_overbought {
            bail!("engine.rsi_oversold must be below engine.rsi_overbought");
        }
        Ok(())
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config/default.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        config.engine.validate()?;

        Ok(config)
    }
}
