use serde_json::Value;

use crate::error::AppError;
use crate::model::candle::Candle;

/// The spot klines endpoint caps `limit` at 1000 rows per request.
pub const MAX_KLINE_LIMIT: usize = 1000;

/// One-shot historical OHLC source used to seed the candle window before
/// the live feed is subscribed.
pub struct HistoryClient {
    http: reqwest::Client,
    base_url: String,
}

impl HistoryClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.to_string(),
        }
    }

    /// Fetch up to `limit` closed candles for `symbol` between `start_ms`
    /// and `end_ms`, oldest first. The source's chronological ordering is
    /// trusted. Any transport or parse failure is fatal: the engine cannot
    /// start without its minimum history.
    pub async fn get_klines(
        &self,
        symbol: &str,
        interval: &str,
        interval_ms: u64,
        start_ms: u64,
        end_ms: u64,
        limit: usize,
    ) -> Result<Vec<Candle>, AppError> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let limit = limit.clamp(1, MAX_KLINE_LIMIT);
        let start_s = start_ms.to_string();
        let end_s = end_ms.to_string();
        let limit_s = limit.to_string();

        let rows: Vec<Vec<Value>> = self
            .http
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("interval", interval),
                ("startTime", start_s.as_str()),
                ("endTime", end_s.as_str()),
                ("limit", limit_s.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Bootstrap(format!("klines request failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::Bootstrap(format!("klines returned error status: {e}")))?
            .json()
            .await
            .map_err(|e| AppError::Bootstrap(format!("klines JSON parse failed: {e}")))?;

        let mut candles = Vec::with_capacity(rows.len());
        for row in &rows {
            candles.push(parse_kline_row(row, interval_ms)?);
        }
        Ok(candles)
    }
}

/// Parse one kline row: `[openTimeMs, "open", "high", "low", "close", ...]`.
/// Only the first five fields are consumed; OHLC arrives string-encoded.
pub fn parse_kline_row(row: &[Value], interval_ms: u64) -> Result<Candle, AppError> {
    if row.len() < 5 {
        return Err(AppError::Bootstrap(format!(
            "kline row has {} fields, expected at least 5",
            row.len()
        )));
    }

    let open_time = row[0]
        .as_u64()
        .ok_or_else(|| AppError::Bootstrap("kline open time is not an integer".to_string()))?;
    let open = field_to_f64(&row[1], "open")?;
    let high = field_to_f64(&row[2], "high")?;
    let low = field_to_f64(&row[3], "low")?;
    let close = field_to_f64(&row[4], "close")?;

    Ok(Candle {
        open,
        high,
        low,
        close,
        open_time,
        close_time: open_time + interval_ms,
    })
}

fn field_to_f64(value: &Value, name: &str) -> Result<f64, AppError> {
    let parsed = match value {
        Value::String(s) => s.parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(AppError::Bootstrap(format!(
            "kline {name} is not a finite number"
        ))),
    }
}
