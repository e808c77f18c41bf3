use serde::Deserialize;

/// Deserialize string-encoded integer mantissas to i64.
pub fn string_to_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse::<i64>().map_err(serde::de::Error::custom)
}

/// Envelope for Hermes stream messages. Only `price_update` carries a price
/// feed; subscription acks and heartbeats deserialize with `price_feed:
/// None` and are ignored upstream of the engine.
#[derive(Debug, Deserialize)]
pub struct PythStreamMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub price_feed: Option<PythPriceFeed>,
}

#[derive(Debug, Deserialize)]
pub struct PythPriceFeed {
    pub id: String,
    pub price: PythPrice,
}

/// Fixed-point price: integer mantissa scaled by 10^expo.
#[derive(Debug, Deserialize)]
pub struct PythPrice {
    #[serde(deserialize_with = "string_to_i64")]
    pub price: i64,
    #[serde(deserialize_with = "string_to_i64")]
    pub conf: i64,
    pub expo: i32,
    /// Seconds since epoch.
    pub publish_time: i64,
}

impl PythPrice {
    /// Scale the fixed-point mantissa into a float once, at the feed edge.
    /// Everything downstream works in floating point.
    pub fn scaled_price(&self) -> f64 {
        self.price as f64 * 10f64.powi(self.expo)
    }

    pub fn scaled_confidence(&self) -> f64 {
        self.conf as f64 * 10f64.powi(self.expo)
    }

    /// Publish time in milliseconds; `None` for times a candle timestamp
    /// cannot represent.
    pub fn publish_time_ms(&self) -> Option<u64> {
        u64::try_from(self.publish_time)
            .ok()
            .and_then(|secs| secs.checked_mul(1_000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_price_update() {
        let json = r#"{
            "type": "price_update",
            "price_feed": {
                "id": "ef0d8b6fda2ceba41da15d4095d1da392a0d2f8ed0c6c7bc0f4cfac8c280b56d",
                "price": {
                    "price": "16271000000",
                    "conf": "12490000",
                    "expo": -8,
                    "publish_time": 1717632000
                }
            }
        }"#;
        let message: PythStreamMessage = serde_json::from_str(json).unwrap();
        assert_eq!(message.message_type, "price_update");

        let feed = message.price_feed.unwrap();
        assert!((feed.price.scaled_price() - 162.71).abs() < 1e-9);
        assert!((feed.price.scaled_confidence() - 0.1249).abs() < 1e-9);
        assert_eq!(feed.price.publish_time_ms(), Some(1_717_632_000_000));
    }

    #[test]
    fn deserialize_subscription_ack() {
        let json = r#"{"type": "response", "status": "success"}"#;
        let message: PythStreamMessage = serde_json::from_str(json).unwrap();
        assert_eq!(message.message_type, "response");
        assert!(message.price_feed.is_none());
    }

    #[test]
    fn negative_publish_time_is_rejected() {
        let price = PythPrice {
            price: 100,
            conf: 1,
            expo: 0,
            publish_time: -1,
        };
        assert_eq!(price.publish_time_ms(), None);
    }
}
