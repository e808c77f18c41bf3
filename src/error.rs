use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("bootstrap failed: {0}")]
    Bootstrap(String),

    #[error("tick arrived before the candle window was seeded")]
    EmptyWindow,

    #[error("invalid tick: {0}")]
    InvalidTick(String),

    #[error("invalid seed candle: {0}")]
    InvalidSeed(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
