pub mod candle;
pub mod signal;
pub mod tick;
