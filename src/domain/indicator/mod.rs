//! Technical indicator implementations.
//!
//! Every indicator is a pure function from a price (and volume) series to one
//! or more output series positionally aligned with the input. Values inside
//! the warm-up window are `None`, never a numeric placeholder.

pub mod sma;
pub mod ema;
pub mod rsi;
pub mod macd;
pub mod bollinger;
pub mod atr;
pub mod obv;
pub mod stddev;

pub use atr::calculate_atr;
pub use bollinger::{calculate_bollinger, BollingerSeries};
pub use ema::calculate_ema;
pub use macd::{calculate_macd, calculate_macd_default, MacdSeries};
pub use obv::calculate_obv;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stddev::rolling_stddev;
