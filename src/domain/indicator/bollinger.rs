//! Bollinger Bands.
//!
//! Middle: SMA over `window` closes
//! Upper/Lower: middle ± multiplier × rolling sample standard deviation
//!
//! Default parameters: window=20, multiplier=2.0
//! Warmup: first (window-1) outputs are `None`.

use crate::domain::indicator::{calculate_sma, rolling_stddev};

pub const DEFAULT_WINDOW: usize = 20;
pub const DEFAULT_MULT: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct BollingerSeries {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

pub fn calculate_bollinger(closes: &[f64], window: usize, mult: f64) -> BollingerSeries {
    let middle = calculate_sma(closes, window);
    let stddev = rolling_stddev(closes, window);

    let mut upper = Vec::with_capacity(closes.len());
    let mut lower = Vec::with_capacity(closes.len());

    for (m, sd) in middle.iter().zip(stddev.iter()) {
        match (m, sd) {
            (Some(m), Some(sd)) => {
                upper.push(Some(m + mult * sd));
                lower.push(Some(m - mult * sd));
            }
            _ => {
                upper.push(None);
                lower.push(None);
            }
        }
    }

    BollingerSeries {
        upper,
        middle,
        lower,
    }
}
