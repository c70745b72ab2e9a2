//! ATR (Average True Range).
//!
//! Wilder smoothing over the true-range series:
//! - First value: simple mean of the first n true ranges
//! - Subsequent: ATR[i] = (ATR[i-1] * (n-1) + TR[i]) / n
//!
//! The first bar's true range is high - low (no prior close).
//! Warmup: first (n-1) outputs are `None`.

use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_atr(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    let n = bars.len();
    if period == 0 || n < period {
        return vec![None; n];
    }

    let mut tr_values = Vec::with_capacity(n);
    for (i, bar) in bars.iter().enumerate() {
        let tr = if i == 0 {
            bar.high - bar.low
        } else {
            bar.true_range(bars[i - 1].close)
        };
        tr_values.push(tr);
    }

    let mut out = vec![None; n];
    let mut atr = tr_values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(atr);

    for i in period..n {
        atr = (atr * (period - 1) as f64 + tr_values[i]) / period as f64;
        out[i] = Some(atr);
    }

    out
}
