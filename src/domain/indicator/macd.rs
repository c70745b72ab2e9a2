//! MACD (Moving Average Convergence Divergence).
//!
//! Line = EMA(fast) - EMA(slow)
//! Signal = EMA(signal) of the line, seeded with its first SMA
//! Histogram = Line - Signal
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: line defined from slow-1; signal and histogram from slow+signal-2.

use crate::domain::indicator::calculate_ema;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

pub fn calculate_macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> MacdSeries {
    let n = closes.len();
    if fast == 0 || slow == 0 || signal_period == 0 {
        return MacdSeries {
            line: vec![None; n],
            signal: vec![None; n],
            histogram: vec![None; n],
        };
    }

    let ema_fast = calculate_ema(closes, fast);
    let ema_slow = calculate_ema(closes, slow);

    let line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let line_start = slow.max(fast) - 1;
    let signal_start = line_start + signal_period - 1;
    let k = 2.0 / (signal_period as f64 + 1.0);

    let mut signal: Vec<Option<f64>> = vec![None; n];
    if signal_start < n {
        let seed: f64 = line[line_start..=signal_start]
            .iter()
            .map(|v| v.unwrap_or(0.0))
            .sum::<f64>()
            / signal_period as f64;

        let mut signal_ema = seed;
        signal[signal_start] = Some(signal_ema);
        for i in (signal_start + 1)..n {
            if let Some(line_val) = line[i] {
                signal_ema = line_val * k + signal_ema * (1.0 - k);
                signal[i] = Some(signal_ema);
            }
        }
    }

    let histogram: Vec<Option<f64>> = line
        .iter()
        .zip(signal.iter())
        .map(|(l, s)| match (l, s) {
            (Some(l), Some(s)) => Some(l - s),
            _ => None,
        })
        .collect();

    MacdSeries {
        line,
        signal,
        histogram,
    }
}

pub fn calculate_macd_default(closes: &[f64]) -> MacdSeries {
    calculate_macd(closes, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
