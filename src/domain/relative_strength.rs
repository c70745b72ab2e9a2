//! Benchmark-relative strength.
//!
//! Compares a security's trailing n-bar return against a market index. The
//! benchmark is chosen by ticker suffix; a missing or too-short benchmark
//! series degrades to "not outperforming" rather than an error.

pub const DEFAULT_LOOKBACK: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeStrength {
    /// stock_return - index_return over the lookback; `None` when either
    /// side could not be computed.
    pub value: Option<f64>,
    pub outperforming: bool,
}

impl RelativeStrength {
    pub fn unavailable() -> Self {
        RelativeStrength {
            value: None,
            outperforming: false,
        }
    }
}

/// Trailing n-bar percent change, aligned with the input.
pub fn pct_change(values: &[f64], n: usize) -> Vec<Option<f64>> {
    let len = values.len();
    if n == 0 {
        return vec![None; len];
    }
    (0..len)
        .map(|i| {
            if i < n || values[i - n] == 0.0 {
                None
            } else {
                Some((values[i] - values[i - n]) / values[i - n])
            }
        })
        .collect()
}

/// Per-bar relative strength, with the benchmark aligned to the stock series
/// by trailing position (both series end at the same session).
pub fn relative_strength_series(
    stock_closes: &[f64],
    benchmark_closes: &[f64],
    lookback: usize,
) -> Vec<Option<f64>> {
    let stock_returns = pct_change(stock_closes, lookback);
    let bench_returns = pct_change(benchmark_closes, lookback);

    let stock_len = stock_closes.len();
    let bench_len = benchmark_closes.len();

    (0..stock_len)
        .map(|i| {
            // Offset from the shared final bar.
            let from_end = stock_len - 1 - i;
            if from_end >= bench_len {
                return None;
            }
            let j = bench_len - 1 - from_end;
            match (stock_returns[i], bench_returns[j]) {
                (Some(s), Some(b)) => Some(s - b),
                _ => None,
            }
        })
        .collect()
}

/// Relative strength at the latest aligned bar.
pub fn relative_strength(
    stock_closes: &[f64],
    benchmark_closes: &[f64],
    lookback: usize,
) -> RelativeStrength {
    let series = relative_strength_series(stock_closes, benchmark_closes, lookback);
    match series.last().copied().flatten() {
        Some(value) => RelativeStrength {
            value: Some(value),
            outperforming: value > 0.0,
        },
        None => RelativeStrength::unavailable(),
    }
}

/// Benchmark index for a ticker, by exchange suffix.
pub fn benchmark_symbol(ticker: &str) -> &'static str {
    if ticker.ends_with(".ST") {
        "^OMX"
    } else {
        "^GSPC"
    }
}
