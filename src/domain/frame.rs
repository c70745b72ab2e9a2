//! Strongly-typed indicator frame.
//!
//! One `IndicatorFrame` bundles a bar series with every derived column, each
//! positionally aligned with the bars and addressed by a fixed field rather
//! than a column-name lookup. A frame is built in one shot by [`analyze`]:
//! callers either get a fully-populated frame or an error, never a partial
//! one.

use crate::domain::error::SigtraderError;
use crate::domain::indicator::{
    calculate_atr, calculate_bollinger, calculate_macd_default, calculate_obv, calculate_rsi,
    calculate_sma,
};
use crate::domain::ohlcv::{closes, validate_series, Bar};
use crate::domain::relative_strength::relative_strength_series;
use crate::domain::risk::{risk_levels, RiskLevels, RiskParams};
use crate::domain::score::{recommendation, score_bar, Recommendation, ScoreConfig};

#[derive(Debug, Clone, Default)]
pub struct AnalyzeConfig {
    pub score: ScoreConfig,
    pub risk: RiskParams,
}

#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    pub ticker: String,
    pub bars: Vec<Bar>,
    pub sma_short: Vec<Option<f64>>,
    pub sma_long: Vec<Option<f64>>,
    pub sma_confirm_short: Vec<Option<f64>>,
    pub sma_confirm_long: Vec<Option<f64>>,
    pub macd_line: Vec<Option<f64>>,
    pub macd_signal: Vec<Option<f64>>,
    pub macd_histogram: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
    pub obv: Vec<f64>,
    pub obv_sma: Vec<Option<f64>>,
    pub atr: Vec<Option<f64>>,
    pub boll_upper: Vec<Option<f64>>,
    pub boll_middle: Vec<Option<f64>>,
    pub boll_lower: Vec<Option<f64>>,
    pub relative_strength: Vec<Option<f64>>,
    pub score: Vec<Option<u32>>,
    pub recommendation: Vec<Option<Recommendation>>,
    pub risk: Vec<Option<RiskLevels>>,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Score and recommendation at the final bar, if computable.
    pub fn latest_signal(&self) -> Option<(u32, Recommendation)> {
        let score = self.score.last().copied().flatten()?;
        let rec = self.recommendation.last().copied().flatten()?;
        Some((score, rec))
    }

    /// Risk levels at the final bar, if ATR is defined there.
    pub fn latest_risk(&self) -> Option<RiskLevels> {
        self.risk.last().copied().flatten()
    }
}

/// Compute every indicator, score, recommendation, and risk column for a bar
/// series. Empty input is a `NoData` error; a short-but-nonempty series
/// succeeds with the warm-up columns left `None` so callers can distinguish
/// "insufficient" per bar.
pub fn analyze(
    ticker: &str,
    bars: Vec<Bar>,
    benchmark_closes: Option<&[f64]>,
    config: &AnalyzeConfig,
) -> Result<IndicatorFrame, SigtraderError> {
    if bars.is_empty() {
        return Err(SigtraderError::NoData {
            ticker: ticker.to_string(),
        });
    }
    validate_series(&bars)?;

    let score_cfg = &config.score;
    let close_prices = closes(&bars);
    let n = bars.len();

    let sma_short = calculate_sma(&close_prices, score_cfg.short_window);
    let sma_long = calculate_sma(&close_prices, score_cfg.long_window);

    let (sma_confirm_short, sma_confirm_long) = match score_cfg.confirm_windows {
        Some((short, long)) => (
            calculate_sma(&close_prices, short),
            calculate_sma(&close_prices, long),
        ),
        None => (vec![None; n], vec![None; n]),
    };

    let macd = calculate_macd_default(&close_prices);
    let rsi = calculate_rsi(&close_prices, score_cfg.rsi_period);
    let obv = calculate_obv(&bars);
    let obv_sma = calculate_sma(&obv, score_cfg.obv_window);
    let atr = calculate_atr(&bars, score_cfg.atr_period);
    let bands = calculate_bollinger(
        &close_prices,
        score_cfg.bollinger_window,
        score_cfg.bollinger_mult,
    );

    let relative_strength = match benchmark_closes {
        Some(bench) => relative_strength_series(&close_prices, bench, score_cfg.rs_lookback),
        None => vec![None; n],
    };

    let risk = bars
        .iter()
        .zip(atr.iter())
        .map(|(bar, atr)| risk_levels(bar.close, *atr, &config.risk))
        .collect();

    let mut frame = IndicatorFrame {
        ticker: ticker.to_string(),
        bars,
        sma_short,
        sma_long,
        sma_confirm_short,
        sma_confirm_long,
        macd_line: macd.line,
        macd_signal: macd.signal,
        macd_histogram: macd.histogram,
        rsi,
        obv,
        obv_sma,
        atr,
        boll_upper: bands.upper,
        boll_middle: bands.middle,
        boll_lower: bands.lower,
        relative_strength,
        score: Vec::with_capacity(n),
        recommendation: Vec::with_capacity(n),
        risk,
    };

    let rule_count = score_cfg.rule_count();
    for i in 0..n {
        let score = score_bar(&frame, i, score_cfg);
        frame.score.push(score);
        frame
            .recommendation
            .push(score.map(|s| recommendation(s, rule_count)));
    }

    Ok(frame)
}
