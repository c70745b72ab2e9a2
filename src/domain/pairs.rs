//! Pairs-trading analysis: cointegration scan and spread Z-score.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::domain::indicator::{calculate_sma, rolling_stddev};
use crate::domain::ohlcv::Bar;
use crate::domain::stats::engle_granger_p_value;

/// Overlapping observations required before a pair is even testable
/// (roughly one trading year).
pub const MIN_OVERLAP: usize = 252;

/// Retention threshold for the cointegration p-value.
pub const COINT_P_THRESHOLD: f64 = 0.05;

pub const DEFAULT_SPREAD_WINDOW: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct CointegratedPair {
    pub ticker_a: String,
    pub ticker_b: String,
    pub p_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PairSkipReason {
    /// Overlapping history shorter than [`MIN_OVERLAP`]; the pair was not
    /// scored at all, which is different from testing non-cointegrated.
    InsufficientOverlap { observations: usize },
    /// The test itself could not produce a statistic (degenerate series).
    TestFailed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPair {
    pub ticker_a: String,
    pub ticker_b: String,
    pub reason: PairSkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct PairScan {
    pub pairs: Vec<CointegratedPair>,
    pub skipped: Vec<SkippedPair>,
}

/// Close series of both tickers restricted to their shared trading calendar,
/// in date order.
fn aligned_closes(bars_a: &[Bar], bars_b: &[Bar]) -> (Vec<NaiveDate>, Vec<f64>, Vec<f64>) {
    let by_date: HashMap<NaiveDate, f64> = bars_b.iter().map(|b| (b.date, b.close)).collect();

    let mut dates = Vec::new();
    let mut closes_a = Vec::new();
    let mut closes_b = Vec::new();
    for bar in bars_a {
        if let Some(&close_b) = by_date.get(&bar.date) {
            dates.push(bar.date);
            closes_a.push(bar.close);
            closes_b.push(close_b);
        }
    }
    (dates, closes_a, closes_b)
}

/// Scan every unordered pair of tickers for cointegration. One untestable or
/// failing pair never aborts the scan; it is reported in `skipped`.
pub fn find_cointegrated_pairs(series: &[(String, Vec<Bar>)]) -> PairScan {
    let mut scan = PairScan::default();

    for i in 0..series.len() {
        for j in (i + 1)..series.len() {
            let (ticker_a, bars_a) = &series[i];
            let (ticker_b, bars_b) = &series[j];

            let (_, closes_a, closes_b) = aligned_closes(bars_a, bars_b);
            if closes_a.len() < MIN_OVERLAP {
                scan.skipped.push(SkippedPair {
                    ticker_a: ticker_a.clone(),
                    ticker_b: ticker_b.clone(),
                    reason: PairSkipReason::InsufficientOverlap {
                        observations: closes_a.len(),
                    },
                });
                continue;
            }

            match engle_granger_p_value(&closes_a, &closes_b) {
                Some(p_value) if p_value < COINT_P_THRESHOLD => {
                    scan.pairs.push(CointegratedPair {
                        ticker_a: ticker_a.clone(),
                        ticker_b: ticker_b.clone(),
                        p_value,
                    });
                }
                Some(_) => {}
                None => scan.skipped.push(SkippedPair {
                    ticker_a: ticker_a.clone(),
                    ticker_b: ticker_b.clone(),
                    reason: PairSkipReason::TestFailed,
                }),
            }
        }
    }

    scan.pairs
        .sort_by(|a, b| a.p_value.partial_cmp(&b.p_value).unwrap_or(std::cmp::Ordering::Equal));
    scan
}

/// Ratio spread of a pair with its rolling Z-score.
#[derive(Debug, Clone)]
pub struct SpreadSeries {
    pub ticker_a: String,
    pub ticker_b: String,
    pub dates: Vec<NaiveDate>,
    /// close_a / close_b on the shared calendar.
    pub ratio: Vec<f64>,
    /// (ratio - rolling mean) / rolling sample stddev; `None` in the warm-up
    /// window and wherever the deviation is zero.
    pub z_score: Vec<Option<f64>>,
}

impl SpreadSeries {
    pub fn latest_z(&self) -> Option<f64> {
        self.z_score.last().copied().flatten()
    }
}

pub fn pair_spread(bars_a: &[Bar], bars_b: &[Bar], window: usize) -> SpreadSeries {
    let ticker_a = bars_a.first().map(|b| b.ticker.clone()).unwrap_or_default();
    let ticker_b = bars_b.first().map(|b| b.ticker.clone()).unwrap_or_default();

    let (dates, closes_a, closes_b) = aligned_closes(bars_a, bars_b);

    let mut kept_dates = Vec::with_capacity(dates.len());
    let mut ratio = Vec::with_capacity(dates.len());
    for ((date, a), b) in dates.into_iter().zip(closes_a).zip(closes_b) {
        if b != 0.0 {
            kept_dates.push(date);
            ratio.push(a / b);
        }
    }

    let mean = calculate_sma(&ratio, window);
    let stddev = rolling_stddev(&ratio, window);

    let z_score = ratio
        .iter()
        .zip(mean.iter().zip(stddev.iter()))
        .map(|(r, (m, sd))| match (m, sd) {
            (Some(m), Some(sd)) if *sd > 0.0 => Some((r - m) / sd),
            _ => None,
        })
        .collect();

    SpreadSeries {
        ticker_a,
        ticker_b,
        dates: kept_dates,
        ratio,
        z_score,
    }
}
