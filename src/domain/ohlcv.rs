//! OHLCV bar representation and series invariants.

use chrono::NaiveDate;

use crate::domain::error::SigtraderError;

#[derive(Debug, Clone)]
pub struct Bar {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Bar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Check the series invariant: strictly increasing dates (calendar gaps are
/// fine, duplicates and out-of-order bars are not).
pub fn validate_series(bars: &[Bar]) -> Result<(), SigtraderError> {
    for pair in bars.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(SigtraderError::InvalidSeries {
                ticker: pair[1].ticker.clone(),
                reason: format!(
                    "bar dated {} does not follow {}",
                    pair[1].date, pair[0].date
                ),
            });
        }
    }
    Ok(())
}

/// Close prices extracted in bar order.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
