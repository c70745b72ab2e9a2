//! Ranked provider fallback.
//!
//! Tries a list of data ports in order and returns the first non-empty
//! result. This models the retry-then-fallback behavior of stacked upstream
//! providers as an explicit ranked list rather than implicit retry logic.

use crate::domain::error::SigtraderError;
use crate::domain::ohlcv::Bar;
use crate::ports::data_port::DataPort;

pub struct FallbackAdapter {
    providers: Vec<Box<dyn DataPort>>,
}

impl FallbackAdapter {
    pub fn new(providers: Vec<Box<dyn DataPort>>) -> Self {
        Self { providers }
    }
}

impl DataPort for FallbackAdapter {
    fn fetch_daily_bars(
        &self,
        ticker: &str,
        lookback_days: usize,
    ) -> Result<Vec<Bar>, SigtraderError> {
        for provider in &self.providers {
            match provider.fetch_daily_bars(ticker, lookback_days) {
                Ok(bars) if !bars.is_empty() => return Ok(bars),
                Ok(_) | Err(_) => continue,
            }
        }
        Err(SigtraderError::NoData {
            ticker: ticker.to_string(),
        })
    }

    fn list_tickers(&self) -> Result<Vec<String>, SigtraderError> {
        let mut tickers = Vec::new();
        for provider in &self.providers {
            if let Ok(found) = provider.list_tickers() {
                tickers.extend(found);
            }
        }
        tickers.sort();
        tickers.dedup();
        Ok(tickers)
    }
}
