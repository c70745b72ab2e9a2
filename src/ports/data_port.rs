//! Data access port trait.
//!
//! The one interface the core consumes from its environment: ordered daily
//! bars for a ticker. Implementations may be files, databases, or network
//! fetchers; the core only sees resolved series. An empty result is a valid
//! answer and is handled by callers as a per-ticker "no data" outcome.

use crate::domain::error::SigtraderError;
use crate::domain::ohlcv::Bar;

pub trait DataPort {
    /// Ordered daily bars for `ticker`, at most the trailing `lookback_days`
    /// bars (0 means the full available history).
    fn fetch_daily_bars(
        &self,
        ticker: &str,
        lookback_days: usize,
    ) -> Result<Vec<Bar>, SigtraderError>;

    /// Benchmark index bars, same contract as [`fetch_daily_bars`].
    ///
    /// [`fetch_daily_bars`]: DataPort::fetch_daily_bars
    fn fetch_benchmark_bars(
        &self,
        index_symbol: &str,
        lookback_days: usize,
    ) -> Result<Vec<Bar>, SigtraderError> {
        self.fetch_daily_bars(index_symbol, lookback_days)
    }

    fn list_tickers(&self) -> Result<Vec<String>, SigtraderError>;
}
