//! Multi-ticker scan.
//!
//! Runs the full analyze pipeline over a ticker list and collects per-ticker
//! outcomes. A ticker that cannot be scored is reported as a failure next to
//! the successes; it never aborts the batch. Each result is atomic: a ticker
//! either contributes a complete signal or a typed failure, nothing partial.

use crate::domain::error::SigtraderError;
use crate::domain::frame::{analyze, AnalyzeConfig};
use crate::domain::relative_strength::benchmark_symbol;
use crate::domain::risk::RiskLevels;
use crate::domain::score::Recommendation;
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone)]
pub struct ScreenOutcome {
    pub ticker: String,
    pub close: f64,
    pub score: u32,
    pub rule_count: u32,
    pub recommendation: Recommendation,
    pub risk: Option<RiskLevels>,
}

#[derive(Debug)]
pub struct ScreenFailure {
    pub ticker: String,
    pub error: SigtraderError,
}

#[derive(Debug, Default)]
pub struct ScreenReport {
    pub results: Vec<ScreenOutcome>,
    pub failures: Vec<ScreenFailure>,
}

/// Parse a comma-separated ticker list: trimmed, uppercased, no empties, no
/// duplicates.
pub fn parse_ticker_list(input: &str) -> Result<Vec<String>, SigtraderError> {
    let mut tickers = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(SigtraderError::ConfigInvalid {
                section: "screen".to_string(),
                key: "tickers".to_string(),
                reason: "empty token in ticker list".to_string(),
            });
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(SigtraderError::ConfigInvalid {
                section: "screen".to_string(),
                key: "tickers".to_string(),
                reason: format!("duplicate ticker: {ticker}"),
            });
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

pub fn screen(
    provider: &dyn DataPort,
    tickers: &[String],
    lookback_days: usize,
    config: &AnalyzeConfig,
) -> ScreenReport {
    let mut report = ScreenReport::default();

    for ticker in tickers {
        match screen_one(provider, ticker, lookback_days, config) {
            Ok(outcome) => report.results.push(outcome),
            Err(error) => report.failures.push(ScreenFailure {
                ticker: ticker.clone(),
                error,
            }),
        }
    }

    report
}

fn screen_one(
    provider: &dyn DataPort,
    ticker: &str,
    lookback_days: usize,
    config: &AnalyzeConfig,
) -> Result<ScreenOutcome, SigtraderError> {
    let bars = provider.fetch_daily_bars(ticker, lookback_days)?;
    if bars.is_empty() {
        return Err(SigtraderError::NoData {
            ticker: ticker.to_string(),
        });
    }

    // Benchmark fetch failures degrade the relative-strength rule, nothing
    // more.
    let benchmark_closes: Option<Vec<f64>> = if config.score.use_relative_strength {
        provider
            .fetch_benchmark_bars(benchmark_symbol(ticker), lookback_days)
            .ok()
            .map(|bars| bars.iter().map(|b| b.close).collect())
    } else {
        None
    };

    let frame = analyze(ticker, bars, benchmark_closes.as_deref(), config)?;

    let (score, recommendation) =
        frame
            .latest_signal()
            .ok_or_else(|| SigtraderError::InsufficientData {
                ticker: ticker.to_string(),
                bars: frame.len(),
                minimum: config.score.min_bars(),
            })?;

    Ok(ScreenOutcome {
        ticker: ticker.to_string(),
        close: frame.bars[frame.len() - 1].close,
        score,
        rule_count: config.score.rule_count(),
        recommendation,
        risk: frame.latest_risk(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::Bar;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    struct MockDataPort {
        data: HashMap<String, Vec<Bar>>,
    }

    impl MockDataPort {
        fn new() -> Self {
            MockDataPort {
                data: HashMap::new(),
            }
        }

        fn with_bars(mut self, ticker: &str, bars: Vec<Bar>) -> Self {
            self.data.insert(ticker.to_string(), bars);
            self
        }
    }

    impl DataPort for MockDataPort {
        fn fetch_daily_bars(
            &self,
            ticker: &str,
            _lookback_days: usize,
        ) -> Result<Vec<Bar>, SigtraderError> {
            Ok(self.data.get(ticker).cloned().unwrap_or_default())
        }

        fn list_tickers(&self) -> Result<Vec<String>, SigtraderError> {
            Ok(self.data.keys().cloned().collect())
        }
    }

    fn rising_bars(ticker: &str, n: usize) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| Bar {
                ticker: ticker.into(),
                date: start + chrono::Duration::days(i as i64),
                open: 100.0 + i as f64,
                high: 101.0 + i as f64,
                low: 99.0 + i as f64,
                close: 100.0 + i as f64,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn screen_scores_valid_tickers() {
        let port = MockDataPort::new().with_bars("AAA", rising_bars("AAA", 60));
        let report = screen(
            &port,
            &["AAA".to_string()],
            0,
            &AnalyzeConfig::default(),
        );

        assert_eq!(report.results.len(), 1);
        assert!(report.failures.is_empty());
        let outcome = &report.results[0];
        assert_eq!(outcome.ticker, "AAA");
        assert_eq!(outcome.rule_count, 4);
        assert!(outcome.risk.is_some());
    }

    #[test]
    fn screen_reports_missing_ticker_and_continues() {
        let port = MockDataPort::new().with_bars("AAA", rising_bars("AAA", 60));
        let report = screen(
            &port,
            &["MISSING".to_string(), "AAA".to_string()],
            0,
            &AnalyzeConfig::default(),
        );

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].ticker, "MISSING");
        assert!(matches!(
            report.failures[0].error,
            SigtraderError::NoData { .. }
        ));
    }

    #[test]
    fn screen_flags_short_history_as_insufficient() {
        let port = MockDataPort::new().with_bars("TINY", rising_bars("TINY", 5));
        let report = screen(
            &port,
            &["TINY".to_string()],
            0,
            &AnalyzeConfig::default(),
        );

        assert!(report.results.is_empty());
        assert!(matches!(
            report.failures[0].error,
            SigtraderError::InsufficientData { bars: 5, .. }
        ));
    }

    #[test]
    fn screen_empty_ticker_list() {
        let port = MockDataPort::new();
        let report = screen(&port, &[], 0, &AnalyzeConfig::default());
        assert!(report.results.is_empty());
        assert!(report.failures.is_empty());
    }

    #[test]
    fn parse_ticker_list_basic() {
        let tickers = parse_ticker_list("aapl, MSFT ,googl").unwrap();
        assert_eq!(tickers, vec!["AAPL", "MSFT", "GOOGL"]);
    }

    #[test]
    fn parse_ticker_list_rejects_empty_token() {
        assert!(parse_ticker_list("AAPL,,MSFT").is_err());
    }

    #[test]
    fn parse_ticker_list_rejects_duplicates() {
        assert!(parse_ticker_list("AAPL,MSFT,aapl").is_err());
    }
}
