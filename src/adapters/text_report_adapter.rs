//! Plain-text report adapter.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SigtraderError;
use crate::domain::screener::ScreenReport;
use crate::ports::report_port::ReportPort;
use std::fmt::Write as _;
use std::fs;

pub struct TextReportAdapter;

impl TextReportAdapter {
    pub fn format_backtest(result: &BacktestResult) -> String {
        let m = &result.metrics;
        let mut out = String::new();

        let _ = writeln!(out, "Backtest: {} ({})", result.ticker, result.strategy);
        let _ = writeln!(out, "{}", "-".repeat(40));
        let _ = writeln!(out, "Total return:        {:>10.2}%", m.total_return * 100.0);
        let _ = writeln!(
            out,
            "Annualized return:   {:>10.2}%",
            m.annualized_return * 100.0
        );
        let _ = writeln!(out, "Sharpe ratio:        {:>10.2}", m.sharpe_ratio);
        let _ = writeln!(out, "Sortino ratio:       {:>10.2}", m.sortino_ratio);
        let _ = writeln!(out, "Max drawdown:        {:>10.2}%", m.max_drawdown * 100.0);
        let _ = writeln!(
            out,
            "Trades:              {:>10} ({} won / {} lost / {} even)",
            result.trades.len(),
            m.trades_won,
            m.trades_lost,
            m.trades_breakeven
        );
        let _ = writeln!(out, "Win rate:            {:>10.1}%", m.win_rate * 100.0);
        let _ = writeln!(out, "Profit factor:       {:>10.2}", m.profit_factor);
        let _ = writeln!(out, "Final equity:        {:>10.2}", result.final_equity);

        out
    }

    pub fn format_screen(report: &ScreenReport) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Ticker      Close      Score  Recommendation");
        let _ = writeln!(out, "{}", "-".repeat(46));
        for outcome in &report.results {
            let _ = writeln!(
                out,
                "{:<10} {:>9.2} {:>5}/{}  {}",
                outcome.ticker,
                outcome.close,
                outcome.score,
                outcome.rule_count,
                outcome.recommendation
            );
        }
        for failure in &report.failures {
            let _ = writeln!(out, "{:<10} skipped: {}", failure.ticker, failure.error);
        }

        out
    }
}

impl ReportPort for TextReportAdapter {
    fn write_backtest(
        &self,
        result: &BacktestResult,
        output_path: &str,
    ) -> Result<(), SigtraderError> {
        fs::write(output_path, Self::format_backtest(result))?;
        Ok(())
    }

    fn write_screen(
        &self,
        report: &ScreenReport,
        output_path: &str,
    ) -> Result<(), SigtraderError> {
        fs::write(output_path, Self::format_screen(report))?;
        Ok(())
    }
}
