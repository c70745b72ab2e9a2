//! Report generation port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SigtraderError;
use crate::domain::screener::ScreenReport;

/// Port for writing analysis and backtest reports.
pub trait ReportPort {
    fn write_backtest(
        &self,
        result: &BacktestResult,
        output_path: &str,
    ) -> Result<(), SigtraderError>;

    fn write_screen(
        &self,
        report: &ScreenReport,
        output_path: &str,
    ) -> Result<(), SigtraderError>;
}
