//! Backtest engine: a single-position replay loop.
//!
//! The engine walks an [`IndicatorFrame`] bar by bar with a Flat/Long state
//! machine. Strategy variants are just a predicate pair injected into the one
//! shared loop; both the score-driven and the mean-reversion strategies ride
//! on identical execution mechanics.
//!
//! Execution model: market-on-close fills, a proportional commission on both
//! sides, whole shares only, no slippage, no leverage, no shorting. A still
//! open position is liquidated at the final bar so the reported statistics
//! always settle in cash.

use crate::domain::error::SigtraderError;
use crate::domain::frame::IndicatorFrame;
use crate::domain::metrics::Metrics;
use crate::domain::position::{ClosedTrade, EquityPoint, Position};
use crate::domain::score::{mean_reversion_signal, Recommendation, Side};

/// Minimum bars before a backtest is worth running (covers the longest
/// default indicator warm-up).
pub const MIN_BACKTEST_BARS: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// Commission per side as a percentage of trade value (0.2 = 0.2%).
    pub commission_pct: f64,
    /// Fraction of available cash committed per entry.
    pub position_size: f64,
    pub risk_free_rate: f64,
    pub min_bars: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 100_000.0,
            commission_pct: 0.2,
            position_size: 1.0,
            risk_free_rate: 0.05,
            min_bars: MIN_BACKTEST_BARS,
        }
    }
}

/// Entry/exit predicate pair evaluated per bar against the frame.
pub struct TradeRules {
    pub name: String,
    entry: Box<dyn Fn(&IndicatorFrame, usize) -> bool>,
    exit: Box<dyn Fn(&IndicatorFrame, usize) -> bool>,
}

impl TradeRules {
    pub fn new(
        name: impl Into<String>,
        entry: Box<dyn Fn(&IndicatorFrame, usize) -> bool>,
        exit: Box<dyn Fn(&IndicatorFrame, usize) -> bool>,
    ) -> Self {
        TradeRules {
            name: name.into(),
            entry,
            exit,
        }
    }

    /// Signal-score strategy: enter on Strong Buy, exit on Neutral/Sell,
    /// hold through plain Buy bars.
    pub fn score_driven() -> Self {
        TradeRules::new(
            "signal-score",
            Box::new(|frame, i| frame.recommendation[i] == Some(Recommendation::StrongBuy)),
            Box::new(|frame, i| frame.recommendation[i] == Some(Recommendation::NeutralSell)),
        )
    }

    /// Mean-reversion strategy: Bollinger lower-band entry with depressed
    /// RSI, middle-band exit with recovered RSI.
    pub fn mean_reversion() -> Self {
        TradeRules::new(
            "mean-reversion",
            Box::new(|frame, i| mean_reversion_signal(frame, i) == Some(Side::Buy)),
            Box::new(|frame, i| mean_reversion_signal(frame, i) == Some(Side::Sell)),
        )
    }

    pub fn should_enter(&self, frame: &IndicatorFrame, i: usize) -> bool {
        (self.entry)(frame, i)
    }

    pub fn should_exit(&self, frame: &IndicatorFrame, i: usize) -> bool {
        (self.exit)(frame, i)
    }
}

impl std::fmt::Debug for TradeRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradeRules")
            .field("name", &self.name)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub ticker: String,
    pub strategy: String,
    pub trades: Vec<ClosedTrade>,
    pub equity_curve: Vec<EquityPoint>,
    pub final_equity: f64,
    pub metrics: Metrics,
}

fn commission(trade_value: f64, config: &BacktestConfig) -> f64 {
    trade_value * config.commission_pct / 100.0
}

/// Replay the strategy over the frame.
///
/// Refuses to run on a window shorter than `config.min_bars`: zero-trade
/// statistics from an unwarmed frame would look valid while meaning nothing.
pub fn run_backtest(
    frame: &IndicatorFrame,
    rules: &TradeRules,
    config: &BacktestConfig,
) -> Result<BacktestResult, SigtraderError> {
    if frame.len() < config.min_bars {
        return Err(SigtraderError::InsufficientData {
            ticker: frame.ticker.clone(),
            bars: frame.len(),
            minimum: config.min_bars,
        });
    }
    if config.initial_capital <= 0.0 {
        return Err(SigtraderError::InvalidRiskConfig {
            reason: "initial_capital must be positive".into(),
        });
    }
    if !(0.0..=1.0).contains(&config.position_size) || config.position_size == 0.0 {
        return Err(SigtraderError::InvalidRiskConfig {
            reason: "position_size must be in (0, 1]".into(),
        });
    }
    if config.commission_pct < 0.0 {
        return Err(SigtraderError::InvalidRiskConfig {
            reason: "commission_pct must be non-negative".into(),
        });
    }

    let n = frame.len();
    let mut cash = config.initial_capital;
    let mut open_position: Option<Position> = None;
    let mut trades: Vec<ClosedTrade> = Vec::new();
    let mut equity_curve: Vec<EquityPoint> = Vec::with_capacity(n);

    for i in 0..n {
        let bar = &frame.bars[i];
        let price = bar.close;
        let last_bar = i == n - 1;

        match open_position.take() {
            Some(position) => {
                if rules.should_exit(frame, i) || last_bar {
                    let exit_value = position.market_value(price);
                    let exit_commission = commission(exit_value, config);
                    let pnl = position.unrealized_pnl(price)
                        - position.entry_commission
                        - exit_commission;

                    cash += exit_value - exit_commission;
                    trades.push(ClosedTrade {
                        ticker: frame.ticker.clone(),
                        quantity: position.quantity,
                        entry_price: position.entry_price,
                        exit_price: price,
                        entry_date: position.entry_date,
                        exit_date: bar.date,
                        pnl,
                    });
                } else {
                    // Entry signals while long are no-ops.
                    open_position = Some(position);
                }
            }
            None => {
                if !last_bar && rules.should_enter(frame, i) {
                    let available = cash * config.position_size;
                    // Size so that cost plus entry commission fits the
                    // committed cash.
                    let quantity = (available
                        / (price * (1.0 + config.commission_pct / 100.0)))
                        .floor() as i64;

                    if quantity > 0 {
                        let cost = quantity as f64 * price;
                        let entry_commission = commission(cost, config);
                        cash -= cost + entry_commission;
                        open_position = Some(Position {
                            quantity,
                            entry_price: price,
                            entry_date: bar.date,
                            entry_commission,
                        });
                    }
                }
            }
        }

        let equity = cash
            + open_position
                .as_ref()
                .map(|p| p.market_value(price))
                .unwrap_or(0.0);
        equity_curve.push(EquityPoint {
            date: bar.date,
            equity,
        });
    }

    let final_equity = equity_curve.last().map(|p| p.equity).unwrap_or(cash);
    let metrics = Metrics::compute(
        &trades,
        &equity_curve,
        config.initial_capital,
        config.risk_free_rate,
    );

    Ok(BacktestResult {
        ticker: frame.ticker.clone(),
        strategy: rules.name.clone(),
        trades,
        equity_curve,
        final_equity,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::frame::{analyze, AnalyzeConfig};
    use crate::domain::ohlcv::Bar;
    use chrono::NaiveDate;

    fn make_bars(closes: &[f64]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                ticker: "TEST".into(),
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000,
            })
            .collect()
    }

    fn frame_from(closes: &[f64]) -> IndicatorFrame {
        analyze("TEST", make_bars(closes), None, &AnalyzeConfig::default()).unwrap()
    }

    fn bar_index_rules(entry_at: usize, exit_at: usize) -> TradeRules {
        TradeRules::new(
            "fixed-bars",
            Box::new(move |_, i| i == entry_at),
            Box::new(move |_, i| i == exit_at),
        )
    }

    #[test]
    fn refuses_short_history() {
        let frame = frame_from(&(0..20).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        let result = run_backtest(&frame, &TradeRules::score_driven(), &BacktestConfig::default());
        assert!(matches!(
            result,
            Err(SigtraderError::InsufficientData { bars: 20, minimum: 50, .. })
        ));
    }

    #[test]
    fn rejects_invalid_config() {
        let frame = frame_from(&(0..60).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        let rules = TradeRules::score_driven();

        let bad_capital = BacktestConfig {
            initial_capital: 0.0,
            ..Default::default()
        };
        assert!(run_backtest(&frame, &rules, &bad_capital).is_err());

        let bad_size = BacktestConfig {
            position_size: 1.5,
            ..Default::default()
        };
        assert!(run_backtest(&frame, &rules, &bad_size).is_err());

        let bad_commission = BacktestConfig {
            commission_pct: -0.1,
            ..Default::default()
        };
        assert!(run_backtest(&frame, &rules, &bad_commission).is_err());
    }

    #[test]
    fn single_round_trip_return_matches_commission_arithmetic() {
        // Flat at 100 through bar 10, ramp to 120 by bar 20, flat after.
        let closes: Vec<f64> = (0..60)
            .map(|i| {
                if i <= 10 {
                    100.0
                } else if i <= 20 {
                    100.0 + 2.0 * (i - 10) as f64
                } else {
                    120.0
                }
            })
            .collect();
        let frame = frame_from(&closes);
        let rules = bar_index_rules(10, 20);
        let result = run_backtest(&frame, &rules, &BacktestConfig::default()).unwrap();

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.entry_price, 100.0);
        assert_eq!(trade.exit_price, 120.0);
        assert!(trade.pnl > 0.0);

        // (120/100 - 1) - 2 * 0.002, up to whole-share rounding.
        let expected = 0.20 - 2.0 * 0.002;
        assert!(
            (result.metrics.total_return - expected).abs() < 0.01,
            "total return {} not near {}",
            result.metrics.total_return,
            expected
        );
        assert!((result.metrics.win_rate - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn entry_while_long_is_noop() {
        // Entry predicate fires on every bar; only one position may exist.
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let frame = frame_from(&closes);
        let rules = TradeRules::new(
            "always-enter",
            Box::new(|_, _| true),
            Box::new(|_, _| false),
        );
        let result = run_backtest(&frame, &rules, &BacktestConfig::default()).unwrap();

        // One entry at bar 0, liquidated at the final bar.
        assert_eq!(result.trades.len(), 1);
        assert_eq!(
            result.trades[0].entry_date,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn open_position_liquidated_at_final_bar() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let frame = frame_from(&closes);
        let rules = bar_index_rules(5, usize::MAX);
        let result = run_backtest(&frame, &rules, &BacktestConfig::default()).unwrap();

        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].exit_date, frame.bars[59].date);
        // Everything settled back to cash.
        assert!((result.final_equity - result.equity_curve[59].equity).abs() < f64::EPSILON);
    }

    #[test]
    fn no_signals_means_no_trades() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i % 3) as f64).collect();
        let frame = frame_from(&closes);
        let rules = TradeRules::new("never", Box::new(|_, _| false), Box::new(|_, _| false));
        let result = run_backtest(&frame, &rules, &BacktestConfig::default()).unwrap();

        assert!(result.trades.is_empty());
        assert!((result.final_equity - 100_000.0).abs() < f64::EPSILON);
        assert_eq!(result.equity_curve.len(), 60);
    }

    #[test]
    fn equity_curve_marks_position_to_market() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let frame = frame_from(&closes);
        let rules = bar_index_rules(10, 20);
        let result = run_backtest(&frame, &rules, &BacktestConfig::default()).unwrap();

        // While long, equity follows price upward.
        assert!(result.equity_curve[15].equity > result.equity_curve[10].equity);
        assert!(result.equity_curve[19].equity > result.equity_curve[15].equity);
    }

    #[test]
    fn commission_free_round_trip_is_exact() {
        let closes: Vec<f64> = (0..60)
            .map(|i| if i <= 10 { 100.0 } else { 110.0 })
            .collect();
        let frame = frame_from(&closes);
        let rules = bar_index_rules(10, 20);
        let config = BacktestConfig {
            commission_pct: 0.0,
            ..Default::default()
        };
        let result = run_backtest(&frame, &rules, &config).unwrap();

        // 1000 shares at 100, sold at 110: exactly +10%.
        assert!((result.metrics.total_return - 0.10).abs() < 1e-12);
    }

    #[test]
    fn score_strategy_trades_trend_reversal() {
        // A long rise produces Strong Buy bars, then a sharp sell-off drives
        // the score down and forces an exit.
        let mut closes: Vec<f64> = (0..80).map(|i| 100.0 + i as f64).collect();
        for i in 0..40 {
            closes.push(180.0 - 2.0 * i as f64);
        }
        let frame = frame_from(&closes);
        let result = run_backtest(
            &frame,
            &TradeRules::score_driven(),
            &BacktestConfig::default(),
        )
        .unwrap();

        assert!(
            !result.trades.is_empty(),
            "trend reversal should produce at least one round trip"
        );
    }

    #[test]
    fn single_position_invariant() {
        // With position sizing at 100% of cash, a second concurrent entry
        // would be visible as overlapping trades. Check exit/entry dates
        // never interleave.
        let mut closes: Vec<f64> = (0..80).map(|i| 100.0 + i as f64).collect();
        for i in 0..40 {
            closes.push(180.0 - 2.0 * i as f64);
        }
        let frame = frame_from(&closes);
        let rules = TradeRules::new(
            "churn",
            Box::new(|_, i| i % 7 == 0),
            Box::new(|_, i| i % 11 == 0),
        );
        let result = run_backtest(&frame, &rules, &BacktestConfig::default()).unwrap();

        for pair in result.trades.windows(2) {
            assert!(
                pair[1].entry_date > pair[0].exit_date,
                "trades must not overlap: {:?} then {:?}",
                pair[0],
                pair[1]
            );
        }
    }
}
