//! Signal scoring engine.
//!
//! Each enabled rule contributes +1 when its inputs are defined and the
//! condition holds; a rule whose inputs are still in warm-up contributes 0.
//! A bar where every enabled rule is missing its inputs has no score at all
//! (insufficient data), which is distinct from a legitimate score of zero.
//!
//! The recommendation mapping is ratio-based so the cut points stay consistent
//! no matter which rule subset is active: score/K >= 0.70 is a Strong Buy,
//! >= 0.45 a Buy, anything below a Neutral/Sell.

use crate::domain::frame::IndicatorFrame;
use crate::domain::indicator::atr::DEFAULT_PERIOD as DEFAULT_ATR_PERIOD;
use crate::domain::indicator::bollinger::{DEFAULT_MULT, DEFAULT_WINDOW as DEFAULT_BOLL_WINDOW};

pub const STRONG_BUY_RATIO: f64 = 0.70;
pub const BUY_RATIO: f64 = 0.45;

/// RSI levels for the mean-reversion entry/exit signal.
pub const MEAN_REVERSION_ENTRY_RSI: f64 = 35.0;
pub const MEAN_REVERSION_EXIT_RSI: f64 = 55.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    StrongBuy,
    Buy,
    NeutralSell,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recommendation::StrongBuy => write!(f, "Strong Buy"),
            Recommendation::Buy => write!(f, "Buy"),
            Recommendation::NeutralSell => write!(f, "Neutral/Sell"),
        }
    }
}

/// Mean-reversion side, the two-state counterpart of [`Recommendation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

/// Which rules the score counts and the indicator windows behind them.
///
/// Rules 1-4 (MA crossover, MACD histogram, RSI ceiling, OBV trend) are always
/// active; the confirmation pair, relative strength, and Bollinger rules are
/// opt-in, so K ranges from 4 to 7.
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    pub short_window: usize,
    pub long_window: usize,
    pub rsi_period: usize,
    pub rsi_ceiling: f64,
    pub obv_window: usize,
    /// Slower MA pair confirming the primary crossover (rule 5).
    pub confirm_windows: Option<(usize, usize)>,
    /// Benchmark-relative 20-bar return must be positive (rule 6).
    pub use_relative_strength: bool,
    /// Close above the Bollinger middle band (rule 7).
    pub use_bollinger: bool,
    pub bollinger_window: usize,
    pub bollinger_mult: f64,
    pub atr_period: usize,
    pub rs_lookback: usize,
}

impl ScoreConfig {
    /// Daily/swing variant: base four rules, RSI ceiling 60.
    pub fn daily() -> Self {
        ScoreConfig {
            short_window: 10,
            long_window: 50,
            rsi_period: 14,
            rsi_ceiling: 60.0,
            obv_window: 10,
            confirm_windows: None,
            use_relative_strength: false,
            use_bollinger: false,
            bollinger_window: DEFAULT_BOLL_WINDOW,
            bollinger_mult: DEFAULT_MULT,
            atr_period: DEFAULT_ATR_PERIOD,
            rs_lookback: crate::domain::relative_strength::DEFAULT_LOOKBACK,
        }
    }

    /// Stricter intraday variant: same rules, RSI ceiling 50.
    pub fn intraday() -> Self {
        ScoreConfig {
            rsi_ceiling: 50.0,
            ..Self::daily()
        }
    }

    /// All seven rules active.
    pub fn full() -> Self {
        ScoreConfig {
            confirm_windows: Some((20, 100)),
            use_relative_strength: true,
            use_bollinger: true,
            ..Self::daily()
        }
    }

    /// Number of active rules (K).
    pub fn rule_count(&self) -> u32 {
        let mut k = 4;
        if self.confirm_windows.is_some() {
            k += 1;
        }
        if self.use_relative_strength {
            k += 1;
        }
        if self.use_bollinger {
            k += 1;
        }
        k
    }

    /// Longest warm-up any enabled indicator needs before the frame has a
    /// fully-defined bar.
    pub fn min_bars(&self) -> usize {
        let mut minimum = self
            .long_window
            .max(self.rsi_period + 1)
            .max(self.obv_window)
            .max(self.atr_period);
        if let Some((_, confirm_long)) = self.confirm_windows {
            minimum = minimum.max(confirm_long);
        }
        if self.use_bollinger {
            minimum = minimum.max(self.bollinger_window);
        }
        minimum
    }
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self::daily()
    }
}

/// Evaluate the rule set for bar `i`. `None` means no enabled rule had
/// defined inputs (insufficient warm-up).
pub fn score_bar(frame: &IndicatorFrame, i: usize, config: &ScoreConfig) -> Option<u32> {
    let mut score = 0u32;
    let mut any_defined = false;

    // Rule 1: trend up, short MA above long MA.
    if let (Some(short), Some(long)) = (frame.sma_short[i], frame.sma_long[i]) {
        any_defined = true;
        if short > long {
            score += 1;
        }
    }

    // Rule 2: momentum up, MACD histogram positive.
    if let Some(histogram) = frame.macd_histogram[i] {
        any_defined = true;
        if histogram > 0.0 {
            score += 1;
        }
    }

    // Rule 3: not overbought.
    if let Some(rsi) = frame.rsi[i] {
        any_defined = true;
        if rsi < config.rsi_ceiling {
            score += 1;
        }
    }

    // Rule 4: volume confirms, OBV above its own moving average.
    if let Some(obv_sma) = frame.obv_sma[i] {
        any_defined = true;
        if frame.obv[i] > obv_sma {
            score += 1;
        }
    }

    // Rule 5: slower confirmation pair agrees with the trend.
    if config.confirm_windows.is_some() {
        if let (Some(short), Some(long)) = (frame.sma_confirm_short[i], frame.sma_confirm_long[i])
        {
            any_defined = true;
            if short > long {
                score += 1;
            }
        }
    }

    // Rule 6: outperforming the benchmark index.
    if config.use_relative_strength {
        if let Some(rs) = frame.relative_strength[i] {
            any_defined = true;
            if rs > 0.0 {
                score += 1;
            }
        }
    }

    // Rule 7: close above the Bollinger middle band.
    if config.use_bollinger {
        if let Some(middle) = frame.boll_middle[i] {
            any_defined = true;
            if frame.bars[i].close > middle {
                score += 1;
            }
        }
    }

    any_defined.then_some(score)
}

pub fn recommendation(score: u32, rule_count: u32) -> Recommendation {
    let ratio = score as f64 / rule_count as f64;
    if ratio >= STRONG_BUY_RATIO {
        Recommendation::StrongBuy
    } else if ratio >= BUY_RATIO {
        Recommendation::Buy
    } else {
        Recommendation::NeutralSell
    }
}

/// Mean-reversion signal for bar `i`: Buy at the lower band while RSI is
/// depressed, Sell once price has reverted to the middle band and RSI has
/// recovered. `None` when neither condition holds or inputs are in warm-up.
pub fn mean_reversion_signal(frame: &IndicatorFrame, i: usize) -> Option<Side> {
    let close = frame.bars[i].close;
    let rsi = frame.rsi[i]?;

    if let Some(lower) = frame.boll_lower[i] {
        if close <= lower && rsi < MEAN_REVERSION_ENTRY_RSI {
            return Some(Side::Buy);
        }
    }
    if let Some(middle) = frame.boll_middle[i] {
        if close >= middle && rsi > MEAN_REVERSION_EXIT_RSI {
            return Some(Side::Sell);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_count_scales_with_toggles() {
        assert_eq!(ScoreConfig::daily().rule_count(), 4);
        assert_eq!(ScoreConfig::intraday().rule_count(), 4);
        assert_eq!(ScoreConfig::full().rule_count(), 7);

        let mut config = ScoreConfig::daily();
        config.use_bollinger = true;
        assert_eq!(config.rule_count(), 5);
    }

    #[test]
    fn recommendation_mapping_k4() {
        // Matches the original 4-rule thresholds: 3+ strong, 2 buy.
        assert_eq!(recommendation(4, 4), Recommendation::StrongBuy);
        assert_eq!(recommendation(3, 4), Recommendation::StrongBuy);
        assert_eq!(recommendation(2, 4), Recommendation::Buy);
        assert_eq!(recommendation(1, 4), Recommendation::NeutralSell);
        assert_eq!(recommendation(0, 4), Recommendation::NeutralSell);
    }

    #[test]
    fn recommendation_mapping_k7() {
        assert_eq!(recommendation(5, 7), Recommendation::StrongBuy);
        assert_eq!(recommendation(4, 7), Recommendation::Buy);
        assert_eq!(recommendation(3, 7), Recommendation::NeutralSell);
    }

    #[test]
    fn recommendation_mapping_is_monotonic() {
        for k in 4..=7u32 {
            let mut prev = Recommendation::NeutralSell;
            for score in 0..=k {
                let rec = recommendation(score, k);
                let rank = |r: Recommendation| match r {
                    Recommendation::NeutralSell => 0,
                    Recommendation::Buy => 1,
                    Recommendation::StrongBuy => 2,
                };
                assert!(rank(rec) >= rank(prev), "K={} score={}", k, score);
                prev = rec;
            }
        }
    }

    #[test]
    fn recommendation_display() {
        assert_eq!(Recommendation::StrongBuy.to_string(), "Strong Buy");
        assert_eq!(Recommendation::NeutralSell.to_string(), "Neutral/Sell");
    }

    #[test]
    fn min_bars_tracks_longest_window() {
        assert_eq!(ScoreConfig::daily().min_bars(), 50);
        assert_eq!(ScoreConfig::full().min_bars(), 100);
    }

    #[test]
    fn intraday_tightens_rsi_ceiling() {
        assert_eq!(ScoreConfig::daily().rsi_ceiling, 60.0);
        assert_eq!(ScoreConfig::intraday().rsi_ceiling, 50.0);
    }
}
