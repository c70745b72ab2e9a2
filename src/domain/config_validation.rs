//! Configuration validation and construction.
//!
//! Nonsensical parameters are surfaced as `ConfigInvalid`, never silently
//! clamped.

use crate::domain::backtest::{BacktestConfig, MIN_BACKTEST_BARS};
use crate::domain::error::SigtraderError;
use crate::domain::frame::AnalyzeConfig;
use crate::domain::risk::RiskParams;
use crate::domain::score::ScoreConfig;
use crate::ports::config_port::ConfigPort;

fn invalid(section: &str, key: &str, reason: &str) -> SigtraderError {
    SigtraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn positive_window(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, SigtraderError> {
    let value = config.get_int(section, key, default as i64);
    if value <= 0 {
        return Err(invalid(section, key, "window must be positive"));
    }
    Ok(value as usize)
}

pub fn build_analyze_config(config: &dyn ConfigPort) -> Result<AnalyzeConfig, SigtraderError> {
    let mut score = match config
        .get_string("scoring", "variant")
        .unwrap_or_else(|| "daily".to_string())
        .as_str()
    {
        "daily" => ScoreConfig::daily(),
        "intraday" => ScoreConfig::intraday(),
        "full" => ScoreConfig::full(),
        other => {
            return Err(invalid(
                "scoring",
                "variant",
                &format!("unknown variant '{other}', expected daily, intraday, or full"),
            ));
        }
    };

    score.short_window = positive_window(config, "scoring", "short_window", score.short_window)?;
    score.long_window = positive_window(config, "scoring", "long_window", score.long_window)?;
    if score.short_window >= score.long_window {
        return Err(invalid(
            "scoring",
            "short_window",
            "short_window must be below long_window",
        ));
    }

    score.rsi_period = positive_window(config, "scoring", "rsi_period", score.rsi_period)?;
    score.obv_window = positive_window(config, "scoring", "obv_window", score.obv_window)?;
    score.atr_period = positive_window(config, "scoring", "atr_period", score.atr_period)?;
    score.rs_lookback = positive_window(config, "scoring", "rs_lookback", score.rs_lookback)?;
    score.bollinger_window =
        positive_window(config, "scoring", "bollinger_window", score.bollinger_window)?;

    score.rsi_ceiling = config.get_double("scoring", "rsi_ceiling", score.rsi_ceiling);
    if !(0.0..=100.0).contains(&score.rsi_ceiling) {
        return Err(invalid(
            "scoring",
            "rsi_ceiling",
            "rsi_ceiling must be between 0 and 100",
        ));
    }

    score.bollinger_mult = config.get_double("scoring", "bollinger_mult", score.bollinger_mult);
    if score.bollinger_mult <= 0.0 {
        return Err(invalid(
            "scoring",
            "bollinger_mult",
            "bollinger_mult must be positive",
        ));
    }

    if config.get_bool(
        "scoring",
        "use_confirmation",
        score.confirm_windows.is_some(),
    ) {
        let (default_short, default_long) = score.confirm_windows.unwrap_or((20, 100));
        let short = positive_window(config, "scoring", "confirm_short", default_short)?;
        let long = positive_window(config, "scoring", "confirm_long", default_long)?;
        if short >= long {
            return Err(invalid(
                "scoring",
                "confirm_short",
                "confirm_short must be below confirm_long",
            ));
        }
        score.confirm_windows = Some((short, long));
    } else {
        score.confirm_windows = None;
    }

    score.use_relative_strength = config.get_bool(
        "scoring",
        "use_relative_strength",
        score.use_relative_strength,
    );
    score.use_bollinger = config.get_bool("scoring", "use_bollinger", score.use_bollinger);

    let risk = RiskParams {
        sl_mult: config.get_double("risk", "sl_mult", RiskParams::default().sl_mult),
        tp_mult: config.get_double("risk", "tp_mult", RiskParams::default().tp_mult),
    };
    if risk.sl_mult <= 0.0 {
        return Err(invalid("risk", "sl_mult", "sl_mult must be positive"));
    }
    if risk.tp_mult <= 0.0 {
        return Err(invalid("risk", "tp_mult", "tp_mult must be positive"));
    }

    Ok(AnalyzeConfig { score, risk })
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, SigtraderError> {
    let initial_capital = config.get_double("backtest", "initial_capital", 100_000.0);
    if initial_capital <= 0.0 {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }

    let commission_pct = config.get_double("backtest", "commission_pct", 0.2);
    if commission_pct < 0.0 {
        return Err(invalid(
            "backtest",
            "commission_pct",
            "commission_pct must be non-negative",
        ));
    }

    let position_size = config.get_double("backtest", "position_size", 1.0);
    if position_size <= 0.0 || position_size > 1.0 {
        return Err(invalid(
            "backtest",
            "position_size",
            "position_size must be between 0 and 1",
        ));
    }

    let risk_free_rate = config.get_double("backtest", "risk_free_rate", 0.05);
    if !(0.0..1.0).contains(&risk_free_rate) {
        return Err(invalid(
            "backtest",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }

    let min_bars = config.get_int("backtest", "min_bars", MIN_BACKTEST_BARS as i64);
    if min_bars < 2 {
        return Err(invalid("backtest", "min_bars", "min_bars must be at least 2"));
    }

    Ok(BacktestConfig {
        initial_capital,
        commission_pct,
        position_size,
        risk_free_rate,
        min_bars: min_bars as usize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn adapter(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn analyze_config_defaults() {
        let config = build_analyze_config(&adapter("")).unwrap();
        assert_eq!(config.score.short_window, 10);
        assert_eq!(config.score.long_window, 50);
        assert_eq!(config.score.rsi_ceiling, 60.0);
        assert_eq!(config.score.rule_count(), 4);
        assert_eq!(config.risk.sl_mult, 2.0);
        assert_eq!(config.risk.tp_mult, 4.0);
    }

    #[test]
    fn analyze_config_variant_selection() {
        let config = build_analyze_config(&adapter("[scoring]\nvariant = intraday\n")).unwrap();
        assert_eq!(config.score.rsi_ceiling, 50.0);

        let config = build_analyze_config(&adapter("[scoring]\nvariant = full\n")).unwrap();
        assert_eq!(config.score.rule_count(), 7);

        let result = build_analyze_config(&adapter("[scoring]\nvariant = hourly\n"));
        assert!(matches!(result, Err(SigtraderError::ConfigInvalid { .. })));
    }

    #[test]
    fn analyze_config_rejects_inverted_windows() {
        let result = build_analyze_config(&adapter(
            "[scoring]\nshort_window = 50\nlong_window = 10\n",
        ));
        assert!(result.is_err());
    }

    #[test]
    fn analyze_config_rejects_bad_rsi_ceiling() {
        let result = build_analyze_config(&adapter("[scoring]\nrsi_ceiling = 150\n"));
        assert!(result.is_err());
    }

    #[test]
    fn analyze_config_confirmation_toggle() {
        let config = build_analyze_config(&adapter(
            "[scoring]\nuse_confirmation = true\nconfirm_short = 15\nconfirm_long = 60\n",
        ))
        .unwrap();
        assert_eq!(config.score.confirm_windows, Some((15, 60)));
        assert_eq!(config.score.rule_count(), 5);
    }

    #[test]
    fn analyze_config_rejects_bad_risk_multipliers() {
        assert!(build_analyze_config(&adapter("[risk]\nsl_mult = 0\n")).is_err());
        assert!(build_analyze_config(&adapter("[risk]\ntp_mult = -1\n")).is_err());
    }

    #[test]
    fn backtest_config_defaults() {
        let config = build_backtest_config(&adapter("")).unwrap();
        assert_eq!(config.initial_capital, 100_000.0);
        assert_eq!(config.commission_pct, 0.2);
        assert_eq!(config.position_size, 1.0);
        assert_eq!(config.min_bars, MIN_BACKTEST_BARS);
    }

    #[test]
    fn backtest_config_reads_values() {
        let config = build_backtest_config(&adapter(
            "[backtest]\ninitial_capital = 50000\ncommission_pct = 0.1\nposition_size = 0.5\n",
        ))
        .unwrap();
        assert_eq!(config.initial_capital, 50_000.0);
        assert_eq!(config.commission_pct, 0.1);
        assert_eq!(config.position_size, 0.5);
    }

    #[test]
    fn backtest_config_rejects_bad_values() {
        assert!(build_backtest_config(&adapter("[backtest]\ninitial_capital = 0\n")).is_err());
        assert!(build_backtest_config(&adapter("[backtest]\ncommission_pct = -0.5\n")).is_err());
        assert!(build_backtest_config(&adapter("[backtest]\nposition_size = 2\n")).is_err());
        assert!(build_backtest_config(&adapter("[backtest]\nrisk_free_rate = 1.5\n")).is_err());
        assert!(build_backtest_config(&adapter("[backtest]\nmin_bars = 1\n")).is_err());
    }
}
