//! Stop-loss/take-profit levels and position sizing.
//!
//! Levels are ATR multiples around the close:
//! stop_loss = close - atr * sl_mult, take_profit = close + atr * tp_mult.
//! With the default multipliers and a positive ATR this guarantees
//! stop_loss < close < take_profit.

use crate::domain::error::SigtraderError;

pub const DEFAULT_SL_MULT: f64 = 2.0;
pub const DEFAULT_TP_MULT: f64 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RiskParams {
    pub sl_mult: f64,
    pub tp_mult: f64,
}

impl Default for RiskParams {
    fn default() -> Self {
        RiskParams {
            sl_mult: DEFAULT_SL_MULT,
            tp_mult: DEFAULT_TP_MULT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskLevels {
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// `None` when ATR is missing or non-positive; risk levels derived from a
/// degenerate volatility reading would be meaningless.
pub fn risk_levels(close: f64, atr: Option<f64>, params: &RiskParams) -> Option<RiskLevels> {
    let atr = atr.filter(|a| *a > 0.0)?;
    Some(RiskLevels {
        stop_loss: close - atr * params.sl_mult,
        take_profit: close + atr * params.tp_mult,
    })
}

/// Whole-share position size risking `capital * risk_pct` down to the stop.
pub fn position_size(
    capital: f64,
    risk_pct: f64,
    close: f64,
    stop_loss: f64,
) -> Result<u64, SigtraderError> {
    if capital <= 0.0 {
        return Err(SigtraderError::InvalidRiskConfig {
            reason: "capital must be positive".into(),
        });
    }
    if !(0.0..=1.0).contains(&risk_pct) || risk_pct == 0.0 {
        return Err(SigtraderError::InvalidRiskConfig {
            reason: "risk_pct must be in (0, 1]".into(),
        });
    }
    if close <= stop_loss {
        return Err(SigtraderError::InvalidRiskConfig {
            reason: format!("stop loss {stop_loss} is not below entry price {close}"),
        });
    }

    let risk_per_share = close - stop_loss;
    Ok(((capital * risk_pct) / risk_per_share).floor() as u64)
}
