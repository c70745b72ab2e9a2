//! RSI (Relative Strength Index).
//!
//! Trailing simple averages of gains and losses over the last `period` close
//! deltas, scaled via RSI = 100 - 100/(1 + avg_gain/avg_loss).
//!
//! Warmup: first `period` outputs are `None` (a window needs `period` deltas).
//! Windows whose average loss is exactly zero have no defined RS and yield
//! `None` rather than a pinned 100.

pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = closes.len();
    if period == 0 || n < period + 1 {
        return vec![None; n];
    }

    let mut gains = vec![0.0; n];
    let mut losses = vec![0.0; n];
    for i in 1..n {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            gains[i] = change;
        } else {
            losses[i] = -change;
        }
    }

    let mut out = vec![None; n];
    let mut gain_sum: f64 = gains[1..=period].iter().sum();
    let mut loss_sum: f64 = losses[1..=period].iter().sum();

    for i in period..n {
        if i > period {
            gain_sum += gains[i] - gains[i - period];
            loss_sum += losses[i] - losses[i - period];
        }

        let avg_gain = gain_sum / period as f64;
        let avg_loss = loss_sum / period as f64;

        if avg_loss > 0.0 {
            let rs = avg_gain / avg_loss;
            out[i] = Some(100.0 - 100.0 / (1.0 + rs));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rsi_warmup_period() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + (i % 5) as f64).collect();
        let rsi = calculate_rsi(&closes, 14);

        assert_eq!(rsi.len(), 20);
        for (i, value) in rsi.iter().take(14).enumerate() {
            assert!(value.is_none(), "index {} should be warmup", i);
        }
        assert!(rsi[14].is_some());
    }

    #[test]
    fn rsi_all_gains_is_missing() {
        // No losing bars in the window → average loss is zero → RS undefined.
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let rsi = calculate_rsi(&closes, 14);
        assert!(rsi.iter().all(|v| v.is_none()));
    }

    #[test]
    fn rsi_all_losses_is_zero() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let rsi = calculate_rsi(&closes, 14);
        assert!((rsi[14].unwrap() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_balanced_moves() {
        // Alternating +2/-2 closes: avg gain == avg loss → RSI 50.
        let mut closes = vec![100.0];
        for i in 0..19 {
            let last = *closes.last().unwrap();
            closes.push(if i % 2 == 0 { last + 2.0 } else { last - 2.0 });
        }
        let rsi = calculate_rsi(&closes, 14);
        assert!((rsi[14].unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn rsi_short_series() {
        let rsi = calculate_rsi(&[100.0, 101.0, 102.0], 14);
        assert_eq!(rsi, vec![None, None, None]);
    }

    #[test]
    fn rsi_zero_period() {
        let rsi = calculate_rsi(&[100.0, 101.0], 0);
        assert_eq!(rsi, vec![None, None]);
    }

    proptest! {
        #[test]
        fn rsi_bounded_where_defined(
            closes in proptest::collection::vec(1.0f64..1000.0, 15..80)
        ) {
            let rsi = calculate_rsi(&closes, 14);
            prop_assert_eq!(rsi.len(), closes.len());
            for value in rsi.into_iter().flatten() {
                prop_assert!((0.0..=100.0).contains(&value), "RSI {} out of range", value);
            }
        }
    }
}
