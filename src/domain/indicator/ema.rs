//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = x[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) outputs are `None`.

pub fn calculate_ema(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, &value) in values.iter().enumerate() {
        if i < period - 1 {
            sum += value;
            out.push(None);
        } else if i == period - 1 {
            sum += value;
            ema = sum / period as f64;
            out.push(Some(ema));
        } else {
            ema = value * k + ema * (1.0 - k);
            out.push(Some(ema));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_warmup() {
        let ema = calculate_ema(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);
        assert_eq!(ema[0], None);
        assert_eq!(ema[1], None);
        assert!(ema[2].is_some());
        assert!(ema[3].is_some());
        assert!(ema[4].is_some());
    }

    #[test]
    fn ema_seed_is_sma() {
        let ema = calculate_ema(&[10.0, 20.0, 30.0], 3);
        let expected_sma = (10.0 + 20.0 + 30.0) / 3.0;
        assert!((ema[2].unwrap() - expected_sma).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_recursive_calculation() {
        let ema = calculate_ema(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);

        let k = 2.0 / 4.0;
        let sma = (10.0 + 20.0 + 30.0) / 3.0;
        let ema_3 = 40.0 * k + sma * (1.0 - k);
        let ema_4 = 50.0 * k + ema_3 * (1.0 - k);

        assert!((ema[3].unwrap() - ema_3).abs() < f64::EPSILON);
        assert!((ema[4].unwrap() - ema_4).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_period_1_follows_input() {
        let ema = calculate_ema(&[10.0, 20.0, 30.0], 1);
        assert_eq!(ema, vec![Some(10.0), Some(20.0), Some(30.0)]);
    }

    #[test]
    fn ema_equal_prices() {
        let ema = calculate_ema(&[100.0, 100.0, 100.0, 100.0], 3);
        for value in ema.into_iter().flatten() {
            assert!((value - 100.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn ema_zero_period() {
        assert_eq!(calculate_ema(&[10.0, 20.0], 0), vec![None, None]);
    }

    #[test]
    fn ema_empty_input() {
        assert!(calculate_ema(&[], 3).is_empty());
    }
}
