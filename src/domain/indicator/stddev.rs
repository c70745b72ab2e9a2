//! Rolling standard deviation.
//!
//! Sample standard deviation (ddof = 1) over a trailing window, shared by the
//! Bollinger Bands and the pair-spread Z-score.
//! Warmup: first (window-1) outputs are `None`; a window of 1 has no sample
//! deviation and yields all `None`.

pub fn rolling_stddev(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let n = values.len();
    if window < 2 {
        return vec![None; n];
    }

    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        if i + 1 < window {
            out.push(None);
            continue;
        }

        let slice = &values[i + 1 - window..=i];
        let mean: f64 = slice.iter().sum::<f64>() / window as f64;
        let sum_sq: f64 = slice.iter().map(|v| (v - mean) * (v - mean)).sum();
        out.push(Some((sum_sq / (window - 1) as f64).sqrt()));
    }

    out
}
