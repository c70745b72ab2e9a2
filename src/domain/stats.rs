//! Regression and unit-root statistics backing the pairs analyzer.
//!
//! Small dense problems only: the cointegrating regression has two
//! coefficients and the ADF regression at most a dozen, so ordinary normal
//! equations with Gauss-Jordan elimination are plenty.

use std::f64::consts::PI;

/// Standard normal CDF, accurate to about 7.5e-8 (Abramowitz & Stegun 26.2.17).
pub fn normal_cdf(z: f64) -> f64 {
    let zz = z.abs();
    let pdf = (-0.5 * zz * zz).exp() / (2.0 * PI).sqrt();
    let t = 1.0 / (1.0 + zz * 0.2316419);
    let poly = ((((1.330274429 * t - 1.821255978) * t + 1.781477937) * t - 0.356563782) * t
        + 0.319381530)
        * t;
    if z > 0.0 { 1.0 - pdf * poly } else { pdf * poly }
}

/// Ordinary least squares fit.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub residuals: Vec<f64>,
    pub ssr: f64,
    pub nobs: usize,
}

/// Fit y against the given predictor columns via normal equations.
/// Returns `None` when the system is singular or under-determined.
pub fn ols(y: &[f64], columns: &[&[f64]]) -> Option<OlsFit> {
    let n = y.len();
    let p = columns.len();
    if p == 0 || n <= p || columns.iter().any(|c| c.len() != n) {
        return None;
    }

    // X'X and X'y
    let mut xtx = vec![vec![0.0f64; p]; p];
    let mut xty = vec![0.0f64; p];
    for i in 0..p {
        for j in i..p {
            let mut sum = 0.0;
            for t in 0..n {
                sum += columns[i][t] * columns[j][t];
            }
            xtx[i][j] = sum;
            xtx[j][i] = sum;
        }
        let mut sum = 0.0;
        for t in 0..n {
            sum += columns[i][t] * y[t];
        }
        xty[i] = sum;
    }

    let inverse = invert(&xtx)?;

    let mut coefficients = vec![0.0f64; p];
    for i in 0..p {
        for j in 0..p {
            coefficients[i] += inverse[i][j] * xty[j];
        }
    }

    let mut residuals = Vec::with_capacity(n);
    let mut ssr = 0.0;
    for t in 0..n {
        let mut fitted = 0.0;
        for i in 0..p {
            fitted += coefficients[i] * columns[i][t];
        }
        let r = y[t] - fitted;
        ssr += r * r;
        residuals.push(r);
    }

    let sigma2 = ssr / (n - p) as f64;
    let std_errors = (0..p).map(|i| (sigma2 * inverse[i][i]).sqrt()).collect();

    Some(OlsFit {
        coefficients,
        std_errors,
        residuals,
        ssr,
        nobs: n,
    })
}

/// Gauss-Jordan inverse with partial pivoting.
fn invert(matrix: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let p = matrix.len();
    let mut work: Vec<Vec<f64>> = matrix
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut extended = row.clone();
            extended.extend((0..p).map(|j| if i == j { 1.0 } else { 0.0 }));
            extended
        })
        .collect();

    for col in 0..p {
        let pivot_row = (col..p)
            .max_by(|&a, &b| {
                work[a][col]
                    .abs()
                    .partial_cmp(&work[b][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if work[pivot_row][col].abs() < 1e-12 {
            return None;
        }
        work.swap(col, pivot_row);

        let pivot = work[col][col];
        for value in work[col].iter_mut() {
            *value /= pivot;
        }
        for row in 0..p {
            if row == col {
                continue;
            }
            let factor = work[row][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..2 * p {
                work[row][j] -= factor * work[col][j];
            }
        }
    }

    Some(work.into_iter().map(|row| row[p..].to_vec()).collect())
}

#[derive(Debug, Clone, Copy)]
pub struct AdfResult {
    pub statistic: f64,
    pub lag: usize,
}

/// Augmented Dickey-Fuller t-statistic without a constant term (the series is
/// expected to be mean-zero, as regression residuals are). Lag order is
/// chosen by AIC over 0..=max_lag on a common sample, then the final
/// regression is refit on all usable observations.
pub fn adf_no_constant(series: &[f64], max_lag: usize) -> Option<AdfResult> {
    let m = series.len();
    if m < max_lag + 10 {
        return None;
    }

    let diffs: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    let mut best: Option<(f64, usize)> = None;
    for lag in 0..=max_lag {
        // Common sample across candidate lags so AIC values are comparable.
        // A lag whose design matrix is singular is simply not a candidate.
        let Some(fit) = adf_regression(series, &diffs, lag, max_lag) else {
            continue;
        };
        let n = fit.nobs as f64;
        let params = (lag + 1) as f64;
        let aic = if fit.ssr > 0.0 {
            n * (fit.ssr / n).ln() + 2.0 * params
        } else {
            f64::NEG_INFINITY
        };
        match best {
            Some((best_aic, _)) if aic >= best_aic => {}
            _ => best = Some((aic, lag)),
        }
    }

    let (_, lag) = best?;
    let fit = adf_regression(series, &diffs, lag, lag)?;
    let statistic = fit.coefficients[0] / fit.std_errors[0];
    Some(AdfResult { statistic, lag })
}

/// Regression Δe[t] = ρ·e[t-1] + Σ φ_i·Δe[t-i], rows starting after
/// `start_lag` so different lag orders can share a sample.
fn adf_regression(series: &[f64], diffs: &[f64], lag: usize, start_lag: usize) -> Option<OlsFit> {
    let rows: Vec<usize> = (start_lag..diffs.len()).collect();
    if rows.len() <= lag + 1 {
        return None;
    }

    let y: Vec<f64> = rows.iter().map(|&j| diffs[j]).collect();
    let mut columns: Vec<Vec<f64>> = Vec::with_capacity(lag + 1);
    columns.push(rows.iter().map(|&j| series[j]).collect());
    for i in 1..=lag {
        columns.push(rows.iter().map(|&j| diffs[j - i]).collect());
    }

    let column_refs: Vec<&[f64]> = columns.iter().map(|c| c.as_slice()).collect();
    ols(&y, &column_refs)
}

// MacKinnon (1994) approximate asymptotic p-values for the Engle-Granger
// statistic with two series and a constant in the cointegrating regression.
const TAU_MIN: f64 = -18.86;
const TAU_MAX: f64 = 0.92;
const TAU_STAR: f64 = -2.62;
const TAU_SMALL_P: [f64; 3] = [2.92, 1.5012, 0.039796];
const TAU_LARGE_P: [f64; 4] = [2.1945, 0.93661, -0.04021, -0.002304];

pub fn mackinnon_p_value(tau: f64) -> f64 {
    if tau <= TAU_MIN {
        return 0.0;
    }
    if tau >= TAU_MAX {
        return 1.0;
    }
    let poly = if tau <= TAU_STAR {
        TAU_SMALL_P[0] + TAU_SMALL_P[1] * tau + TAU_SMALL_P[2] * tau * tau
    } else {
        TAU_LARGE_P[0] + TAU_LARGE_P[1] * tau + TAU_LARGE_P[2] * tau * tau
            + TAU_LARGE_P[3] * tau * tau * tau
    };
    normal_cdf(poly)
}

/// Engle-Granger two-step cointegration test: regress y on x (with constant),
/// then ADF-test the residuals. Returns the approximate p-value of the null
/// "not cointegrated", or `None` when the series are too short or degenerate.
pub fn engle_granger_p_value(y: &[f64], x: &[f64]) -> Option<f64> {
    let n = y.len();
    if n != x.len() || n < 20 {
        return None;
    }

    let ones = vec![1.0f64; n];
    let fit = ols(y, &[ones.as_slice(), x])?;

    let max_lag = (12.0 * (n as f64 / 100.0).powf(0.25)).floor() as usize;
    let adf = adf_no_constant(&fit.residuals, max_lag)?;
    Some(mackinnon_p_value(adf.statistic))
}
