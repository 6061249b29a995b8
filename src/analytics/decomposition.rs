//! Classical additive seasonal decomposition
//!
//! `observed = trend + seasonal + residual`, with the trend from a centered
//! moving average over one seasonal period. For an even period the average is
//! the 2×p filter, so the first and last `p / 2` trend points are undefined.

use crate::market::PriceSeries;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Seasonal period in bars used by the dashboard
pub const SEASONAL_PERIOD: usize = 30;

/// Minimum usable closes for a decomposition
pub const MIN_DECOMPOSITION_ROWS: usize = 2 * SEASONAL_PERIOD;

/// Decomposition errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecompositionError {
    #[error("need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[error("seasonal period must be at least 2, got {0}")]
    InvalidPeriod(usize),
    #[error("series contains non-finite values")]
    NonFinite,
}

/// Decomposed series, all components aligned with `timestamps`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decomposition {
    pub period: usize,
    pub timestamps: Vec<DateTime<Utc>>,
    pub observed: Vec<f64>,
    pub trend: Vec<Option<f64>>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<Option<f64>>,
}

impl Decomposition {
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }
}

/// Decompose the closes of `series`
///
/// Bars with a missing close are dropped before decomposing.
pub fn decompose_series(
    series: &PriceSeries,
    period: usize,
) -> Result<Decomposition, DecompositionError> {
    let (timestamps, observed): (Vec<_>, Vec<_>) = series
        .bars()
        .iter()
        .filter(|bar| bar.close.is_finite())
        .map(|bar| (bar.timestamp, bar.close))
        .unzip();

    let mut decomposition = decompose(&observed, period)?;
    decomposition.timestamps = timestamps;
    Ok(decomposition)
}

/// Decompose a finite-valued series
///
/// The returned value has empty `timestamps`; [`decompose_series`] fills them.
pub fn decompose(values: &[f64], period: usize) -> Result<Decomposition, DecompositionError> {
    if period < 2 {
        return Err(DecompositionError::InvalidPeriod(period));
    }
    let n = values.len();
    if n < 2 * period {
        return Err(DecompositionError::InsufficientData {
            required: 2 * period,
            actual: n,
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(DecompositionError::NonFinite);
    }

    let trend = centered_moving_average(values, period);

    // Mean detrended value per phase of the cycle, then centered on zero
    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];
    for (i, (x, t)) in values.iter().zip(&trend).enumerate() {
        if let Some(t) = t {
            sums[i % period] += x - t;
            counts[i % period] += 1;
        }
    }
    let mut profile: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(s, &c)| if c == 0 { 0.0 } else { s / c as f64 })
        .collect();
    let offset = profile.iter().sum::<f64>() / period as f64;
    profile.iter_mut().for_each(|v| *v -= offset);

    let seasonal: Vec<f64> = (0..n).map(|i| profile[i % period]).collect();
    let residual = values
        .iter()
        .zip(&trend)
        .zip(&seasonal)
        .map(|((x, t), s)| t.map(|t| x - t - s))
        .collect();

    Ok(Decomposition {
        period,
        timestamps: Vec::new(),
        observed: values.to_vec(),
        trend,
        seasonal,
        residual,
    })
}

/// Centered moving average of one full period
///
/// Even periods use weights `[0.5, 1, …, 1, 0.5] / p` over `p + 1` points.
fn centered_moving_average(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let half = period / 2;
    let weights: Vec<f64> = if period % 2 == 0 {
        let mut w = vec![1.0 / period as f64; period + 1];
        w[0] = 0.5 / period as f64;
        w[period] = 0.5 / period as f64;
        w
    } else {
        vec![1.0 / period as f64; period]
    };

    (0..n)
        .map(|i| {
            if i < half || i + half >= n {
                return None;
            }
            let start = i - half;
            Some(
                weights
                    .iter()
                    .zip(&values[start..start + weights.len()])
                    .map(|(w, x)| w * x)
                    .sum::<f64>(),
            )
        })
        .collect()
}
