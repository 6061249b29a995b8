//! Descriptive statistics over a price series
//!
//! Missing values (`NaN`) are skipped by every aggregate. An aggregate over no
//! values is `NaN`.

use crate::market::PriceSeries;
use serde::Serialize;

/// Summary statistics of one price series snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub mean_close: f64,
    pub median_close: f64,
    pub max_close: f64,
    pub min_close: f64,
    /// Change from first to last close in percent; `None` when the first close
    /// is zero or either endpoint is missing
    pub percent_change: Option<f64>,
    /// Mean period-over-period close change in percent
    pub mean_daily_change_pct: f64,
    pub mean_volume: f64,
    pub max_volume: f64,
    pub min_volume: f64,
}

impl DerivedMetrics {
    /// Compute the metrics for `series`
    pub fn from_series(series: &PriceSeries) -> Self {
        let closes = series.closes();
        let volumes = series.volumes();
        let changes: Vec<f64> = pct_change(&closes).into_iter().flatten().collect();

        Self {
            mean_close: mean(&closes),
            median_close: median(&closes),
            max_close: max(&closes),
            min_close: min(&closes),
            percent_change: percent_change(&closes),
            mean_daily_change_pct: mean(&changes) * 100.0,
            mean_volume: mean(&volumes),
            max_volume: max(&volumes),
            min_volume: min(&volumes),
        }
    }
}

/// Period-over-period relative change
///
/// Entry 0 is always `None`; so is any entry whose neighbour pair contains a
/// missing value or a zero denominator.
pub fn pct_change(values: &[f64]) -> Vec<Option<f64>> {
    let mut changes = Vec::with_capacity(values.len());
    if values.is_empty() {
        return changes;
    }
    changes.push(None);
    changes.extend(values.windows(2).map(|pair| {
        let (prev, curr) = (pair[0], pair[1]);
        (prev.is_finite() && curr.is_finite() && prev != 0.0).then(|| (curr - prev) / prev)
    }));
    changes
}

/// Start-to-end change in percent
pub fn percent_change(values: &[f64]) -> Option<f64> {
    let first = *values.first()?;
    let last = *values.last()?;
    if !first.is_finite() || !last.is_finite() || first == 0.0 {
        return None;
    }
    Some((last - first) / first * 100.0)
}

/// Volatility as population std of period returns times sqrt(row count)
///
/// The multiplier is the number of bars in the series, not a trading-day
/// constant.
pub fn volatility(series: &PriceSeries) -> f64 {
    let changes: Vec<f64> = pct_change(&series.closes()).into_iter().flatten().collect();
    population_std(&changes) * (series.len() as f64).sqrt()
}

fn finite(values: &[f64]) -> impl Iterator<Item = f64> + '_ {
    values.iter().copied().filter(|v| v.is_finite())
}

/// Mean of the finite values
pub fn mean(values: &[f64]) -> f64 {
    let (sum, count) = finite(values).fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Median of the finite values
pub fn median(values: &[f64]) -> f64 {
    let mut sorted: Vec<f64> = finite(values).collect();
    if sorted.is_empty() {
        return f64::NAN;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Largest finite value
pub fn max(values: &[f64]) -> f64 {
    finite(values).reduce(f64::max).unwrap_or(f64::NAN)
}

/// Smallest finite value
pub fn min(values: &[f64]) -> f64 {
    finite(values).reduce(f64::min).unwrap_or(f64::NAN)
}

/// Population standard deviation (ddof = 0) of the finite values
pub fn population_std(values: &[f64]) -> f64 {
    std_dev(values, 0)
}

/// Sample standard deviation (ddof = 1) of the finite values
pub fn sample_std(values: &[f64]) -> f64 {
    std_dev(values, 1)
}

fn std_dev(values: &[f64], ddof: usize) -> f64 {
    let m = mean(values);
    let count = finite(values).count();
    if count <= ddof {
        return f64::NAN;
    }
    let sum_sq: f64 = finite(values).map(|v| (v - m).powi(2)).sum();
    (sum_sq / (count - ddof) as f64).sqrt()
}
