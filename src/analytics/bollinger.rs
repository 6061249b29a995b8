//! Bollinger bands
//!
//! Rolling mean of closes with bands at `k` sample standard deviations.

use super::stats::{mean, sample_std};
use serde::Serialize;

/// Rolling window length in bars
pub const BOLLINGER_WINDOW: usize = 20;

/// Band width in standard deviations
pub const BOLLINGER_K: f64 = 2.0;

/// Middle, upper and lower bands aligned with the input closes
///
/// Entries are `None` until a full window is available and wherever the
/// window holds a missing close.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BollingerBands {
    pub mid: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

impl BollingerBands {
    /// Bands with the standard 20-bar window and width of 2
    pub fn standard(closes: &[f64]) -> Self {
        Self::compute(closes, BOLLINGER_WINDOW, BOLLINGER_K)
    }

    /// Bands over `window` bars at `k` standard deviations
    ///
    /// Windows shorter than 2 have no sample deviation, so every entry is `None`.
    pub fn compute(closes: &[f64], window: usize, k: f64) -> Self {
        let n = closes.len();
        let mut bands = Self {
            mid: vec![None; n],
            upper: vec![None; n],
            lower: vec![None; n],
        };
        if window < 2 {
            return bands;
        }

        for end in (window - 1)..n {
            let slice = &closes[end + 1 - window..=end];
            if slice.iter().any(|v| !v.is_finite()) {
                continue;
            }
            let mid = mean(slice);
            let width = k * sample_std(slice);
            bands.mid[end] = Some(mid);
            bands.upper[end] = Some(mid + width);
            bands.lower[end] = Some(mid - width);
        }
        bands
    }

    pub fn len(&self) -> usize {
        self.mid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mid.is_empty()
    }

    /// Number of positions with a defined band
    pub fn defined(&self) -> usize {
        self.mid.iter().filter(|v| v.is_some()).count()
    }
}
