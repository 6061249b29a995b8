//! Derived analytics over price history
//!
//! Pure functions: summary metrics, volatility, Bollinger bands and the
//! additive seasonal decomposition.

mod bollinger;
mod decomposition;
mod stats;

pub use bollinger::{BollingerBands, BOLLINGER_K, BOLLINGER_WINDOW};
pub use decomposition::{
    decompose, decompose_series, Decomposition, DecompositionError, MIN_DECOMPOSITION_ROWS,
    SEASONAL_PERIOD,
};
pub use stats::{
    max, mean, median, min, pct_change, percent_change, population_std, sample_std, volatility,
    DerivedMetrics,
};
