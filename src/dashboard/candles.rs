//! Text candlestick chart
//!
//! Bars are bucketed into at most `width` columns. Each column shows a wick
//! from low to high and a body from open to close, solid for an up candle and
//! hollow for a down candle.

use crate::market::Bar;
use std::fmt::Write;

const WICK: char = '│';
const UP_BODY: char = '█';
const DOWN_BODY: char = '░';

/// Width reserved for the price axis labels
const AXIS_WIDTH: usize = 11;

/// One aggregated column
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candle {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

impl Candle {
    fn is_up(&self) -> bool {
        self.close >= self.open
    }
}

/// Merge consecutive complete bars into at most `columns` candles
fn bucket(bars: &[Bar], columns: usize) -> Vec<Candle> {
    let complete: Vec<&Bar> = bars
        .iter()
        .filter(|b| [b.open, b.high, b.low, b.close].iter().all(|v| v.is_finite()))
        .collect();
    if complete.is_empty() || columns == 0 {
        return Vec::new();
    }

    let per_column = complete.len().div_ceil(columns);
    complete
        .chunks(per_column)
        .map(|chunk| Candle {
            open: chunk[0].open,
            close: chunk[chunk.len() - 1].close,
            high: chunk.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max),
            low: chunk.iter().map(|b| b.low).fold(f64::INFINITY, f64::min),
        })
        .collect()
}

/// Draw `bars` as a `width` × `height` candlestick chart
///
/// Returns an empty string when no bar has all four prices.
pub fn render_candles(bars: &[Bar], width: usize, height: usize) -> String {
    let height = height.max(2);
    let candles = bucket(bars, width.saturating_sub(AXIS_WIDTH).max(1));
    if candles.is_empty() {
        return String::new();
    }

    let top = candles.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let bottom = candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let range = top - bottom;
    let row_of = |price: f64| -> usize {
        if range <= 0.0 {
            height / 2
        } else {
            (((top - price) / range) * (height - 1) as f64).round() as usize
        }
    };

    let mut grid = vec![vec![' '; candles.len()]; height];
    for (col, candle) in candles.iter().enumerate() {
        for row in grid.iter_mut().take(row_of(candle.low) + 1).skip(row_of(candle.high)) {
            row[col] = WICK;
        }
        let body_top = row_of(candle.open.max(candle.close));
        let body_bottom = row_of(candle.open.min(candle.close));
        let body = if candle.is_up() { UP_BODY } else { DOWN_BODY };
        for row in grid.iter_mut().take(body_bottom + 1).skip(body_top) {
            row[col] = body;
        }
    }

    let mut out = String::new();
    for (i, row) in grid.iter().enumerate() {
        let label = if i == 0 {
            format!("{top:>10.2}")
        } else if i == height - 1 {
            format!("{bottom:>10.2}")
        } else {
            " ".repeat(10)
        };
        let line: String = row.iter().collect();
        let _ = writeln!(out, "{label} {}", line.trim_end());
    }
    out
}
