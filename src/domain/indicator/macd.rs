//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! The raw series is numerically defined from index 0 because the EMAs are
//! seeded with the first value; callers hide the first `slow - 1` points.

use crate::domain::indicator::ema;
use serde::Serialize;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacdPoint {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

pub fn macd(closes: &[f64], fast: usize, slow: usize, signal_period: usize) -> Vec<MacdPoint> {
    if closes.is_empty() || fast == 0 || slow == 0 || signal_period == 0 {
        return Vec::new();
    }

    let ema_fast = ema(closes, fast);
    let ema_slow = ema(closes, slow);

    let line: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| f - s)
        .collect();
    let signal = ema(&line, signal_period);

    line.iter()
        .zip(signal.iter())
        .map(|(&line, &signal)| MacdPoint {
            line,
            signal,
            histogram: line - signal,
        })
        .collect()
}

/// Index of the first point with `slow - 1` bars behind it.
pub fn first_surfaced_index(slow: usize) -> usize {
    slow.saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_defined_from_index_0() {
        let points = macd(&[100.0, 101.0, 103.0], DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL);
        assert_eq!(points.len(), 3);
        assert!(points.iter().all(|p| p.line.is_finite()));
        // both EMAs share the same seed, so the first line value is zero
        assert!(points[0].line.abs() < f64::EPSILON);
    }

    #[test]
    fn macd_line_is_ema_difference() {
        let closes: Vec<f64> = (0..40).map(|i| 1000.0 + (i as f64 * 0.7).sin() * 15.0).collect();
        let points = macd(&closes, 12, 26, 9);
        let fast = ema(&closes, 12);
        let slow = ema(&closes, 26);
        for i in 0..closes.len() {
            assert!((points[i].line - (fast[i] - slow[i])).abs() < 1e-10);
        }
    }

    #[test]
    fn macd_signal_and_histogram() {
        let closes: Vec<f64> = (0..30).map(|i| 500.0 + i as f64).collect();
        let points = macd(&closes, 3, 6, 4);
        let lines: Vec<f64> = points.iter().map(|p| p.line).collect();
        let signal = ema(&lines, 4);
        for (p, s) in points.iter().zip(signal.iter()) {
            assert!((p.signal - s).abs() < 1e-10);
            assert!((p.histogram - (p.line - p.signal)).abs() < 1e-10);
        }
    }

    #[test]
    fn macd_rising_prices_positive_line() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let points = macd(&closes, 12, 26, 9);
        assert!(points[49].line > 0.0);
    }

    #[test]
    fn macd_zero_period() {
        assert!(macd(&[1.0, 2.0], 0, 26, 9).is_empty());
        assert!(macd(&[], 12, 26, 9).is_empty());
    }

    #[test]
    fn first_surfaced_index_default() {
        assert_eq!(first_surfaced_index(DEFAULT_SLOW), 25);
        assert_eq!(first_surfaced_index(0), 0);
    }
}
