//! Population standard deviation.
//!
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n) / n)
//! Divides by n, not n-1. Undefined for the first (n-1) points.

use crate::domain::indicator::sma::window_mean;

/// Population standard deviation of a window around a precomputed mean.
pub fn population_stddev(window: &[f64], mean: f64) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let variance = window
        .iter()
        .map(|c| {
            let diff = c - mean;
            diff * diff
        })
        .sum::<f64>()
        / window.len() as f64;
    variance.sqrt()
}

pub fn stddev(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; closes.len()];
    }

    (0..closes.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &closes[i + 1 - period..=i];
            Some(population_stddev(window, window_mean(window)))
        })
        .collect()
}
