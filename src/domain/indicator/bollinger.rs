//! Bollinger Bands.
//!
//! - Middle: SMA over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the population standard deviation (divides by N, not N-1).
//! The two-band variant emits ±1σ and ±2σ around the same middle line.
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) points are undefined.

use crate::domain::indicator::sma::window_mean;
use crate::domain::indicator::stddev::population_stddev;
use serde::Serialize;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandPair {
    pub upper2: f64,
    pub upper1: f64,
    pub middle: f64,
    pub lower1: f64,
    pub lower2: f64,
}

/// Trailing (mean, stddev) per index, `None` during warm-up.
fn mean_and_stddev(closes: &[f64], period: usize) -> Vec<Option<(f64, f64)>> {
    if period == 0 {
        return vec![None; closes.len()];
    }

    (0..closes.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &closes[i + 1 - period..=i];
            let mean = window_mean(window);
            Some((mean, population_stddev(window, mean)))
        })
        .collect()
}

pub fn bollinger(closes: &[f64], period: usize, multiplier: f64) -> Vec<Option<Band>> {
    mean_and_stddev(closes, period)
        .into_iter()
        .map(|point| {
            point.map(|(middle, sd)| Band {
                upper: middle + multiplier * sd,
                middle,
                lower: middle - multiplier * sd,
            })
        })
        .collect()
}

pub fn bollinger_two_band(closes: &[f64], period: usize) -> Vec<Option<BandPair>> {
    mean_and_stddev(closes, period)
        .into_iter()
        .map(|point| {
            point.map(|(middle, sd)| BandPair {
                upper2: middle + 2.0 * sd,
                upper1: middle + sd,
                middle,
                lower1: middle - sd,
                lower2: middle - 2.0 * sd,
            })
        })
        .collect()
}
