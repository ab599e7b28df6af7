//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]). Defined for i >= n-1.

pub fn sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; closes.len()];
    }

    (0..closes.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &closes[i + 1 - period..=i];
            Some(window_mean(window))
        })
        .collect()
}

/// Mean of a window, summed oldest to newest. Bollinger bands reuse this so
/// their middle line is bit-identical to the SMA.
pub(crate) fn window_mean(window: &[f64]) -> f64 {
    window.iter().sum::<f64>() / window.len() as f64
}
