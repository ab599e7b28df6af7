//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the first close (not an SMA), then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k). Defined from index 0.

pub fn ema(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.is_empty() {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut values = Vec::with_capacity(closes.len());
    let mut prev = closes[0];
    values.push(prev);

    for &close in &closes[1..] {
        prev = close * k + prev * (1.0 - k);
        values.push(prev);
    }

    values
}
