//! RSI (Relative Strength Index).
//!
//! Average gain/loss are plain means over the trailing `n` close
//! differences, recomputed at every point (no Wilder smoothing).
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n points are undefined (need n price changes).

pub const DEFAULT_PERIOD: usize = 14;

pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; closes.len()];
    }

    (0..closes.len())
        .map(|i| {
            if i < period {
                return None;
            }
            let mut gain = 0.0;
            let mut loss = 0.0;
            for j in (i + 1 - period)..=i {
                let change = closes[j] - closes[j - 1];
                if change > 0.0 {
                    gain += change;
                } else {
                    loss -= change;
                }
            }
            let avg_gain = gain / period as f64;
            let avg_loss = loss / period as f64;
            if avg_loss == 0.0 {
                Some(100.0)
            } else {
                Some(100.0 - 100.0 / (1.0 + avg_gain / avg_loss))
            }
        })
        .collect()
}
