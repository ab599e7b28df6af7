//! RCI (Rank Correlation Index).
//!
//! Spearman rank correlation between time order and price order inside
//! the trailing window, scaled to ±100:
//!
//! RCI = (1 - 6·Σd² / (n·(n²-1))) × 100, d = time_rank - price_rank
//!
//! Time ranks run 1..n from oldest to newest. Price ranks run 1..n from
//! the lowest close to the highest, with tied closes sharing their average
//! rank. A steadily rising window therefore scores +100 and a steadily
//! falling one -100.
//!
//! Warmup: first (n-1) points are undefined. Periods below 2 have no
//! meaningful correlation and are undefined everywhere.

pub const DEFAULT_SHORT_PERIOD: usize = 9;
pub const DEFAULT_LONG_PERIOD: usize = 26;

pub fn rci(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period < 2 {
        return vec![None; closes.len()];
    }

    let n = period as f64;
    let denominator = n * (n * n - 1.0);

    (0..closes.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &closes[i + 1 - period..=i];
            let price_ranks = ascending_ranks(window);
            let d_squared: f64 = price_ranks
                .iter()
                .enumerate()
                .map(|(t, &p)| {
                    let d = (t + 1) as f64 - p;
                    d * d
                })
                .sum();
            Some((1.0 - 6.0 * d_squared / denominator) * 100.0)
        })
        .collect()
}

/// 1-based ranks by ascending value; ties get the mean of the ranks they span.
fn ascending_ranks(window: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..window.len()).collect();
    order.sort_by(|&a, &b| window[a].total_cmp(&window[b]));

    let mut ranks = vec![0.0; window.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && window[order[end]] == window[order[start]] {
            end += 1;
        }
        // positions start..end hold equal values → ranks start+1..=end
        let shared = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = shared;
        }
        start = end;
    }
    ranks
}
