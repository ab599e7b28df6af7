//! Session-start payload: the chosen company and its three bar partitions.

use serde::Serialize;

use crate::domain::bar::Bar;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Company {
    pub code: String,
    pub name: String,
    /// Trading day being replayed, as supplied by the feed.
    pub date: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameFeed {
    pub company: Company,
    /// Warm-up only; never shown.
    pub historical: Vec<Bar>,
    /// Previous session's closing block plus the first bar of the day.
    pub prices: Vec<Bar>,
    /// Remaining bars of the day, revealed one per step.
    pub additional_prices: Vec<Bar>,
}

impl GameFeed {
    pub fn total_bars(&self) -> usize {
        self.historical.len() + self.prices.len() + self.additional_prices.len()
    }
}
