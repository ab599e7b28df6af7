//! OHLCV candle representation.

use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;

/// One 5-minute candle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub time: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Bar {
    /// Wall-clock label shown on the chart axis, e.g. `09:05`.
    pub fn time_label(&self) -> String {
        format!("{:02}:{:02}", self.time.hour(), self.time.minute())
    }
}
