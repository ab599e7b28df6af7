//! The single open position and the record left behind when it closes.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "long"),
            Side::Short => write!(f, "short"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub side: Side,
    pub quantity: u32,
    pub entry_price: f64,
    pub margin_held: f64,
}

impl Position {
    /// Notional value of the shares at `price`.
    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }

    /// Long gains when price rises, short when it falls.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        let quantity = self.quantity as f64;
        match self.side {
            Side::Long => (price - self.entry_price) * quantity,
            Side::Short => (self.entry_price - price) * quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosedTrade {
    pub side: Side,
    pub quantity: u32,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub pnl: f64,
}
