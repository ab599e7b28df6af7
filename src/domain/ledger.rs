//! Margin account with at most one open position.
//!
//! Both sides reserve `price × quantity × margin_rate` from cash while open.
//! On close the margin comes back together with the realized P&L.

use crate::domain::error::GameError;
use crate::domain::position::{Position, Side};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerState {
    Flat,
    Open,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarginLedger {
    initial_cash: f64,
    margin_rate: f64,
    /// Cash including any margin currently held. Only P&L ever changes it,
    /// so an open/close round trip at one price restores it exactly.
    balance: f64,
    realized_pnl: f64,
    position: Option<Position>,
    last_price: Option<f64>,
}

impl MarginLedger {
    pub fn new(initial_cash: f64, margin_rate: f64) -> Self {
        Self {
            initial_cash,
            margin_rate,
            balance: initial_cash,
            realized_pnl: 0.0,
            position: None,
            last_price: None,
        }
    }

    pub fn state(&self) -> LedgerState {
        if self.position.is_some() {
            LedgerState::Open
        } else {
            LedgerState::Flat
        }
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    /// Free cash: balance minus any margin held by the open position.
    pub fn cash(&self) -> f64 {
        match &self.position {
            Some(pos) => self.balance - pos.margin_held,
            None => self.balance,
        }
    }

    /// Cash plus held margin; excludes unrealized P&L.
    pub fn settled_assets(&self) -> f64 {
        self.balance
    }

    pub fn realized_pnl(&self) -> f64 {
        self.realized_pnl
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    pub fn margin_rate(&self) -> f64 {
        self.margin_rate
    }

    pub fn last_price(&self) -> Option<f64> {
        self.last_price
    }

    pub fn margin_for(&self, quantity: u32, price: f64) -> f64 {
        price * quantity as f64 * self.margin_rate
    }

    pub fn open(&mut self, side: Side, quantity: u32, price: f64) -> Result<&Position, GameError> {
        if self.position.is_some() {
            return Err(GameError::PositionAlreadyOpen);
        }
        if quantity == 0 {
            return Err(GameError::InvalidQuantity {
                quantity,
                reason: "quantity must be positive".into(),
            });
        }

        let margin = self.margin_for(quantity, price);
        let available = self.cash();
        if margin > available {
            return Err(GameError::InsufficientMargin {
                required: margin,
                available,
            });
        }

        debug!(%side, quantity, price, margin, "position opened");
        self.last_price = Some(price);
        Ok(&*self.position.insert(Position {
            side,
            quantity,
            entry_price: price,
            margin_held: margin,
        }))
    }

    /// Closes the open position at `price` and returns the realized P&L.
    pub fn close(&mut self, price: f64) -> Result<f64, GameError> {
        let position = self.position.take().ok_or(GameError::NoPosition)?;
        let pnl = position.unrealized_pnl(price);

        self.balance += pnl;
        self.realized_pnl += pnl;
        self.last_price = Some(price);
        debug!(side = %position.side, price, pnl, cash = self.balance, "position closed");
        Ok(pnl)
    }

    /// P&L of the open position at `price`; 0 when flat.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.position
            .as_ref()
            .map_or(0.0, |pos| pos.unrealized_pnl(price))
    }

    /// Records the latest price and returns the unrealized P&L at it.
    pub fn mark_to_market(&mut self, price: f64) -> f64 {
        self.last_price = Some(price);
        self.unrealized_pnl(price)
    }

    /// Total account value if the position were closed at `price`.
    pub fn equity(&self, price: f64) -> f64 {
        self.balance + self.unrealized_pnl(price)
    }

    pub fn rating(&self, profit_loss: f64) -> u8 {
        rating(profit_loss, self.initial_cash)
    }
}

/// Maps profit as a percentage of initial cash onto a 1-10 score.
pub fn rating(profit_loss: f64, initial_cash: f64) -> u8 {
    if initial_cash <= 0.0 {
        return 1;
    }
    let rate = profit_loss * 100.0 / initial_cash;
    match rate {
        r if r >= 15.0 => 10,
        r if r >= 10.0 => 9,
        r if r >= 5.0 => 8,
        r if r >= 2.0 => 7,
        r if r >= 0.0 => 6,
        r if r >= -2.0 => 5,
        r if r >= -5.0 => 4,
        r if r >= -10.0 => 3,
        r if r >= -15.0 => 2,
        _ => 1,
    }
}
