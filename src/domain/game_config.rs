//! Game parameters: starting cash, margin, lot rules and indicator periods.

use crate::domain::error::GameError;
use crate::domain::indicator::{bollinger, macd, rci, rsi};
use crate::domain::render::VisibilityFlags;

pub const DEFAULT_INITIAL_CASH: f64 = 1_000_000.0;
pub const DEFAULT_MARGIN_RATE: f64 = 0.30;
pub const DEFAULT_LOT_SIZE: u32 = 100;
pub const DEFAULT_MAX_LOTS: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSettings {
    pub ma_short: usize,
    pub ma_long: usize,
    pub bollinger_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub rsi_period: usize,
    pub rci_short: usize,
    pub rci_long: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            ma_short: 5,
            ma_long: 25,
            bollinger_period: bollinger::DEFAULT_PERIOD,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
            rsi_period: rsi::DEFAULT_PERIOD,
            rci_short: rci::DEFAULT_SHORT_PERIOD,
            rci_long: rci::DEFAULT_LONG_PERIOD,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub initial_cash: f64,
    pub margin_rate: f64,
    pub lot_size: u32,
    pub max_lots: u32,
    pub indicators: IndicatorSettings,
    pub visibility: VisibilityFlags,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_cash: DEFAULT_INITIAL_CASH,
            margin_rate: DEFAULT_MARGIN_RATE,
            lot_size: DEFAULT_LOT_SIZE,
            max_lots: DEFAULT_MAX_LOTS,
            indicators: IndicatorSettings::default(),
            visibility: VisibilityFlags::default(),
        }
    }
}

impl GameConfig {
    pub fn max_quantity(&self) -> u32 {
        self.lot_size.saturating_mul(self.max_lots)
    }

    pub fn check_quantity(&self, quantity: u32) -> Result<(), GameError> {
        let reason = if quantity == 0 {
            "quantity must be positive".to_string()
        } else if quantity % self.lot_size != 0 {
            format!("quantity must be a multiple of {}", self.lot_size)
        } else if quantity > self.max_quantity() {
            format!("quantity must not exceed {}", self.max_quantity())
        } else {
            return Ok(());
        };
        Err(GameError::InvalidQuantity { quantity, reason })
    }
}
