//! Technical indicator implementations.
//!
//! Every calculation is a pure function over a close-price slice. Points
//! without enough lookback are `None`, never a numeric placeholder:
//! - `IndicatorPoint`: one display-aligned point in an indicator series
//! - `IndicatorValue`: enum for the different indicator output shapes
//! - `IndicatorType`: indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: a display-aligned series of indicator points

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rci;
pub mod rsi;
pub mod sma;
pub mod stddev;

pub use bollinger::{bollinger, bollinger_two_band, Band, BandPair};
pub use ema::ema;
pub use macd::{macd, MacdPoint};
pub use rci::rci;
pub use rsi::rsi;
pub use sma::sma;

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorPoint {
    pub time: NaiveDateTime,
    pub value: Option<IndicatorValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IndicatorValue {
    Simple(f64),
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
    BollingerBands {
        upper2: f64,
        upper1: f64,
        middle: f64,
        lower1: f64,
        lower2: f64,
    },
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Rci(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
    /// Middle line with ±1σ and ±2σ bands.
    BollingerBands {
        period: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Scalar values for single-line indicators; `None` for undefined points
    /// and for multi-line shapes.
    pub fn simple_values(&self) -> Vec<Option<f64>> {
        self.values
            .iter()
            .map(|p| match p.value {
                Some(IndicatorValue::Simple(v)) => Some(v),
                _ => None,
            })
            .collect()
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|p| p.value.is_some()).count()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Rci(period) => write!(f, "RCI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
            IndicatorType::BollingerBands { period } => write!(f, "BB({},σ1,σ2)", period),
        }
    }
}
