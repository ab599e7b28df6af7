//! Domain error types.

use chrono::NaiveDateTime;
use std::fmt;

/// Which part of the time series a bar was loaded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Historical,
    Display,
    Pending,
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Partition::Historical => write!(f, "historical"),
            Partition::Display => write!(f, "display"),
            Partition::Pending => write!(f, "pending"),
        }
    }
}

/// Top-level error type for protrade.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("display seed is empty: at least one bar must be visible")]
    DataGap,

    #[error("bar {index} of the {partition} partition at {time} is not after the preceding bar")]
    OrderViolation {
        partition: Partition,
        index: usize,
        time: NaiveDateTime,
    },

    #[error("no pending bars left to reveal")]
    EmptyPending,

    #[error("the game has already finished")]
    GameFinished,

    #[error("a position is already open; close it before opening another")]
    PositionAlreadyOpen,

    #[error("insufficient margin: need {required:.0}, have {available:.0}")]
    InsufficientMargin { required: f64, available: f64 },

    #[error("invalid quantity {quantity}: {reason}")]
    InvalidQuantity { quantity: u32, reason: String },

    #[error("no open position to close")]
    NoPosition,

    #[error("feed error: {reason}")]
    FeedParse { reason: String },

    #[error("invalid player: {reason}")]
    InvalidPlayer { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("storage error: {reason}")]
    Storage { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GameError {
    /// Player-facing rule violations: the action was refused and nothing changed.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            GameError::EmptyPending
                | GameError::GameFinished
                | GameError::PositionAlreadyOpen
                | GameError::InsufficientMargin { .. }
                | GameError::InvalidQuantity { .. }
                | GameError::NoPosition
        )
    }
}

impl From<&GameError> for std::process::ExitCode {
    fn from(err: &GameError) -> Self {
        let code: u8 = match err {
            GameError::Io(_) => 1,
            GameError::ConfigParse { .. }
            | GameError::ConfigMissing { .. }
            | GameError::ConfigInvalid { .. } => 2,
            GameError::Storage { .. } => 3,
            GameError::DataGap
            | GameError::OrderViolation { .. }
            | GameError::FeedParse { .. }
            | GameError::InvalidPlayer { .. } => 4,
            GameError::EmptyPending
            | GameError::GameFinished
            | GameError::PositionAlreadyOpen
            | GameError::InsufficientMargin { .. }
            | GameError::InvalidQuantity { .. }
            | GameError::NoPosition => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_margin_message() {
        let err = GameError::InsufficientMargin {
            required: 300_000.0,
            available: 100_000.0,
        };
        assert_eq!(
            err.to_string(),
            "insufficient margin: need 300000, have 100000"
        );
    }

    #[test]
    fn order_violation_names_partition() {
        let time = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();
        let err = GameError::OrderViolation {
            partition: Partition::Pending,
            index: 2,
            time,
        };
        assert!(err.to_string().contains("pending partition"));
        assert!(err.to_string().contains("2024-03-01 09:05:00"));
    }

    #[test]
    fn rejections_are_game_rule_errors() {
        assert!(GameError::NoPosition.is_rejection());
        assert!(GameError::PositionAlreadyOpen.is_rejection());
        assert!(!GameError::DataGap.is_rejection());
        assert!(
            !GameError::FeedParse {
                reason: "x".into()
            }
            .is_rejection()
        );
    }
}
