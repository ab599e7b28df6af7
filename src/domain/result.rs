//! End-of-game record handed to the persistence collaborator.

use crate::domain::error::GameError;
use crate::domain::ledger::{rating, MarginLedger};
use serde::Serialize;

pub const MAX_USERNAME_CHARS: usize = 20;
pub const MAX_TWITTER_CHARS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameResult {
    pub final_assets: i64,
    pub profit_loss: i64,
    pub rating: u8,
}

impl GameResult {
    /// Packages the ledger's settled state. Amounts are truncated toward
    /// zero; the rating is taken from the truncated profit/loss.
    pub fn from_ledger(ledger: &MarginLedger) -> Self {
        let final_assets = ledger.settled_assets().trunc() as i64;
        let profit_loss = ledger.realized_pnl().trunc() as i64;
        Self {
            final_assets,
            profit_loss,
            rating: rating(profit_loss as f64, ledger.initial_cash()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingEntry {
    pub username: String,
    pub twitter_username: Option<String>,
    #[serde(flatten)]
    pub result: GameResult,
}

impl RankingEntry {
    pub fn new(
        username: &str,
        twitter_username: Option<&str>,
        result: GameResult,
    ) -> Result<Self, GameError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(GameError::InvalidPlayer {
                reason: "username is required".into(),
            });
        }
        if username.chars().count() > MAX_USERNAME_CHARS {
            return Err(GameError::InvalidPlayer {
                reason: format!("username must be at most {MAX_USERNAME_CHARS} characters"),
            });
        }

        let twitter_username = twitter_username
            .map(str::trim)
            .filter(|s| !s.is_empty());
        if let Some(handle) = twitter_username {
            if handle.chars().count() > MAX_TWITTER_CHARS {
                return Err(GameError::InvalidPlayer {
                    reason: format!("X username must be at most {MAX_TWITTER_CHARS} characters"),
                });
            }
        }

        Ok(Self {
            username: username.to_string(),
            twitter_username: twitter_username.map(str::to_string),
            result,
        })
    }
}
