//! Source of the session-start payload (company + bar partitions).

use crate::domain::error::GameError;
use crate::domain::feed::GameFeed;

pub trait FeedPort {
    fn fetch_feed(&self) -> Result<GameFeed, GameError>;
}
