//! Persistence of finished games.

use crate::domain::error::GameError;
use crate::domain::result::RankingEntry;

pub trait ResultPort {
    fn save(&self, entry: &RankingEntry) -> Result<(), GameError>;

    /// Default implementation: saves entries one by one, stopping at the first failure.
    fn save_all(&self, entries: &[RankingEntry]) -> Result<(), GameError> {
        entries.iter().try_for_each(|e| self.save(e))
    }
}
