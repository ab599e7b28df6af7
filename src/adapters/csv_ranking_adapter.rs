//! CSV leaderboard adapter.

use crate::domain::error::GameError;
use crate::domain::result::{GameResult, RankingEntry};
use crate::ports::result_port::ResultPort;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use tracing::debug;

/// Rows shown on the leaderboard.
pub const LEADERBOARD_LIMIT: usize = 50;

const HEADER: [&str; 5] = [
    "username",
    "twitter_username",
    "final_assets",
    "profit_loss",
    "rating",
];

pub struct CsvRankingAdapter {
    path: PathBuf,
}

impl CsvRankingAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// All saved entries in file order. A missing file is an empty board.
    pub fn read_entries(&self) -> Result<Vec<RankingEntry>, GameError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut rdr = csv::Reader::from_path(&self.path).map_err(|e| GameError::Storage {
            reason: format!("failed to open {}: {}", self.path.display(), e),
        })?;

        let mut entries = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| GameError::Storage {
                reason: format!("CSV parse error: {}", e),
            })?;
            let twitter = column(&record, 1)?;
            entries.push(RankingEntry {
                username: column(&record, 0)?.to_string(),
                twitter_username: (!twitter.is_empty()).then(|| twitter.to_string()),
                result: GameResult {
                    final_assets: parse_column(&record, 2)?,
                    profit_loss: parse_column(&record, 3)?,
                    rating: parse_column(&record, 4)?,
                },
            });
        }
        Ok(entries)
    }

    /// Leaderboard rows: each player's best game, highest final assets
    /// first, later rows first on ties.
    pub fn top(&self, limit: usize) -> Result<Vec<RankingEntry>, GameError> {
        let mut best: HashMap<(String, Option<String>), (usize, RankingEntry)> = HashMap::new();
        for (row, entry) in self.read_entries()?.into_iter().enumerate() {
            let key = (entry.username.clone(), entry.twitter_username.clone());
            let beaten = best
                .get(&key)
                .is_some_and(|(_, kept)| kept.result.final_assets > entry.result.final_assets);
            if !beaten {
                best.insert(key, (row, entry));
            }
        }

        let mut rows: Vec<(usize, RankingEntry)> = best.into_values().collect();
        rows.sort_by(|(ra, a), (rb, b)| {
            b.result
                .final_assets
                .cmp(&a.result.final_assets)
                .then(rb.cmp(ra))
        });
        Ok(rows.into_iter().take(limit).map(|(_, e)| e).collect())
    }

    fn needs_header(&self) -> bool {
        fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true)
    }
}

fn column(record: &csv::StringRecord, i: usize) -> Result<&str, GameError> {
    record.get(i).ok_or_else(|| GameError::Storage {
        reason: format!("missing {} column", HEADER[i]),
    })
}

fn parse_column<T>(record: &csv::StringRecord, i: usize) -> Result<T, GameError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    column(record, i)?.parse().map_err(|e| GameError::Storage {
        reason: format!("invalid {}: {}", HEADER[i], e),
    })
}

impl ResultPort for CsvRankingAdapter {
    fn save(&self, entry: &RankingEntry) -> Result<(), GameError> {
        let write_header = self.needs_header();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| GameError::Storage {
                reason: format!("failed to open {}: {}", self.path.display(), e),
            })?;

        let mut wtr = csv::Writer::from_writer(file);
        let storage = |e: csv::Error| GameError::Storage {
            reason: format!("CSV write error: {}", e),
        };
        if write_header {
            wtr.write_record(HEADER).map_err(storage)?;
        }
        wtr.write_record([
            entry.username.clone(),
            entry.twitter_username.clone().unwrap_or_default(),
            entry.result.final_assets.to_string(),
            entry.result.profit_loss.to_string(),
            entry.result.rating.to_string(),
        ])
        .map_err(storage)?;
        wtr.flush().map_err(|e| GameError::Storage {
            reason: format!("failed to flush {}: {}", self.path.display(), e),
        })?;

        debug!(path = %self.path.display(), username = %entry.username, "ranking saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(name: &str, twitter: Option<&str>, final_assets: i64) -> RankingEntry {
        let profit_loss = final_assets - 1_000_000;
        RankingEntry::new(
            name,
            twitter,
            GameResult {
                final_assets,
                profit_loss,
                rating: crate::domain::ledger::rating(profit_loss as f64, 1_000_000.0),
            },
        )
        .unwrap()
    }

    #[test]
    fn save_writes_header_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rankings.csv");
        let adapter = CsvRankingAdapter::new(path.clone());

        adapter.save(&entry("alice", Some("alice_fx"), 1_020_000)).unwrap();
        adapter.save(&entry("bob", None, 990_000)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "username,twitter_username,final_assets,profit_loss,rating");
        assert_eq!(lines[1], "alice,alice_fx,1020000,20000,7");
        assert_eq!(lines[2], "bob,,990000,-10000,5");
    }

    #[test]
    fn read_entries_round_trips_saved_rows() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvRankingAdapter::new(dir.path().join("rankings.csv"));
        let saved = vec![entry("alice", Some("alice_fx"), 1_020_000), entry("bob", None, 990_000)];
        adapter.save_all(&saved).unwrap();

        assert_eq!(adapter.read_entries().unwrap(), saved);
    }

    #[test]
    fn missing_file_is_empty_board() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvRankingAdapter::new(dir.path().join("none.csv"));
        assert!(adapter.read_entries().unwrap().is_empty());
    }

    #[test]
    fn top_orders_by_final_assets() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvRankingAdapter::new(dir.path().join("rankings.csv"));
        adapter
            .save_all(&[
                entry("low", None, 950_000),
                entry("high", None, 1_100_000),
                entry("mid", None, 1_000_000),
            ])
            .unwrap();

        let top = adapter.top(2).unwrap();
        let names: Vec<&str> = top.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(names, vec!["high", "mid"]);
    }

    #[test]
    fn top_keeps_each_players_best_game() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvRankingAdapter::new(dir.path().join("rankings.csv"));
        adapter
            .save_all(&[
                entry("alice", Some("alice_fx"), 1_050_000),
                entry("alice", Some("alice_fx"), 1_200_000),
                entry("alice", Some("alice_fx"), 990_000),
                entry("alice", None, 1_010_000),
                entry("bob", None, 1_100_000),
            ])
            .unwrap();

        let top = adapter.top(LEADERBOARD_LIMIT).unwrap();
        let rows: Vec<(&str, i64)> = top
            .iter()
            .map(|e| (e.username.as_str(), e.result.final_assets))
            .collect();
        assert_eq!(
            rows,
            vec![("alice", 1_200_000), ("bob", 1_100_000), ("alice", 1_010_000)]
        );
        assert_eq!(top[0].twitter_username.as_deref(), Some("alice_fx"));
        assert_eq!(top[2].twitter_username, None);
    }

    #[test]
    fn top_lists_newer_rows_first_on_ties() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvRankingAdapter::new(dir.path().join("rankings.csv"));
        adapter
            .save_all(&[
                entry("first", None, 1_000_000),
                entry("second", None, 1_000_000),
                entry("third", None, 1_000_000),
            ])
            .unwrap();

        let names: Vec<String> = adapter
            .top(LEADERBOARD_LIMIT)
            .unwrap()
            .into_iter()
            .map(|e| e.username)
            .collect();
        assert_eq!(names, vec!["third", "second", "first"]);
    }

    #[test]
    fn top_stops_at_the_limit() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvRankingAdapter::new(dir.path().join("rankings.csv"));
        let players: Vec<RankingEntry> = (0..60)
            .map(|i| entry(&format!("p{i}"), None, 1_000_000 + i))
            .collect();
        adapter.save_all(&players).unwrap();

        let top = adapter.top(LEADERBOARD_LIMIT).unwrap();
        assert_eq!(top.len(), LEADERBOARD_LIMIT);
        assert_eq!(top[0].username, "p59");
    }

    #[test]
    fn unwritable_path_is_storage_error() {
        let adapter = CsvRankingAdapter::new(PathBuf::from("/nonexistent/dir/rankings.csv"));
        assert!(matches!(
            adapter.save(&entry("alice", None, 1_000_000)),
            Err(GameError::Storage { .. })
        ));
    }
}
