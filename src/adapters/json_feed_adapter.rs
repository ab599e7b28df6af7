//! JSON chart payload adapter.
//!
//! Reads the session-start payload produced by the chart endpoint:
//! `company`, `prices`, `additional_prices` and an optional
//! `historical_prices` lookback.

use crate::domain::bar::Bar;
use crate::domain::error::GameError;
use crate::domain::feed::{Company, GameFeed};
use crate::ports::feed_port::FeedPort;
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Deserialize)]
struct RawFeed {
    success: Option<bool>,
    error: Option<String>,
    company: Option<RawCompany>,
    #[serde(default)]
    prices: Vec<RawBar>,
    #[serde(default)]
    additional_prices: Vec<RawBar>,
    historical_prices: Option<Vec<RawBar>>,
}

#[derive(Debug, Deserialize)]
struct RawCompany {
    code: String,
    name: String,
    #[serde(default)]
    date: String,
}

#[derive(Debug, Deserialize)]
struct RawBar {
    time: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: i64,
}

enum Source {
    File(PathBuf),
    Inline(String),
}

pub struct JsonFeedAdapter {
    source: Source,
}

impl JsonFeedAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Self {
        Self {
            source: Source::File(path.as_ref().to_path_buf()),
        }
    }

    pub fn from_string(content: impl Into<String>) -> Self {
        Self {
            source: Source::Inline(content.into()),
        }
    }

    fn read_source(&self) -> Result<String, GameError> {
        match &self.source {
            Source::File(path) => fs::read_to_string(path).map_err(|e| GameError::FeedParse {
                reason: format!("failed to read {}: {}", path.display(), e),
            }),
            Source::Inline(content) => Ok(content.clone()),
        }
    }
}

impl FeedPort for JsonFeedAdapter {
    fn fetch_feed(&self) -> Result<GameFeed, GameError> {
        parse_feed(&self.read_source()?)
    }
}

/// Parses a chart payload into a [`GameFeed`].
pub fn parse_feed(content: &str) -> Result<GameFeed, GameError> {
    let raw: RawFeed = serde_json::from_str(content).map_err(|e| GameError::FeedParse {
        reason: format!("invalid JSON: {}", e),
    })?;

    if raw.success == Some(false) {
        return Err(GameError::FeedParse {
            reason: raw
                .error
                .unwrap_or_else(|| "feed reported failure".to_string()),
        });
    }

    let company = raw.company.ok_or_else(|| GameError::FeedParse {
        reason: "missing company".into(),
    })?;

    Ok(GameFeed {
        company: Company {
            code: company.code,
            name: company.name,
            date: company.date,
        },
        historical: convert_bars(raw.historical_prices.unwrap_or_default(), "historical_prices")?,
        prices: convert_bars(raw.prices, "prices")?,
        additional_prices: convert_bars(raw.additional_prices, "additional_prices")?,
    })
}

fn convert_bars(raw: Vec<RawBar>, field: &str) -> Result<Vec<Bar>, GameError> {
    raw.into_iter()
        .enumerate()
        .map(|(i, b)| {
            if !(b.close.is_finite() && b.close > 0.0) {
                return Err(GameError::FeedParse {
                    reason: format!("{}[{}]: close must be positive, got {}", field, i, b.close),
                });
            }
            if b.volume < 0 {
                return Err(GameError::FeedParse {
                    reason: format!("{}[{}]: negative volume {}", field, i, b.volume),
                });
            }
            Ok(Bar {
                time: parse_time(&b.time).map_err(|reason| GameError::FeedParse {
                    reason: format!("{}[{}]: {}", field, i, reason),
                })?,
                open: b.open,
                high: b.high,
                low: b.low,
                close: b.close,
                volume: b.volume,
            })
        })
        .collect()
}

/// Accepts SQLite datetime text, ISO-8601 without offset, or RFC 3339.
/// An offset is dropped and the local wall time kept.
fn parse_time(s: &str) -> Result<NaiveDateTime, String> {
    let s = s.trim();
    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Ok(dt);
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_local())
        .map_err(|_| format!("invalid time '{}'", s))
}
