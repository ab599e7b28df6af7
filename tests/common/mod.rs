#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use protrade::domain::bar::Bar;
use protrade::domain::error::GameError;
pub use protrade::domain::feed::{Company, GameFeed};
use protrade::ports::feed_port::FeedPort;

pub struct MockFeedPort {
    pub feed: Option<GameFeed>,
    pub error: Option<String>,
}

impl MockFeedPort {
    pub fn new(feed: GameFeed) -> Self {
        Self {
            feed: Some(feed),
            error: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            feed: None,
            error: Some(reason.to_string()),
        }
    }
}

impl FeedPort for MockFeedPort {
    fn fetch_feed(&self) -> Result<GameFeed, GameError> {
        if let Some(reason) = &self.error {
            return Err(GameError::FeedParse {
                reason: reason.clone(),
            });
        }
        self.feed.clone().ok_or_else(|| GameError::FeedParse {
            reason: "no feed".into(),
        })
    }
}

pub fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

pub fn make_bar(time: NaiveDateTime, close: f64) -> Bar {
    Bar {
        time,
        open: close - 2.0,
        high: close + 5.0,
        low: close - 5.0,
        close,
        volume: 1_000,
    }
}

/// Consecutive 5-minute bars starting at `start`, one per close.
pub fn make_bars(start: NaiveDateTime, closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(start + Duration::minutes(5 * i as i64), c))
        .collect()
}

pub fn company() -> Company {
    Company {
        code: "7203".into(),
        name: "Toyota".into(),
        date: "2024-03-01".into(),
    }
}

/// Seed of one 9:00 bar at 1000, then 9:05 @ 1010 and 9:10 @ 1005 pending.
pub fn scenario_feed() -> GameFeed {
    GameFeed {
        company: company(),
        historical: vec![],
        prices: vec![make_bar(at(1, 9, 0), 1000.0)],
        additional_prices: vec![
            make_bar(at(1, 9, 5), 1010.0),
            make_bar(at(1, 9, 10), 1005.0),
        ],
    }
}

/// Previous afternoon 14:15-15:30 block, then a full morning pending.
pub fn session_feed(with_history: bool) -> GameFeed {
    let history: Vec<f64> = (0..40).map(|i| 980.0 + (i % 7) as f64).collect();
    let prev: Vec<f64> = (0..16).map(|i| 990.0 + i as f64).collect();
    let today: Vec<f64> = (0..30)
        .map(|i| 1000.0 + ((i * 13) % 17) as f64 - 8.0)
        .collect();

    let mut prices = make_bars(at(1, 14, 15), &prev);
    let mut rest = make_bars(at(4, 9, 0), &today);
    prices.push(rest.remove(0));

    GameFeed {
        company: company(),
        historical: if with_history {
            make_bars(at(1, 10, 0), &history)
        } else {
            vec![]
        },
        prices,
        additional_prices: rest,
    }
}

pub fn chart_json() -> String {
    r#"{
  "success": true,
  "company": {"code": "6758", "name": "Sony Group", "date": "2024-03-04"},
  "prices": [
    {"time": "2024-03-01 15:25:00", "open": 13000, "high": 13050, "low": 12980, "close": 13020, "volume": 4000},
    {"time": "2024-03-01 15:30:00", "open": 13020, "high": 13040, "low": 13000, "close": 13030, "volume": 9000},
    {"time": "2024-03-04 09:00:00", "open": 13100, "high": 13150, "low": 13080, "close": 13120, "volume": 12000}
  ],
  "additional_prices": [
    {"time": "2024-03-04 09:05:00", "open": 13120, "high": 13200, "low": 13110, "close": 13180, "volume": 8000},
    {"time": "2024-03-04 09:10:00", "open": 13180, "high": 13190, "low": 13090, "close": 13100, "volume": 7000}
  ]
}"#
    .to_string()
}
