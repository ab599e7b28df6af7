//! Core game logic: price series, indicators, playback and the margin account.

pub mod bar;
pub mod time_series;
pub mod indicator;
pub mod indicator_engine;
pub mod playback;
pub mod position;
pub mod ledger;
pub mod result;
pub mod render;
pub mod feed;
pub mod game_config;
pub mod config_validation;
pub mod session;
pub mod error;
