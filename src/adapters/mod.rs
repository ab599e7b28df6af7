//! Concrete adapter implementations for ports.

pub mod csv_ranking_adapter;
pub mod file_config_adapter;
pub mod json_feed_adapter;
