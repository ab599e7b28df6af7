//! protrade: intraday stock trading replay game.
//!
//! Hexagonal architecture: game logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], terminal front-end in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
