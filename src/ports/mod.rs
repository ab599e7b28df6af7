//! Port traits at the I/O seams of the game.

pub mod config_port;
pub mod feed_port;
pub mod result_port;
