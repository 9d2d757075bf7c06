//! Pixel board client.
//!
//! The canvas engine (`canvas`) owns the board view and selection; the wire
//! model (`frames`) is shared with the backend. This crate connects the two to
//! the outside world: wallet providers, the paint contract, the REST backend,
//! and the push channel. [`app::App`] is the root a host drives.

pub mod api;
pub mod app;
pub mod channel;
pub mod config;
pub mod contract;
pub mod error;
pub mod leaderboard;
pub mod notify;
pub mod session;
pub mod wallet;

#[cfg(test)]
pub(crate) mod test_helpers;
