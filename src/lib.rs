//! Authoritative game engines for a real-time chat server: a two-player
//! Battleship session manager with matchmaking and a single-player Blackjack
//! dealer, behind a registry that routes identity-scoped actions and fans
//! events back out to per-connection delivery channels.
//!
//! The surrounding chat plumbing (auth, message history, rooms) lives
//! elsewhere; this crate consumes an [`Identity`], a [`BalanceStore`] and a
//! [`GameLedger`] and emits [`Event`]s.

mod battleship;
mod blackjack;
mod board;
mod cards;
mod common;
mod config;
mod identity;
mod logging;
mod matchmaking;
mod protocol;
mod registry;
mod store;

pub use battleship::*;
pub use blackjack::*;
pub use board::*;
pub use cards::*;
pub use common::*;
pub use config::*;
pub use identity::*;
pub use logging::init_logging;
pub use matchmaking::*;
pub use protocol::*;
pub use registry::*;
pub use store::*;
