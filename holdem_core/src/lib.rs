//! # Hold'em Core
//!
//! A networked Texas Hold'em room engine. Each room is an independent
//! actor that owns its table state, serialises player actions through a
//! bounded command inbox, drives the hand lifecycle (blinds, streets,
//! betting rounds, showdown, side pots), and fans personalised state
//! snapshots out to connected players.
//!
//! ## Core Modules
//!
//! - [`game`]: cards, hand evaluation, pot math, betting rules, and the
//!   table/hand state machine
//! - [`room`]: the per-room actor, session fan-out, wire protocol, and
//!   the process-wide room registry
//!
//! ## Example
//!
//! ```
//! use holdem_core::game::{BettingMode, Table, TableConfig};
//!
//! let mut table = Table::new(TableConfig {
//!     betting_mode: BettingMode::NoLimit,
//!     ..TableConfig::default()
//! });
//! table.add_player("p1", "alice").unwrap();
//! table.add_player("p2", "bob").unwrap();
//! table.start_hand().unwrap();
//! ```

pub mod game;
pub mod room;

pub use game::{
    Action, ActionError, BettingMode, Chips, Stage, Table, TableConfig,
    constants::{DEFAULT_BIG_BLIND, DEFAULT_CHIPS, DEFAULT_SMALL_BLIND, MAX_PLAYERS},
};
pub use room::{
    actor::RoomHandle,
    protocol::{ClientMessage, ServerMessage, Snapshot},
    registry::RoomRegistry,
};
