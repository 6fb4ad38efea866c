//! Game-wide constants and defaults.

use super::table::Chips;

/// Seats at a table. Up to ten may sit; a hand needs at least two.
pub const MAX_PLAYERS: usize = 10;
pub const MIN_PLAYERS: usize = 2;

/// Stack handed to a player when they take a seat.
pub const DEFAULT_CHIPS: Chips = 1000;
pub const DEFAULT_SMALL_BLIND: Chips = 10;
pub const DEFAULT_BIG_BLIND: Chips = 20;

/// Seconds a player has to act before the room folds for them.
pub const DEFAULT_TURN_TIMEOUT_SECS: u64 = 30;

/// Cards dealt to each seat and to the board.
pub const HOLE_CARDS: usize = 2;
pub const BOARD_CARDS: usize = 5;

/// Bounded histories kept per room.
pub const MAX_CHAT_HISTORY: usize = 100;
pub const MAX_ACTION_HISTORY: usize = 50;
/// Action records included in each snapshot.
pub const SNAPSHOT_ACTION_HISTORY: usize = 10;

/// Longest accepted chat message, in characters.
pub const MAX_CHAT_LEN: usize = 200;

/// Capacity of a room's command inbox.
pub const ROOM_INBOX_CAPACITY: usize = 100;
/// Capacity of each player's outbound message channel.
pub const SESSION_CHANNEL_CAPACITY: usize = 32;
