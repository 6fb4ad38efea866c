//! Poker game engine: cards, hand evaluation, pot math, betting rules,
//! and the table state machine that drives one hand from blinds to
//! showdown.

pub mod betting;
pub mod cards;
pub mod constants;
pub mod eval;
pub mod pot;
pub mod table;

pub use betting::BettingMode;
pub use cards::{Card, Deck, Suit, Value};
pub use eval::{HandRank, HandValue, evaluate};
pub use pot::{Pot, build_pots, distribute};
pub use table::{
    Action, ActionError, ActionRecord, Chips, HandProgress, HandResult, Player, PlayerId,
    RoomPhase, SeatIndex, Stage, Table, TableConfig, Winner,
};
