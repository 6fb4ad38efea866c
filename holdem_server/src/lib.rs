//! HTTP/WebSocket front for the Hold'em room engine.
//!
//! The server is thin by design: HTTP endpoints cover the lobby (list,
//! create, inspect), and one WebSocket per (room, player) carries the
//! game protocol. All game state lives in `holdem_core` room actors.

pub mod api;
pub mod config;
pub mod logging;
