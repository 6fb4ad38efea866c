//! Room runtime: the per-room actor that serialises player commands,
//! drives the table, times out slow seats, and fans personalised state
//! snapshots out to connected clients.

pub mod actor;
pub mod messages;
pub mod protocol;
pub mod registry;
pub mod sessions;

pub use actor::{RoomActor, RoomHandle};
pub use messages::{RoomCommand, RoomSummary};
pub use protocol::{CardView, ChatEntry, ClientMessage, PlayerView, ServerMessage, Snapshot};
pub use registry::RoomRegistry;
