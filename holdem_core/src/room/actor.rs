//! Room actor: a dedicated task per room that drains a bounded command
//! inbox, applies actions to the table, arms the per-turn action timer,
//! and broadcasts personalised snapshots after every accepted command.
//!
//! The actor is the only writer of its room's state. Errors caused by a
//! single client are answered on that client's channel and never mutate
//! or broadcast anything; invariant violations are fatal for the room.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

use super::messages::{RoomCommand, RoomSummary};
use super::protocol::{ChatEntry, ClientMessage, ServerMessage, Snapshot};
use super::sessions::Sessions;
use crate::game::constants::{MAX_ACTION_HISTORY, MAX_CHAT_HISTORY, MAX_CHAT_LEN, ROOM_INBOX_CAPACITY};
use crate::game::table::{
    Action, ActionError, ActionRecord, HandProgress, HandResult, Table, TableConfig,
};

/// Cloneable handle for pushing commands into a room's inbox.
#[derive(Clone, Debug)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomCommand>,
    room_id: String,
}

impl RoomHandle {
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub async fn send(&self, command: RoomCommand) -> Result<(), ActionError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| ActionError::RoomClosed)
    }
}

struct TurnTimer {
    key: (u64, u64),
    deadline: Instant,
}

pub struct RoomActor {
    id: String,
    table: Table,
    inbox: mpsc::Receiver<RoomCommand>,
    sessions: Sessions,
    chat: VecDeque<ChatEntry>,
    actions: Vec<ActionRecord>,
    turn: Option<TurnTimer>,
    turn_timeout: Duration,
    closed: bool,
}

impl RoomActor {
    pub fn new(id: String, config: TableConfig, turn_timeout: Duration) -> (Self, RoomHandle) {
        let (sender, inbox) = mpsc::channel(ROOM_INBOX_CAPACITY);
        let handle = RoomHandle {
            sender,
            room_id: id.clone(),
        };
        let actor = Self {
            id,
            table: Table::new(config),
            inbox,
            sessions: Sessions::new(),
            chat: VecDeque::new(),
            actions: Vec::new(),
            turn: None,
            turn_timeout,
            closed: false,
        };
        (actor, handle)
    }

    /// Drive the room until it closes or empties. Suspends only on the
    /// inbox and on the armed action timer.
    pub async fn run(mut self) {
        log::info!("room {} '{}' open", self.id, self.table.config.name);

        loop {
            let deadline = self.turn.as_ref().map(|t| t.deadline);
            tokio::select! {
                command = self.inbox.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.handle_turn_timeout();
                }
            }
            if self.closed {
                break;
            }
        }

        // Late senders get a room_closed answer instead of a hang.
        self.inbox.close();
        while let Ok(command) = self.inbox.try_recv() {
            Self::reject_closed(command);
        }
        log::info!("room {} closed", self.id);
    }

    fn reject_closed(command: RoomCommand) {
        match command {
            RoomCommand::Join { respond, .. } => {
                let _ = respond.send(Err(ActionError::RoomClosed));
            }
            RoomCommand::GetSnapshot { respond, .. } => {
                let _ = respond.send(None);
            }
            RoomCommand::GetSummary { .. }
            | RoomCommand::Client { .. }
            | RoomCommand::Disconnected { .. }
            | RoomCommand::Shutdown => {}
        }
    }

    fn handle_command(&mut self, command: RoomCommand) {
        match command {
            RoomCommand::Join {
                player_id,
                name,
                conn,
                respond,
            } => {
                let rejoining = self.table.seat_of(&player_id).is_some();
                let result = self.table.add_player(&player_id, &name).map(|_| ());
                if result.is_ok() {
                    self.sessions.attach(&player_id, conn);
                }
                let accepted = result.is_ok();
                let _ = respond.send(result);
                if !accepted {
                    return;
                }
                if rejoining {
                    log::info!("room {}: {player_id} reconnected", self.id);
                    self.send_snapshot(&player_id);
                } else {
                    log::info!("room {}: {name} joined", self.id);
                    self.push_chat(ChatEntry::system(format!("{name} joined the room")));
                    self.broadcast_state();
                }
            }

            RoomCommand::Client { player_id, message } => match message {
                ClientMessage::StartGame => self.start_game(&player_id),
                ClientMessage::Fold => self.player_action(&player_id, Action::Fold),
                ClientMessage::Check => self.player_action(&player_id, Action::Check),
                ClientMessage::Call => self.player_action(&player_id, Action::Call),
                ClientMessage::Bet { amount } => {
                    self.player_action(&player_id, Action::Bet(amount));
                }
                ClientMessage::Raise { amount } => {
                    self.player_action(&player_id, Action::Raise(amount));
                }
                ClientMessage::AllIn => self.player_action(&player_id, Action::AllIn),
                ClientMessage::Chat { content } => self.chat_message(&player_id, content),
                ClientMessage::Leave => self.leave(&player_id),
            },

            RoomCommand::Disconnected { player_id } => {
                log::debug!("room {}: {player_id} disconnected", self.id);
                self.sessions.disconnect(&player_id);
            }

            RoomCommand::GetSnapshot { player_id, respond } => {
                let snapshot = self
                    .table
                    .seat_of(&player_id)
                    .map(|_| Box::new(self.build_snapshot(&player_id)));
                let _ = respond.send(snapshot);
            }

            RoomCommand::GetSummary { respond } => {
                let _ = respond.send(RoomSummary {
                    id: self.id.clone(),
                    name: self.table.config.name.clone(),
                    player_count: self.table.players.len(),
                    stage: self.table.stage().to_string(),
                    mode: self.table.config.betting_mode.to_string(),
                });
            }

            RoomCommand::Shutdown => {
                self.turn = None;
                self.sessions.broadcast(ServerMessage::RoomClosed);
                self.closed = true;
            }
        }
    }

    fn start_game(&mut self, player_id: &str) {
        if !self.table.is_owner(player_id) {
            self.send_error(player_id, &ActionError::NotRoomOwner);
            return;
        }
        match self.table.start_hand() {
            Ok(()) => {
                self.actions.clear();
                self.push_chat(ChatEntry::system("New hand dealt".to_string()));
                self.arm_timer();
                self.broadcast_state();
                // Blinds alone can settle the betting; run the board out.
                if let Some(progress) = self.table.advance_runout() {
                    self.handle_progress(progress);
                }
            }
            Err(err) => self.send_error(player_id, &err),
        }
    }

    fn player_action(&mut self, player_id: &str, action: Action) {
        match self.table.apply_action(player_id, action) {
            Ok((record, progress)) => {
                self.actions.push(record);
                if self.actions.len() > MAX_ACTION_HISTORY {
                    self.actions.remove(0);
                }
                self.handle_progress(progress);
            }
            Err(ActionError::ChipConservation) => self.fail_room(),
            Err(err) => self.send_error(player_id, &err),
        }
    }

    /// Broadcast every observable transition the hand just made. Each
    /// dealt street gets its own system chat line and snapshot, and an
    /// all-in run-out is stepped here so viewers watch the board fill
    /// in street by street instead of jumping to the final state.
    fn handle_progress(&mut self, mut progress: HandProgress) {
        loop {
            match progress {
                HandProgress::Finished(result) => {
                    self.turn = None;
                    self.announce_winners(&result);
                    self.broadcast_state();
                    return;
                }
                HandProgress::StreetAdvanced(stage) => {
                    self.push_chat(ChatEntry::system(format!("Dealing the {stage}")));
                    self.arm_timer();
                    self.broadcast_state();
                }
                HandProgress::Continue => {
                    self.arm_timer();
                    self.broadcast_state();
                }
            }
            match self.table.advance_runout() {
                Some(next) => progress = next,
                None => return,
            }
        }
    }

    fn chat_message(&mut self, player_id: &str, content: String) {
        let content: String = content.trim().chars().take(MAX_CHAT_LEN).collect();
        if content.is_empty() {
            return;
        }
        let Some(player) = self.table.player(player_id) else {
            return;
        };
        let name = player.name.clone();
        self.push_chat(ChatEntry::chat(&name, content));
    }

    fn leave(&mut self, player_id: &str) {
        let name = self
            .table
            .player(player_id)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        let Ok(outcome) = self.table.leave(player_id) else {
            return;
        };
        self.sessions.remove(player_id);
        log::info!("room {}: {name} left", self.id);

        if self.table.is_empty() {
            self.closed = true;
            return;
        }

        self.push_chat(ChatEntry::system(format!("{name} left the room")));
        match outcome.progress {
            Some(progress) => self.handle_progress(progress),
            None => self.broadcast_state(),
        }
    }

    /// Timer fired: fold the acting seat, or check when that is free.
    /// A key mismatch means the turn already passed; the fire is stale
    /// and ignored.
    fn handle_turn_timeout(&mut self) {
        let Some(timer) = self.turn.take() else {
            return;
        };
        if self.table.turn_key() != Some(timer.key) {
            log::debug!("room {}: stale action timer ignored", self.id);
            return;
        }
        let Some(seat) = self.table.acting_seat() else {
            return;
        };
        let player = &self.table.players[seat];
        let player_id = player.id.clone();
        let name = player.name.clone();
        let action = if self.table.to_call(seat) == 0 {
            Action::Check
        } else {
            Action::Fold
        };
        log::info!("room {}: {name} timed out, auto {action}", self.id);
        self.push_chat(ChatEntry::system(format!("{name} timed out")));
        self.player_action(&player_id, action);
    }

    /// Invariant violation: refund the hand, tell everyone, shut down.
    fn fail_room(&mut self) {
        log::error!("room {}: internal invariant violated, closing", self.id);
        self.turn = None;
        self.table.refund_contributions();
        self.sessions.broadcast(ServerMessage::RoomError {
            message: "internal error; the hand was cancelled and bets returned".to_string(),
        });
        self.closed = true;
    }

    fn announce_winners(&mut self, result: &HandResult) {
        for winner in &result.winners {
            let content = match &winner.hand_name {
                Some(hand_name) => {
                    format!("{} wins {} with {hand_name}", winner.name, winner.amount)
                }
                None => format!("{} takes the pot ({})", winner.name, winner.amount),
            };
            self.push_chat(ChatEntry::system(content));
        }
    }

    fn arm_timer(&mut self) {
        self.turn = self.table.turn_key().map(|key| TurnTimer {
            key,
            deadline: Instant::now() + self.turn_timeout,
        });
    }

    fn remaining_secs(&self) -> u64 {
        match &self.turn {
            Some(timer) => timer
                .deadline
                .saturating_duration_since(Instant::now())
                .as_secs(),
            None => self.turn_timeout.as_secs(),
        }
    }

    fn push_chat(&mut self, entry: ChatEntry) {
        self.chat.push_back(entry.clone());
        while self.chat.len() > MAX_CHAT_HISTORY {
            self.chat.pop_front();
        }
        self.sessions.broadcast(ServerMessage::Chat { data: entry });
    }

    fn build_snapshot(&self, viewer: &str) -> Snapshot {
        Snapshot::build(
            &self.id,
            &self.table,
            viewer,
            self.remaining_secs(),
            &self.actions,
        )
    }

    fn send_snapshot(&mut self, player_id: &str) {
        let snapshot = self.build_snapshot(player_id);
        self.sessions.send(
            player_id,
            ServerMessage::GameState {
                data: Box::new(snapshot),
            },
        );
    }

    fn send_error(&mut self, player_id: &str, err: &ActionError) {
        self.sessions.send(
            player_id,
            ServerMessage::Error {
                code: err.code().to_string(),
                message: err.to_string(),
            },
        );
    }

    /// Snapshots broadcast after action N are sent before any for action
    /// N+1: the actor builds and queues them all before touching the
    /// inbox again.
    fn broadcast_state(&mut self) {
        let remaining = self.remaining_secs();
        let Self {
            id,
            table,
            sessions,
            actions,
            ..
        } = self;
        sessions.broadcast_with(|viewer| {
            Some(ServerMessage::GameState {
                data: Box::new(Snapshot::build(id, table, viewer, remaining, actions)),
            })
        });
    }
}
