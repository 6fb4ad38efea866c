//! JSON wire protocol.
//!
//! Clients send one JSON object per frame tagged by `action`; the server
//! answers with objects tagged by `type`. Snapshots are personalised per
//! viewer: everyone sees public seat data, only the viewer (and a
//! contested showdown) sees hole cards.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::game::{
    BettingMode,
    cards::Card,
    constants::SNAPSHOT_ACTION_HISTORY,
    table::{ActionRecord, Chips, PlayerStatus, RoomPhase, Stage, Table, Winner},
};

/// Client → server commands.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    StartGame,
    Fold,
    Check,
    Call,
    Bet { amount: Chips },
    Raise { amount: Chips },
    AllIn,
    Chat { content: String },
    Leave,
}

/// Server → client frames.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    GameState { data: Box<Snapshot> },
    Chat { data: ChatEntry },
    Error { code: String, message: String },
    RoomError { message: String },
    RoomClosed,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ChatEntry {
    pub player_name: String,
    pub content: String,
    pub msg_type: String,
    pub timestamp: i64,
}

impl ChatEntry {
    pub fn chat(player_name: &str, content: String) -> Self {
        Self {
            player_name: player_name.to_string(),
            content,
            msg_type: "chat".to_string(),
            timestamp: Utc::now().timestamp(),
        }
    }

    pub fn system(content: String) -> Self {
        Self {
            player_name: "system".to_string(),
            content,
            msg_type: "system".to_string(),
            timestamp: Utc::now().timestamp(),
        }
    }
}

/// A card as the front end renders it, or a face-down marker.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CardView {
    Up {
        rank: String,
        suit: String,
        color: String,
    },
    Hidden {
        hidden: bool,
    },
}

impl CardView {
    pub fn hidden() -> Self {
        Self::Hidden { hidden: true }
    }
}

impl From<Card> for CardView {
    fn from(card: Card) -> Self {
        Self::Up {
            rank: Card::value_label(card.0),
            suit: card.1.to_string(),
            color: card.1.color().to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SidePotView {
    pub amount: Chips,
    pub players: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerView {
    pub name: String,
    pub chips: Chips,
    pub current_bet: Chips,
    pub is_dealer: bool,
    pub is_sb: bool,
    pub is_bb: bool,
    pub is_self: bool,
    pub is_current: bool,
    pub folded: bool,
    pub all_in: bool,
    pub hand: Vec<CardView>,
}

/// A complete, viewer-personalised description of room state, sent after
/// every accepted action or stage change.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Snapshot {
    pub room_id: String,
    pub room_name: String,
    pub stage: Stage,
    pub betting_mode: BettingMode,
    pub community_cards: Vec<CardView>,
    pub main_pot: Chips,
    pub side_pots: Vec<SidePotView>,
    pub current_bet: Chips,
    pub to_call: Chips,
    pub min_raise: Chips,
    pub max_raise: Chips,
    pub can_raise: bool,
    pub has_bet_this_round: bool,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub ante: Chips,
    pub players: Vec<PlayerView>,
    pub is_my_turn: bool,
    pub is_room_owner: bool,
    pub can_start: bool,
    pub remaining_time: u64,
    pub action_history: Vec<ActionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winners: Option<Vec<Winner>>,
}

impl Snapshot {
    /// Derive `viewer`'s view of the table. Hole cards other than the
    /// viewer's own are replaced with a hidden marker unless the hand
    /// reached a contested showdown and the holder never folded.
    pub fn build(
        room_id: &str,
        table: &Table,
        viewer: &str,
        remaining_time: u64,
        history: &[ActionRecord],
    ) -> Self {
        let viewer_seat = table.seat_of(viewer);
        let stage = table.stage();
        let acting = table.acting_seat();
        let revealed = stage == Stage::Showdown && table.hand().is_some_and(|h| h.revealed);
        let (sb_seat, bb_seat) = match table.hand() {
            Some(hand) => (Some(hand.sb_seat), Some(hand.bb_seat)),
            None => (None, None),
        };

        let players = table
            .players
            .iter()
            .enumerate()
            .map(|(seat, p)| {
                let is_self = viewer_seat == Some(seat);
                let hand = if p.hand.is_empty() {
                    Vec::new()
                } else if is_self || (revealed && p.in_hand()) {
                    p.hand.iter().map(|&c| CardView::from(c)).collect()
                } else if p.folded() {
                    Vec::new()
                } else {
                    vec![CardView::hidden(); p.hand.len()]
                };
                PlayerView {
                    name: p.name.clone(),
                    chips: p.chips,
                    current_bet: p.current_bet,
                    is_dealer: seat == table.button(),
                    is_sb: sb_seat == Some(seat),
                    is_bb: bb_seat == Some(seat),
                    is_self,
                    is_current: acting == Some(seat),
                    folded: p.folded(),
                    all_in: p.status == PlayerStatus::AllIn,
                    hand,
                }
            })
            .collect();

        let pots = table.pots();
        let main_pot = pots.first().map_or(0, |p| p.amount);
        let side_pots = pots
            .iter()
            .skip(1)
            .map(|pot| SidePotView {
                amount: pot.amount,
                players: pot
                    .eligible
                    .iter()
                    .map(|&seat| table.players[seat].name.clone())
                    .collect(),
            })
            .collect();

        let in_turn = viewer_seat.is_some() && viewer_seat == acting;
        let (to_call, max_raise) = match viewer_seat {
            Some(seat) if table.phase == RoomPhase::InHand => {
                (table.to_call(seat), table.max_raise_for(seat))
            }
            _ => (0, 0),
        };

        let history_start = history.len().saturating_sub(SNAPSHOT_ACTION_HISTORY);
        Self {
            room_id: room_id.to_string(),
            room_name: table.config.name.clone(),
            stage,
            betting_mode: table.config.betting_mode,
            community_cards: table
                .hand()
                .map(|h| h.community.iter().map(|&c| CardView::from(c)).collect())
                .unwrap_or_default(),
            main_pot,
            side_pots,
            current_bet: table.hand().map_or(0, |h| h.current_bet),
            to_call,
            min_raise: table.min_raise(),
            max_raise,
            can_raise: table.can_raise_now(),
            has_bet_this_round: table.has_bet_this_street(),
            small_blind: table.config.small_blind,
            big_blind: table.config.big_blind,
            ante: table.config.ante,
            players,
            is_my_turn: in_turn,
            is_room_owner: table.is_owner(viewer),
            can_start: table.can_start(),
            remaining_time,
            action_history: history[history_start..].to_vec(),
            winners: table.last_result().map(|r| r.winners.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::cards::Suit;

    #[test]
    fn client_messages_parse_from_wire_json() {
        let raise: ClientMessage =
            serde_json::from_str(r#"{"action": "raise", "amount": 40}"#).unwrap();
        assert_eq!(raise, ClientMessage::Raise { amount: 40 });

        let fold: ClientMessage = serde_json::from_str(r#"{"action": "fold"}"#).unwrap();
        assert_eq!(fold, ClientMessage::Fold);

        let chat: ClientMessage =
            serde_json::from_str(r#"{"action": "chat", "content": "hi"}"#).unwrap();
        assert_eq!(
            chat,
            ClientMessage::Chat {
                content: "hi".to_string()
            }
        );

        assert!(serde_json::from_str::<ClientMessage>(r#"{"action": "steal_pot"}"#).is_err());
    }

    #[test]
    fn card_view_wire_shape() {
        let up = CardView::from(Card(14, Suit::Heart));
        let json = serde_json::to_value(&up).unwrap();
        assert_eq!(json["rank"], "A");
        assert_eq!(json["suit"], "♥");
        assert_eq!(json["color"], "red");

        let hidden = serde_json::to_value(CardView::hidden()).unwrap();
        assert_eq!(hidden["hidden"], true);
    }

    #[test]
    fn server_error_is_tagged() {
        let msg = ServerMessage::Error {
            code: "out_of_turn".to_string(),
            message: "not your turn".to_string(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], "out_of_turn");
    }
}
