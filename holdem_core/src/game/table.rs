//! The table and hand state machine.
//!
//! A [`Table`] owns the seats, chip stacks, and dealer button, and drives
//! one [`Hand`] at a time from blind posting through showdown. Actions are
//! validated against the betting rules for the table's mode, applied as a
//! single mutation, and answered with a [`HandProgress`] describing what
//! the hand did next (nothing, a new street, or completion).

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

use super::betting::BettingMode;
use super::cards::{Card, Deck};
use super::constants::{
    BOARD_CARDS, DEFAULT_BIG_BLIND, DEFAULT_CHIPS, DEFAULT_SMALL_BLIND, HOLE_CARDS, MAX_PLAYERS,
    MIN_PLAYERS,
};
use super::eval::{HandValue, evaluate};
use super::pot::{build_pots, distribute};

/// Whole chips. Stacks, bets, and pots are all integral.
pub type Chips = u32;
/// Position in the table's seat list, clockwise.
pub type SeatIndex = usize;
/// Stable identifier a client presents; assigned outside the engine.
pub type PlayerId = String;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Waiting,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::Preflop => "preflop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Showdown => "showdown",
        };
        write!(f, "{repr}")
    }
}

/// Room-wide lifecycle, orthogonal to the hand's stage.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoomPhase {
    Lobby,
    InHand,
    BetweenHands,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Active,
    Folded,
    AllIn,
    SittingOut,
}

/// A player action routed into the betting engine. `Bet` and `Raise`
/// carry the increment above the table's current bet, never a total.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Fold,
    Check,
    Call,
    Bet(Chips),
    Raise(Chips),
    AllIn,
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fold => "fold",
            Self::Check => "check",
            Self::Call => "call",
            Self::Bet(_) => "bet",
            Self::Raise(_) => "raise",
            Self::AllIn => "all_in",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Fold => "folds".to_string(),
            Self::Check => "checks".to_string(),
            Self::Call => "calls".to_string(),
            Self::Bet(amount) => format!("bets {amount}"),
            Self::Raise(amount) => format!("raises {amount}"),
            Self::AllIn => "goes all-in".to_string(),
        };
        write!(f, "{repr}")
    }
}

/// One accepted action, as it appears in the hand's history.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ActionRecord {
    pub player: String,
    pub action: String,
    pub amount: Chips,
    pub stage: Stage,
}

/// Why an action was refused. `code` is the stable wire identifier sent
/// back to the offending client.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ActionError {
    #[error("not your turn")]
    OutOfTurn,
    #[error("no hand in progress")]
    NoHandInProgress,
    #[error("checking is unavailable; {to_call} to call")]
    CheckUnavailable { to_call: Chips },
    #[error("a bet already stands this street; raise instead")]
    BetNotAllowed,
    #[error("no bet to raise; bet instead")]
    NothingToRaise,
    #[error("bet must be at least {min}")]
    BetBelowMinimum { min: Chips },
    #[error("bet cannot exceed {max}")]
    BetAboveMaximum { max: Chips },
    #[error("raise must be at least {min}")]
    RaiseBelowMinimum { min: Chips },
    #[error("raise cannot exceed {max}")]
    RaiseAboveMaximum { max: Chips },
    #[error("the raise cap for this street has been reached")]
    RaiseCapReached,
    #[error("betting was not reopened; call, fold, or go all-in")]
    BettingNotReopened,
    #[error("no chips left to bet")]
    NoChips,
    #[error("only the room owner can start the game")]
    NotRoomOwner,
    #[error("need at least 2 players with chips to start")]
    NotEnoughPlayers,
    #[error("a hand is already in progress")]
    HandInProgress,
    #[error("the table is full")]
    TableFull,
    #[error("unknown player")]
    UnknownPlayer,
    #[error("the room is closed")]
    RoomClosed,
    #[error("chip accounting diverged; the hand cannot continue")]
    ChipConservation,
}

impl ActionError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::OutOfTurn => "out_of_turn",
            Self::NoHandInProgress => "no_hand",
            Self::CheckUnavailable { .. } => "check_unavailable",
            Self::BetNotAllowed => "bet_not_allowed",
            Self::NothingToRaise => "nothing_to_raise",
            Self::BetBelowMinimum { .. } => "bet_below_min",
            Self::BetAboveMaximum { .. } => "bet_above_max",
            Self::RaiseBelowMinimum { .. } => "raise_below_min",
            Self::RaiseAboveMaximum { .. } => "raise_above_max",
            Self::RaiseCapReached => "raise_cap",
            Self::BettingNotReopened => "not_reopened",
            Self::NoChips => "no_chips",
            Self::NotRoomOwner => "not_owner",
            Self::NotEnoughPlayers => "not_enough_players",
            Self::HandInProgress => "hand_in_progress",
            Self::TableFull => "table_full",
            Self::UnknownPlayer => "unknown_player",
            Self::RoomClosed => "room_closed",
            Self::ChipConservation => "internal",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub chips: Chips,
    pub hand: Vec<Card>,
    pub status: PlayerStatus,
    /// Chips committed in the current street.
    pub current_bet: Chips,
    /// Chips committed in the whole hand, antes included.
    pub total_contributed: Chips,
    pub has_acted: bool,
    /// Seat is removed once the current hand completes.
    pub leaving: bool,
}

impl Player {
    fn new(id: &str, name: &str, chips: Chips) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            chips,
            hand: Vec::with_capacity(HOLE_CARDS),
            status: PlayerStatus::SittingOut,
            current_bet: 0,
            total_contributed: 0,
            has_acted: false,
            leaving: false,
        }
    }

    pub fn can_act(&self) -> bool {
        self.status == PlayerStatus::Active
    }

    pub fn in_hand(&self) -> bool {
        matches!(self.status, PlayerStatus::Active | PlayerStatus::AllIn)
    }

    pub fn folded(&self) -> bool {
        self.status == PlayerStatus::Folded
    }

    fn reset_for_new_hand(&mut self) {
        self.hand.clear();
        self.current_bet = 0;
        self.total_contributed = 0;
        self.has_acted = false;
        self.status = if self.chips > 0 {
            PlayerStatus::Active
        } else {
            PlayerStatus::SittingOut
        };
    }

    fn reset_for_new_street(&mut self) {
        self.current_bet = 0;
        self.has_acted = false;
    }

    fn fold(&mut self) {
        self.status = PlayerStatus::Folded;
        self.has_acted = true;
    }

    /// Commit up to `amount` chips into the current street. Clamps to the
    /// stack and flips the seat to all-in when it empties.
    fn place_bet(&mut self, amount: Chips) -> Chips {
        let actual = amount.min(self.chips);
        self.chips -= actual;
        self.current_bet += actual;
        self.total_contributed += actual;
        if self.chips == 0 {
            self.status = PlayerStatus::AllIn;
        }
        actual
    }

    /// Antes feed the pot without counting toward the street's bet.
    fn post_ante(&mut self, amount: Chips) -> Chips {
        let actual = amount.min(self.chips);
        self.chips -= actual;
        self.total_contributed += actual;
        if self.chips == 0 {
            self.status = PlayerStatus::AllIn;
        }
        actual
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Winner {
    pub name: String,
    pub amount: Chips,
    pub hand_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HandResult {
    pub winners: Vec<Winner>,
    /// True when everyone else folded; hole cards stay hidden.
    pub uncontested: bool,
}

/// What the hand did in response to an accepted action.
#[derive(Clone, Debug, PartialEq)]
pub enum HandProgress {
    /// Action passed to the next seat.
    Continue,
    /// Betting closed; a new street was dealt.
    StreetAdvanced(Stage),
    /// The hand completed and the pots were paid out.
    Finished(HandResult),
}

#[derive(Debug)]
pub struct LeaveOutcome {
    pub removed_now: bool,
    pub progress: Option<HandProgress>,
}

/// One poker hand in progress.
#[derive(Debug)]
pub struct Hand {
    pub id: u64,
    pub stage: Stage,
    deck: Deck,
    pub community: Vec<Card>,
    pub current_bet: Chips,
    pub last_raise: Chips,
    pub raise_count: u32,
    pub acting: Option<SeatIndex>,
    pub aggressor: Option<SeatIndex>,
    pub sb_seat: SeatIndex,
    pub bb_seat: SeatIndex,
    /// Hole cards are revealed at a contested showdown only.
    pub revealed: bool,
    start_total: Chips,
    hole_dealt: usize,
}

#[derive(Clone, Debug)]
pub struct TableConfig {
    pub name: String,
    pub betting_mode: BettingMode,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub ante: Chips,
    pub buy_in: Chips,
    pub max_players: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "Hold'em".to_string(),
            betting_mode: BettingMode::default(),
            small_blind: DEFAULT_SMALL_BLIND,
            big_blind: DEFAULT_BIG_BLIND,
            ante: 0,
            buy_in: DEFAULT_CHIPS,
            max_players: MAX_PLAYERS,
        }
    }
}

#[derive(Debug)]
pub struct Table {
    pub config: TableConfig,
    pub players: Vec<Player>,
    pub owner: Option<PlayerId>,
    pub phase: RoomPhase,
    button: SeatIndex,
    hands_played: u64,
    hand: Option<Hand>,
    last_result: Option<HandResult>,
    action_index: u64,
}

impl Table {
    pub fn new(config: TableConfig) -> Self {
        Self {
            config,
            players: Vec::new(),
            owner: None,
            phase: RoomPhase::Lobby,
            button: 0,
            hands_played: 0,
            hand: None,
            last_result: None,
            action_index: 0,
        }
    }

    // ---- seats ----------------------------------------------------------

    /// Seat a player with the configured buy-in. Re-seating an existing
    /// id is a no-op so a reconnect never double-seats.
    pub fn add_player(&mut self, id: &str, name: &str) -> Result<SeatIndex, ActionError> {
        if let Some(seat) = self.seat_of(id) {
            return Ok(seat);
        }
        if self.players.len() >= self.config.max_players {
            return Err(ActionError::TableFull);
        }
        self.players.push(Player::new(id, name, self.config.buy_in));
        if self.owner.is_none() {
            self.owner = Some(id.to_string());
        }
        Ok(self.players.len() - 1)
    }

    pub fn seat_of(&self, id: &str) -> Option<SeatIndex> {
        self.players.iter().position(|p| p.id == id)
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn is_owner(&self, id: &str) -> bool {
        self.owner.as_deref() == Some(id)
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn can_start(&self) -> bool {
        self.phase != RoomPhase::InHand
            && self.players.iter().filter(|p| p.chips > 0).count() >= MIN_PLAYERS
    }

    /// Remove a seat, or fold it and defer removal when a hand is live.
    pub fn leave(&mut self, id: &str) -> Result<LeaveOutcome, ActionError> {
        let seat = self.seat_of(id).ok_or(ActionError::UnknownPlayer)?;

        if self.is_owner(id) {
            self.owner = self
                .players
                .iter()
                .find(|p| p.id != id && !p.leaving)
                .map(|p| p.id.clone());
        }

        if self.phase == RoomPhase::InHand && self.players[seat].in_hand() {
            let was_acting = self.hand.as_ref().and_then(|h| h.acting) == Some(seat);
            self.players[seat].fold();
            self.players[seat].leaving = true;

            let progress = if self.in_hand_count() == 1 {
                Some(self.finish_uncontested())
            } else if was_acting {
                Some(self.progress_after())
            } else {
                // A fold out of turn never completes the street: the
                // acting seat still owes a decision.
                Some(HandProgress::Continue)
            };
            return Ok(LeaveOutcome {
                removed_now: false,
                progress,
            });
        }

        if self.phase == RoomPhase::InHand {
            // Already folded or sitting out; keep the seat until the
            // hand completes so positions stay stable.
            self.players[seat].leaving = true;
            return Ok(LeaveOutcome {
                removed_now: false,
                progress: None,
            });
        }

        self.remove_seat(seat);
        Ok(LeaveOutcome {
            removed_now: true,
            progress: None,
        })
    }

    fn remove_seat(&mut self, seat: SeatIndex) {
        self.players.remove(seat);
        if self.players.is_empty() {
            self.button = 0;
        } else {
            if seat <= self.button && self.button > 0 {
                self.button -= 1;
            }
            self.button %= self.players.len();
        }
    }

    fn remove_leavers(&mut self) {
        while let Some(seat) = self.players.iter().position(|p| p.leaving) {
            self.remove_seat(seat);
        }
    }

    // ---- accessors ------------------------------------------------------

    pub fn stage(&self) -> Stage {
        self.hand.as_ref().map_or(Stage::Waiting, |h| h.stage)
    }

    pub fn hand(&self) -> Option<&Hand> {
        self.hand.as_ref()
    }

    pub fn button(&self) -> SeatIndex {
        self.button
    }

    pub fn acting_seat(&self) -> Option<SeatIndex> {
        if self.phase != RoomPhase::InHand {
            return None;
        }
        self.hand.as_ref().and_then(|h| h.acting)
    }

    pub fn acting_player(&self) -> Option<&Player> {
        self.acting_seat().map(|seat| &self.players[seat])
    }

    /// Identity of the current turn, for keying the action timer. A
    /// timer fire whose key no longer matches is stale and ignored.
    pub fn turn_key(&self) -> Option<(u64, u64)> {
        let hand = self.hand.as_ref()?;
        self.acting_seat().map(|_| (hand.id, self.action_index))
    }

    pub fn last_result(&self) -> Option<&HandResult> {
        self.last_result.as_ref()
    }

    pub fn pot_total(&self) -> Chips {
        self.players.iter().map(|p| p.total_contributed).sum()
    }

    /// Current pot layering: main pot first, then side pots.
    pub fn pots(&self) -> Vec<super::pot::Pot> {
        let contributions: Vec<(SeatIndex, Chips)> = self
            .players
            .iter()
            .enumerate()
            .map(|(seat, p)| (seat, p.total_contributed))
            .collect();
        let folded: HashSet<SeatIndex> = self
            .players
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.in_hand())
            .map(|(seat, _)| seat)
            .collect();
        build_pots(&contributions, &folded)
    }

    pub fn to_call(&self, seat: SeatIndex) -> Chips {
        let current = self.hand.as_ref().map_or(0, |h| h.current_bet);
        current.saturating_sub(self.players[seat].current_bet)
    }

    pub fn min_raise(&self) -> Chips {
        match &self.hand {
            Some(hand) => self.config.betting_mode.min_raise(
                self.config.big_blind,
                hand.stage,
                hand.last_raise,
            ),
            None => self.config.big_blind,
        }
    }

    pub fn max_raise_for(&self, seat: SeatIndex) -> Chips {
        let Some(hand) = &self.hand else { return 0 };
        if self.phase != RoomPhase::InHand {
            return 0;
        }
        let player = &self.players[seat];
        let to_call = self.to_call(seat);
        let pot = self.pot_total() - player.current_bet;
        self.config.betting_mode.max_raise(
            self.config.big_blind,
            hand.stage,
            to_call,
            pot,
            player.chips,
        )
    }

    pub fn can_raise_now(&self) -> bool {
        match &self.hand {
            Some(hand) if self.phase == RoomPhase::InHand => {
                self.config.betting_mode.can_raise(hand.raise_count)
            }
            _ => false,
        }
    }

    pub fn has_bet_this_street(&self) -> bool {
        self.hand.as_ref().is_some_and(|h| h.current_bet > 0)
    }

    fn in_hand_count(&self) -> usize {
        self.players.iter().filter(|p| p.in_hand()).count()
    }

    fn can_act_count(&self) -> usize {
        self.players.iter().filter(|p| p.can_act()).count()
    }

    fn next_can_act_after(&self, seat: SeatIndex) -> Option<SeatIndex> {
        let n = self.players.len();
        (1..=n)
            .map(|i| (seat + i) % n)
            .find(|&idx| self.players[idx].can_act())
    }

    fn next_active_after(&self, seat: SeatIndex) -> SeatIndex {
        let n = self.players.len();
        (1..=n)
            .map(|i| (seat + i) % n)
            .find(|&idx| self.players[idx].status == PlayerStatus::Active)
            .unwrap_or(seat)
    }

    // ---- hand lifecycle -------------------------------------------------

    /// Deal a new hand: rotate the button, collect antes then blinds,
    /// deal hole cards, and open preflop action left of the big blind.
    pub fn start_hand(&mut self) -> Result<(), ActionError> {
        if self.phase == RoomPhase::InHand {
            return Err(ActionError::HandInProgress);
        }
        if !self.can_start() {
            return Err(ActionError::NotEnoughPlayers);
        }

        self.last_result = None;
        for player in &mut self.players {
            player.reset_for_new_hand();
        }
        let start_total: Chips = self.players.iter().map(|p| p.chips).sum();

        // The button skips busted seats; it only moves once a hand has
        // actually been played at this table.
        if self.hands_played > 0 || self.players[self.button].status != PlayerStatus::Active {
            self.button = self.next_active_after(self.button);
        }

        let dealt = self.can_act_count();
        let sb_seat = if dealt == 2 {
            // Heads-up: the button posts the small blind.
            self.button
        } else {
            self.next_active_after(self.button)
        };
        let bb_seat = self.next_active_after(sb_seat);

        let mut deck = Deck::new_shuffled();
        for _ in 0..HOLE_CARDS {
            for player in &mut self.players {
                if player.status == PlayerStatus::Active {
                    player.hand.push(deck.deal());
                }
            }
        }

        if self.config.ante > 0 {
            let ante = self.config.ante;
            for player in &mut self.players {
                if player.in_hand() {
                    player.post_ante(ante);
                }
            }
        }
        let small_blind = self.config.small_blind;
        let big_blind = self.config.big_blind;
        self.players[sb_seat].place_bet(small_blind);
        self.players[bb_seat].place_bet(big_blind);

        self.phase = RoomPhase::InHand;
        self.action_index = 0;
        self.hand = Some(Hand {
            id: self.hands_played + 1,
            stage: Stage::Preflop,
            deck,
            community: Vec::with_capacity(BOARD_CARDS),
            current_bet: big_blind,
            // The big blind is the opening bet, so it seeds both the
            // minimum raise and the street's aggression count.
            last_raise: big_blind,
            raise_count: 1,
            acting: None,
            aggressor: None,
            sb_seat,
            bb_seat,
            revealed: false,
            start_total,
            hole_dealt: dealt,
        });
        let acting = self.next_can_act_after(bb_seat);
        if let Some(hand) = &mut self.hand {
            hand.acting = acting;
        }
        // Blinds can leave nobody free to act (all-in from the post);
        // the acting seat stays empty and the caller runs the board out
        // street by street with [`Table::advance_runout`].
        Ok(())
    }

    /// Validate and apply one action from `id`, then advance the hand.
    pub fn apply_action(
        &mut self,
        id: &str,
        action: Action,
    ) -> Result<(ActionRecord, HandProgress), ActionError> {
        let seat = self.seat_of(id).ok_or(ActionError::UnknownPlayer)?;
        if self.phase != RoomPhase::InHand || self.hand.is_none() {
            return Err(ActionError::NoHandInProgress);
        }
        if self.acting_seat() != Some(seat) {
            return Err(ActionError::OutOfTurn);
        }

        let stage = self.stage();
        let actual = self.apply_validated(seat, action)?;

        self.action_index += 1;
        let record = ActionRecord {
            player: self.players[seat].name.clone(),
            action: action.kind().to_string(),
            amount: actual,
            stage,
        };

        let progress = if self.in_hand_count() == 1 {
            self.finish_uncontested()
        } else {
            self.progress_after()
        };

        self.audit()?;
        Ok((record, progress))
    }

    /// The betting engine proper: bounds-check the action and mutate the
    /// acting seat. Returns the chips actually committed.
    fn apply_validated(&mut self, seat: SeatIndex, action: Action) -> Result<Chips, ActionError> {
        let mode = self.config.betting_mode;
        let big_blind = self.config.big_blind;
        let to_call = self.to_call(seat);
        let pot = self.pot_total() - self.players[seat].current_bet;
        let stage = self.stage();

        let Table { players, hand, .. } = self;
        let hand = hand.as_mut().expect("checked by caller");
        let stack = players[seat].chips;

        match action {
            Action::Fold => {
                players[seat].fold();
                Ok(0)
            }
            Action::Check => {
                if to_call > 0 {
                    return Err(ActionError::CheckUnavailable { to_call });
                }
                players[seat].has_acted = true;
                Ok(0)
            }
            Action::Call => {
                // Short stacks call for whatever they have left; calling
                // an unbet street is just a check.
                let actual = players[seat].place_bet(to_call);
                players[seat].has_acted = true;
                Ok(actual)
            }
            Action::Bet(amount) => {
                if hand.current_bet > 0 {
                    return Err(ActionError::BetNotAllowed);
                }
                if stack == 0 {
                    return Err(ActionError::NoChips);
                }
                let min = mode.min_bet(big_blind, stage);
                let max = mode.max_raise(big_blind, stage, 0, pot, stack);
                if amount > max {
                    return Err(ActionError::BetAboveMaximum { max });
                }
                if amount < min && amount < stack {
                    return Err(ActionError::BetBelowMinimum { min });
                }
                let actual = players[seat].place_bet(amount);
                players[seat].has_acted = true;
                hand.current_bet = players[seat].current_bet;
                hand.last_raise = actual;
                hand.raise_count += 1;
                hand.aggressor = Some(seat);
                Self::reopen_betting(players, seat);
                Ok(actual)
            }
            Action::Raise(amount) => {
                if hand.current_bet == 0 {
                    return Err(ActionError::NothingToRaise);
                }
                if !mode.can_raise(hand.raise_count) {
                    return Err(ActionError::RaiseCapReached);
                }
                if players[seat].has_acted {
                    // Only a full raise reopens the action; a seat that
                    // already matched may not raise again.
                    return Err(ActionError::BettingNotReopened);
                }
                let min = mode.min_raise(big_blind, stage, hand.last_raise);
                let max = mode.max_raise(big_blind, stage, to_call, pot, stack);
                if amount > max || max == 0 {
                    return Err(ActionError::RaiseAboveMaximum { max });
                }
                let all_in_short = to_call + amount >= stack;
                if amount < min && !all_in_short {
                    return Err(ActionError::RaiseBelowMinimum { min });
                }
                let actual = players[seat].place_bet(to_call + amount);
                players[seat].has_acted = true;
                let committed = players[seat].current_bet;
                if committed > hand.current_bet {
                    let increment = committed - hand.current_bet;
                    hand.current_bet = committed;
                    if increment >= min {
                        hand.last_raise = increment;
                        hand.raise_count += 1;
                        hand.aggressor = Some(seat);
                        Self::reopen_betting(players, seat);
                    }
                }
                Ok(actual)
            }
            Action::AllIn => {
                if stack == 0 {
                    return Err(ActionError::NoChips);
                }
                let min = mode.min_raise(big_blind, stage, hand.last_raise);
                let actual = players[seat].place_bet(stack);
                players[seat].has_acted = true;
                let committed = players[seat].current_bet;
                if committed > hand.current_bet {
                    let increment = committed - hand.current_bet;
                    hand.current_bet = committed;
                    // A short all-in raises the price without reopening
                    // the action for seats that already matched.
                    if increment >= min && mode.can_raise(hand.raise_count) {
                        hand.last_raise = increment;
                        hand.raise_count += 1;
                        hand.aggressor = Some(seat);
                        Self::reopen_betting(players, seat);
                    }
                }
                Ok(actual)
            }
        }
    }

    fn reopen_betting(players: &mut [Player], aggressor: SeatIndex) {
        for (idx, player) in players.iter_mut().enumerate() {
            if idx != aggressor && player.can_act() {
                player.has_acted = false;
            }
        }
    }

    fn betting_round_complete(&self) -> bool {
        let current_bet = self.hand.as_ref().map_or(0, |h| h.current_bet);
        self.players
            .iter()
            .filter(|p| p.can_act())
            .all(|p| p.has_acted && p.current_bet == current_bet)
    }

    /// Decide what the hand does after the acting seat's mutation: pass
    /// the action on, close the street, start a run-out, or show down.
    fn progress_after(&mut self) -> HandProgress {
        if !self.betting_round_complete() {
            let from = self
                .hand
                .as_ref()
                .and_then(|h| h.acting)
                .unwrap_or(self.button);
            let next = self.next_can_act_after(from);
            if let Some(hand) = &mut self.hand {
                hand.acting = next;
            }
            return HandProgress::Continue;
        }

        if self.stage() == Stage::River {
            return self.finish_showdown();
        }

        if self.can_act_count() <= 1 {
            // Betting is settled for the rest of the hand. Deal one
            // street at a time so every board card is an observable
            // transition; the caller steps to showdown with
            // [`Table::advance_runout`].
            self.advance_street();
            if let Some(hand) = &mut self.hand {
                hand.acting = None;
            }
            return HandProgress::StreetAdvanced(self.stage());
        }

        self.advance_street();
        HandProgress::StreetAdvanced(self.stage())
    }

    /// Step an all-in run-out: deal the next street, or show down once
    /// the river is out. Returns `None` while betting is still live (or
    /// no hand is running), so callers can loop it unconditionally after
    /// every accepted action.
    pub fn advance_runout(&mut self) -> Option<HandProgress> {
        if self.phase != RoomPhase::InHand || self.acting_seat().is_some() {
            return None;
        }
        if self.stage() == Stage::River {
            return Some(self.finish_showdown());
        }
        self.advance_street();
        if let Some(hand) = &mut self.hand {
            hand.acting = None;
        }
        Some(HandProgress::StreetAdvanced(self.stage()))
    }

    fn advance_street(&mut self) {
        for player in &mut self.players {
            player.reset_for_new_street();
        }
        let button = self.button;
        let acting = self.next_can_act_after(button);
        let hand = self.hand.as_mut().expect("hand in progress");
        hand.current_bet = 0;
        hand.last_raise = 0;
        hand.raise_count = 0;
        hand.acting = acting;

        hand.stage = match hand.stage {
            Stage::Preflop => {
                hand.deck.burn();
                for _ in 0..3 {
                    hand.community.push(hand.deck.deal());
                }
                Stage::Flop
            }
            Stage::Flop => {
                hand.deck.burn();
                hand.community.push(hand.deck.deal());
                Stage::Turn
            }
            Stage::Turn => {
                hand.deck.burn();
                hand.community.push(hand.deck.deal());
                Stage::River
            }
            other => other,
        };
    }

    fn finish_showdown(&mut self) -> HandProgress {
        let pots = self.pots();
        let hand = self.hand.as_mut().expect("hand in progress");
        hand.stage = Stage::Showdown;
        hand.acting = None;
        hand.revealed = true;
        let community = hand.community.clone();

        let mut hands: HashMap<SeatIndex, HandValue> = HashMap::new();
        for (seat, player) in self.players.iter().enumerate() {
            if player.in_hand() {
                let mut cards = player.hand.clone();
                cards.extend_from_slice(&community);
                hands.insert(seat, evaluate(&cards));
            }
        }

        let winnings = distribute(&pots, &hands, self.button, self.players.len());

        let mut winners: Vec<Winner> = Vec::new();
        for (seat, player) in self.players.iter_mut().enumerate() {
            if let Some(&amount) = winnings.get(&seat) {
                player.chips += amount;
                winners.push(Winner {
                    name: player.name.clone(),
                    amount,
                    hand_name: hands.get(&seat).map(|h| h.rank.label().to_string()),
                });
            }
        }

        let result = HandResult {
            winners,
            uncontested: false,
        };
        self.complete_hand(result.clone());
        HandProgress::Finished(result)
    }

    fn finish_uncontested(&mut self) -> HandProgress {
        let pot = self.pot_total();
        let seat = self
            .players
            .iter()
            .position(|p| p.in_hand())
            .expect("one seat remains");
        if let Some(hand) = &mut self.hand {
            hand.stage = Stage::Showdown;
            hand.acting = None;
            hand.revealed = false;
        }
        let player = &mut self.players[seat];
        player.chips += pot;
        let result = HandResult {
            winners: vec![Winner {
                name: player.name.clone(),
                amount: pot,
                hand_name: None,
            }],
            uncontested: true,
        };
        self.complete_hand(result.clone());
        HandProgress::Finished(result)
    }

    fn complete_hand(&mut self, result: HandResult) {
        for player in &mut self.players {
            player.current_bet = 0;
            player.total_contributed = 0;
        }
        self.last_result = Some(result);
        self.phase = RoomPhase::BetweenHands;
        self.hands_played += 1;
        self.remove_leavers();
    }

    /// Fatal-path recovery: hand back everything each seat put into the
    /// current hand.
    pub fn refund_contributions(&mut self) {
        for player in &mut self.players {
            player.chips += player.total_contributed;
            player.total_contributed = 0;
            player.current_bet = 0;
        }
        self.phase = RoomPhase::BetweenHands;
        self.hand = None;
    }

    /// Chip- and deck-conservation audit, run after every mutation while
    /// the hand is live. Once a hand completes, leaving seats take their
    /// stacks with them, so the table total is no longer comparable.
    fn audit(&self) -> Result<(), ActionError> {
        if self.phase != RoomPhase::InHand {
            return Ok(());
        }
        let Some(hand) = &self.hand else {
            return Ok(());
        };
        let chips: Chips = self.players.iter().map(|p| p.chips).sum();
        let contributed: Chips = self.players.iter().map(|p| p.total_contributed).sum();
        if chips + contributed != hand.start_total {
            log::error!(
                "chip conservation violated: {chips} + {contributed} != {}",
                hand.start_total
            );
            return Err(ActionError::ChipConservation);
        }
        let burns = match hand.community.len() {
            0 => 0,
            3 => 1,
            4 => 2,
            5 => 3,
            _ => return Err(ActionError::ChipConservation),
        };
        let expected = hand.hole_dealt * HOLE_CARDS + hand.community.len() + burns;
        if hand.deck.dealt() != expected {
            log::error!(
                "deck corrupted: dealt {} expected {expected}",
                hand.deck.dealt()
            );
            return Err(ActionError::ChipConservation);
        }
        Ok(())
    }
}
