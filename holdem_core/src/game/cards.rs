use rand::{seq::SliceRandom, thread_rng};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Club, Suit::Spade, Suit::Diamond, Suit::Heart];

    /// Rendering colour used by the front end.
    pub fn color(self) -> &'static str {
        match self {
            Self::Heart | Self::Diamond => "red",
            Self::Club | Self::Spade => "black",
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
        };
        write!(f, "{repr}")
    }
}

/// Card value. Deuce is 2, ace is 14. The ace also plays low in the
/// wheel straight, which the evaluator handles itself.
pub type Value = u8;

pub const VALUE_MIN: Value = 2;
pub const VALUE_ACE: Value = 14;

/// A card is a tuple of a value (2..=14) and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl Card {
    pub fn value_label(value: Value) -> String {
        match value {
            14 => "A".to_string(),
            13 => "K".to_string(),
            12 => "Q".to_string(),
            11 => "J".to_string(),
            v => v.to_string(),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", Self::value_label(self.0), self.1)
    }
}

/// A standard 52-card deck. Dealing walks an index across a shuffled
/// array rather than popping, so the full deck is retained for audits.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: [Card; 52],
    deck_idx: usize,
}

impl Deck {
    pub fn new_shuffled() -> Self {
        let mut deck = Self::default();
        deck.shuffle();
        deck
    }

    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut thread_rng());
        self.deck_idx = 0;
    }

    pub fn deal(&mut self) -> Card {
        let card = self.cards[self.deck_idx];
        self.deck_idx += 1;
        card
    }

    /// Discard the top card before dealing a street.
    pub fn burn(&mut self) {
        self.deck_idx += 1;
    }

    pub fn remaining(&self) -> usize {
        52 - self.deck_idx
    }

    pub fn dealt(&self) -> usize {
        self.deck_idx
    }
}

impl Default for Deck {
    fn default() -> Self {
        let mut cards = [Card(VALUE_MIN, Suit::Club); 52];
        for (i, value) in (VALUE_MIN..=VALUE_ACE).enumerate() {
            for (j, suit) in Suit::ALL.into_iter().enumerate() {
                cards[4 * i + j] = Card(value, suit);
            }
        }
        Self { cards, deck_idx: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn deck_has_52_distinct_cards() {
        let mut deck = Deck::default();
        let mut seen = HashSet::new();
        for _ in 0..52 {
            seen.insert(deck.deal());
        }
        assert_eq!(seen.len(), 52);
        assert_eq!(deck.remaining(), 0);
    }

    #[test]
    fn shuffle_resets_index() {
        let mut deck = Deck::new_shuffled();
        deck.deal();
        deck.burn();
        assert_eq!(deck.dealt(), 2);
        deck.shuffle();
        assert_eq!(deck.dealt(), 0);
        assert_eq!(deck.remaining(), 52);
    }

    #[test]
    fn dealt_plus_remaining_is_52() {
        let mut deck = Deck::new_shuffled();
        for _ in 0..7 {
            deck.deal();
        }
        assert_eq!(deck.dealt() + deck.remaining(), 52);
    }

    #[test]
    fn card_display_face_cards() {
        assert_eq!(Card(14, Suit::Spade).to_string(), "A♠");
        assert_eq!(Card(13, Suit::Heart).to_string(), "K♥");
        assert_eq!(Card(12, Suit::Diamond).to_string(), "Q♦");
        assert_eq!(Card(11, Suit::Club).to_string(), "J♣");
        assert_eq!(Card(10, Suit::Spade).to_string(), "10♠");
    }

    #[test]
    fn suit_colors() {
        assert_eq!(Suit::Heart.color(), "red");
        assert_eq!(Suit::Diamond.color(), "red");
        assert_eq!(Suit::Spade.color(), "black");
        assert_eq!(Suit::Club.color(), "black");
    }
}
