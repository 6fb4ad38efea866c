//! Hand evaluation: rank any 5 to 7 distinct cards and produce a value
//! that totally orders poker hands.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::cards::{Card, Value, VALUE_ACE};

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum HandRank {
    HighCard,
    Pair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

impl HandRank {
    pub fn label(self) -> &'static str {
        match self {
            Self::HighCard => "High Card",
            Self::Pair => "Pair",
            Self::TwoPair => "Two Pair",
            Self::ThreeOfAKind => "Three of a Kind",
            Self::Straight => "Straight",
            Self::Flush => "Flush",
            Self::FullHouse => "Full House",
            Self::FourOfAKind => "Four of a Kind",
            Self::StraightFlush => "Straight Flush",
            Self::RoyalFlush => "Royal Flush",
        }
    }
}

impl fmt::Display for HandRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Comparable hand strength: category first, then kickers in descending
/// significance. The derived ordering compares kicker vectors
/// lexicographically, which is exactly the poker tie-break rule; two
/// values are equal iff every component matches.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct HandValue {
    pub rank: HandRank,
    pub kickers: Vec<Value>,
}

/// Evaluate the best 5-card hand available from 5 to 7 distinct cards.
///
/// Pure and deterministic; the result is independent of input order.
pub fn evaluate(cards: &[Card]) -> HandValue {
    assert!(
        (5..=7).contains(&cards.len()),
        "evaluate expects 5 to 7 cards, got {}",
        cards.len()
    );

    if cards.len() == 5 {
        let five = [cards[0], cards[1], cards[2], cards[3], cards[4]];
        return evaluate_five(&five);
    }

    let n = cards.len();
    let mut best: Option<HandValue> = None;
    for a in 0..(n - 4) {
        for b in (a + 1)..(n - 3) {
            for c in (b + 1)..(n - 2) {
                for d in (c + 1)..(n - 1) {
                    for e in (d + 1)..n {
                        let five = [cards[a], cards[b], cards[c], cards[d], cards[e]];
                        let value = evaluate_five(&five);
                        if best.as_ref().map_or(true, |b| value > *b) {
                            best = Some(value);
                        }
                    }
                }
            }
        }
    }
    best.expect("at least one 5-card combination")
}

fn evaluate_five(cards: &[Card; 5]) -> HandValue {
    let mut values: Vec<Value> = cards.iter().map(|c| c.0).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));

    let is_flush = cards.iter().all(|c| c.1 == cards[0].1);

    // Straight detection over the sorted distinct values, with the
    // wheel (A-2-3-4-5) counting the ace as 1.
    let mut straight_high: Option<Value> = None;
    let distinct = values.windows(2).all(|w| w[0] != w[1]);
    if distinct {
        if values[0] - values[4] == 4 {
            straight_high = Some(values[0]);
        } else if values == [VALUE_ACE, 5, 4, 3, 2] {
            straight_high = Some(5);
        }
    }

    // (count, value) pairs, highest count first, then highest value.
    let mut counts = [0u8; 15];
    for &v in &values {
        counts[v as usize] += 1;
    }
    let mut groups: Vec<(u8, Value)> = (2..=14)
        .filter(|&v| counts[v as usize] > 0)
        .map(|v| (counts[v as usize], v))
        .collect();
    groups.sort_unstable_by(|a, b| b.cmp(a));
    let pattern: Vec<u8> = groups.iter().map(|&(count, _)| count).collect();

    if let Some(high) = straight_high {
        if is_flush {
            let rank = if high == VALUE_ACE {
                HandRank::RoyalFlush
            } else {
                HandRank::StraightFlush
            };
            return HandValue {
                rank,
                kickers: vec![high],
            };
        }
    }

    if pattern == [4, 1] {
        return HandValue {
            rank: HandRank::FourOfAKind,
            kickers: vec![groups[0].1, groups[1].1],
        };
    }

    if pattern == [3, 2] {
        return HandValue {
            rank: HandRank::FullHouse,
            kickers: vec![groups[0].1, groups[1].1],
        };
    }

    if is_flush {
        return HandValue {
            rank: HandRank::Flush,
            kickers: values,
        };
    }

    if let Some(high) = straight_high {
        return HandValue {
            rank: HandRank::Straight,
            kickers: vec![high],
        };
    }

    if pattern == [3, 1, 1] {
        return HandValue {
            rank: HandRank::ThreeOfAKind,
            kickers: vec![groups[0].1, groups[1].1, groups[2].1],
        };
    }

    if pattern == [2, 2, 1] {
        return HandValue {
            rank: HandRank::TwoPair,
            kickers: vec![groups[0].1, groups[1].1, groups[2].1],
        };
    }

    if pattern == [2, 1, 1, 1] {
        return HandValue {
            rank: HandRank::Pair,
            kickers: vec![groups[0].1, groups[1].1, groups[2].1, groups[3].1],
        };
    }

    HandValue {
        rank: HandRank::HighCard,
        kickers: values,
    }
}
