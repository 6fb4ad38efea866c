//! Pot layering and distribution.
//!
//! Contributions are flattened into a main pot plus side pots at each
//! distinct all-in level. Folded seats pay into pot amounts but are never
//! eligible to win them.

use std::collections::{HashMap, HashSet};

use super::eval::HandValue;
use super::table::{Chips, SeatIndex};

/// One pot: an amount and the seats allowed to contest it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pot {
    pub amount: Chips,
    pub eligible: Vec<SeatIndex>,
}

/// Layer per-seat hand contributions into an ordered pot list.
///
/// Each distinct contribution level caps one layer: the layer's amount is
/// `(level - previous_level) x seats_at_or_above`, and its eligibility is
/// the non-folded seats contributing at least the level. Adjacent layers
/// with identical eligibility are collapsed. A top layer owned only by
/// folded seats has nobody to contest it, so its chips merge into the pot
/// below.
pub fn build_pots(contributions: &[(SeatIndex, Chips)], folded: &HashSet<SeatIndex>) -> Vec<Pot> {
    let entries: Vec<(SeatIndex, Chips)> = contributions
        .iter()
        .copied()
        .filter(|&(_, chips)| chips > 0)
        .collect();
    if entries.is_empty() {
        return Vec::new();
    }

    let mut levels: Vec<Chips> = entries.iter().map(|&(_, chips)| chips).collect();
    levels.sort_unstable();
    levels.dedup();

    let mut pots: Vec<Pot> = Vec::new();
    let mut prev_level = 0;
    for level in levels {
        let at_or_above = entries.iter().filter(|&&(_, c)| c >= level).count() as Chips;
        let amount = (level - prev_level) * at_or_above;
        prev_level = level;

        let mut eligible: Vec<SeatIndex> = entries
            .iter()
            .filter(|&&(seat, c)| c >= level && !folded.contains(&seat))
            .map(|&(seat, _)| seat)
            .collect();
        eligible.sort_unstable();

        match pots.last_mut() {
            Some(last) if last.eligible == eligible || eligible.is_empty() => {
                last.amount += amount;
            }
            _ => pots.push(Pot { amount, eligible }),
        }
    }
    pots
}

/// Award every pot to the best eligible hand(s) and return per-seat
/// winnings. Split pots divide evenly; odd chips go to the winner seated
/// closest clockwise from the dealer button.
pub fn distribute(
    pots: &[Pot],
    hands: &HashMap<SeatIndex, HandValue>,
    button: SeatIndex,
    num_seats: usize,
) -> HashMap<SeatIndex, Chips> {
    let mut winnings: HashMap<SeatIndex, Chips> = HashMap::new();

    for pot in pots {
        let best = pot
            .eligible
            .iter()
            .filter_map(|seat| hands.get(seat))
            .max()
            .cloned();
        let Some(best) = best else { continue };

        let mut winners: Vec<SeatIndex> = pot
            .eligible
            .iter()
            .copied()
            .filter(|seat| hands.get(seat) == Some(&best))
            .collect();

        let share = pot.amount / winners.len() as Chips;
        let remainder = pot.amount % winners.len() as Chips;
        // First winner clockwise from the button takes the odd chips.
        winners.sort_unstable_by_key(|&seat| (seat + num_seats - button - 1) % num_seats);

        for (i, seat) in winners.iter().enumerate() {
            let extra = if i == 0 { remainder } else { 0 };
            *winnings.entry(*seat).or_default() += share + extra;
        }
    }

    winnings
}
