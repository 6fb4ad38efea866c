//! Per-mode betting bounds.
//!
//! Limit plays fixed increments (small bet preflop/flop, big bet on
//! turn/river) with a four-aggression cap per street. No-Limit and
//! Pot-Limit share the `max(big blind, last raise)` minimum; they differ
//! only in the ceiling.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::table::{Chips, Stage};

/// Aggressive actions (the opening bet plus raises) allowed per street
/// in Limit mode. Preflop the big blind counts as the opener.
const LIMIT_RAISE_CAP: u32 = 4;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BettingMode {
    Limit,
    #[default]
    NoLimit,
    PotLimit,
}

impl BettingMode {
    /// Fixed Limit increment for the street: the big blind through the
    /// flop, twice that on turn and river.
    fn limit_increment(big_blind: Chips, stage: Stage) -> Chips {
        match stage {
            Stage::Turn | Stage::River => big_blind * 2,
            _ => big_blind,
        }
    }

    /// Whether another bet/raise is accepted this street.
    pub fn can_raise(self, raise_count: u32) -> bool {
        match self {
            Self::Limit => raise_count < LIMIT_RAISE_CAP,
            Self::NoLimit | Self::PotLimit => true,
        }
    }

    /// Smallest legal opening bet.
    pub fn min_bet(self, big_blind: Chips, stage: Stage) -> Chips {
        match self {
            Self::Limit => Self::limit_increment(big_blind, stage),
            Self::NoLimit | Self::PotLimit => big_blind,
        }
    }

    /// Smallest legal raise increment given the last raise size.
    pub fn min_raise(self, big_blind: Chips, stage: Stage, last_raise: Chips) -> Chips {
        match self {
            Self::Limit => Self::limit_increment(big_blind, stage),
            Self::NoLimit | Self::PotLimit => last_raise.max(big_blind),
        }
    }

    /// Largest legal raise increment for a seat holding `stack` chips
    /// that owes `to_call`. `pot` is everything already in the middle —
    /// prior streets plus outstanding bets — excluding the seat's own
    /// current-street bet. Zero means no raise is possible.
    pub fn max_raise(
        self,
        big_blind: Chips,
        stage: Stage,
        to_call: Chips,
        pot: Chips,
        stack: Chips,
    ) -> Chips {
        let available = stack.saturating_sub(to_call);
        match self {
            Self::Limit => Self::limit_increment(big_blind, stage).min(available),
            Self::NoLimit => available,
            // Raising the pot: call first, then raise by at most the
            // pot as it stands after the call.
            Self::PotLimit => (pot + to_call).min(available),
        }
    }
}

impl fmt::Display for BettingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Limit => "limit",
            Self::NoLimit => "no_limit",
            Self::PotLimit => "pot_limit",
        };
        write!(f, "{repr}")
    }
}

impl FromStr for BettingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "limit" => Ok(Self::Limit),
            "no_limit" => Ok(Self::NoLimit),
            "pot_limit" => Ok(Self::PotLimit),
            other => Err(format!("unknown betting mode: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_increments_double_after_flop() {
        assert_eq!(BettingMode::Limit.min_bet(20, Stage::Preflop), 20);
        assert_eq!(BettingMode::Limit.min_bet(20, Stage::Flop), 20);
        assert_eq!(BettingMode::Limit.min_bet(20, Stage::Turn), 40);
        assert_eq!(BettingMode::Limit.min_bet(20, Stage::River), 40);
    }

    #[test]
    fn limit_caps_at_four_aggressions() {
        assert!(BettingMode::Limit.can_raise(3));
        assert!(!BettingMode::Limit.can_raise(4));
        assert!(BettingMode::NoLimit.can_raise(100));
        assert!(BettingMode::PotLimit.can_raise(100));
    }

    #[test]
    fn limit_min_equals_max() {
        let min = BettingMode::Limit.min_raise(20, Stage::Flop, 20);
        let max = BettingMode::Limit.max_raise(20, Stage::Flop, 0, 200, 1000);
        assert_eq!(min, max);
    }

    #[test]
    fn no_limit_min_raise_tracks_last_raise() {
        assert_eq!(BettingMode::NoLimit.min_raise(20, Stage::Flop, 0), 20);
        assert_eq!(BettingMode::NoLimit.min_raise(20, Stage::Flop, 150), 150);
        assert_eq!(BettingMode::NoLimit.max_raise(20, Stage::Flop, 30, 500, 200), 170);
    }

    #[test]
    fn pot_limit_max_is_pot_after_call() {
        // Pot 100 with an outstanding bet of 20, hero owes 10: the raise
        // may be at most 100 + 20 + 10 = 130 on top of the call.
        assert_eq!(
            BettingMode::PotLimit.max_raise(20, Stage::Flop, 10, 120, 1000),
            130
        );
        // Bounded by stack.
        assert_eq!(
            BettingMode::PotLimit.max_raise(20, Stage::Flop, 10, 120, 50),
            40
        );
    }

    #[test]
    fn mode_round_trips_through_str() {
        for mode in [BettingMode::Limit, BettingMode::NoLimit, BettingMode::PotLimit] {
            assert_eq!(mode.to_string().parse::<BettingMode>().unwrap(), mode);
        }
    }
}
