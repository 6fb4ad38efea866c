//! Full-hand scenarios driven through the public table API.

use holdem_core::game::{
    Action, ActionError, BettingMode, Chips, HandProgress, RoomPhase, Stage, Table, TableConfig,
};

fn table(mode: BettingMode, small_blind: Chips, big_blind: Chips, stacks: &[Chips]) -> Table {
    let mut table = Table::new(TableConfig {
        betting_mode: mode,
        small_blind,
        big_blind,
        ..TableConfig::default()
    });
    for (i, &stack) in stacks.iter().enumerate() {
        let id = format!("p{i}");
        table.add_player(&id, &format!("player{i}")).unwrap();
        table.players[i].chips = stack;
    }
    table
}

fn total_chips(table: &Table) -> Chips {
    table.players.iter().map(|p| p.chips).sum::<Chips>() + table.pot_total()
}

fn act(table: &mut Table, id: &str, action: Action) -> HandProgress {
    let (_, progress) = table.apply_action(id, action).unwrap();
    progress
}

#[test]
fn uncontested_fold_pays_the_big_blind() {
    // Seats: p0 button, p1 small blind, p2 big blind, blinds 10/20.
    let mut t = table(BettingMode::NoLimit, 10, 20, &[1000, 1000, 1000]);
    t.start_hand().unwrap();

    act(&mut t, "p0", Action::Fold);
    let progress = act(&mut t, "p1", Action::Fold);
    let HandProgress::Finished(result) = progress else {
        panic!("hand should have ended");
    };
    assert!(result.uncontested);

    assert_eq!(t.player("p0").unwrap().chips, 1000);
    assert_eq!(t.player("p1").unwrap().chips, 990);
    assert_eq!(t.player("p2").unwrap().chips, 1010);
    assert_eq!(total_chips(&t), 3000);
}

#[test]
fn all_in_call_call_runs_out_the_board() {
    // A=100 shoves preflop, B and C call exactly 100. Contributions are
    // equal, so there is a single pot of 300 and no side pot.
    let mut t = table(BettingMode::NoLimit, 5, 10, &[100, 500, 500]);
    t.start_hand().unwrap();

    act(&mut t, "p0", Action::AllIn);
    act(&mut t, "p1", Action::Call);
    let progress = act(&mut t, "p2", Action::Call);
    // The two full stacks can still bet against each other.
    assert!(matches!(progress, HandProgress::StreetAdvanced(Stage::Flop)));

    act(&mut t, "p1", Action::Check);
    act(&mut t, "p2", Action::Check);
    act(&mut t, "p1", Action::Check);
    act(&mut t, "p2", Action::Check);
    act(&mut t, "p1", Action::Check);
    let progress = act(&mut t, "p2", Action::Check);
    let HandProgress::Finished(result) = progress else {
        panic!("river check should close the hand");
    };
    assert!(!result.uncontested);

    // Whoever won, the winners were paid exactly the 300 in the middle.
    let paid: Chips = result.winners.iter().map(|w| w.amount).sum();
    assert_eq!(paid, 300);
    assert_eq!(total_chips(&t), 1100);
    assert_eq!(t.stage(), Stage::Showdown);
    assert_eq!(t.phase, RoomPhase::BetweenHands);

    // No side pot: B and C must finish within 300 of each other's start.
    let b = t.player("p1").unwrap().chips;
    let c = t.player("p2").unwrap().chips;
    assert_eq!(b + c + t.player("p0").unwrap().chips, 1100);
    assert!(b >= 400 && c >= 400, "callers risked only 100 each");
}

#[test]
fn three_way_all_in_builds_layered_pots() {
    // A=50, B=200, C=500 all shove preflop. Main pot 150 (everyone),
    // side pot 300 (B, C); C's uncalled 300 comes straight back.
    let mut t = table(BettingMode::NoLimit, 5, 10, &[50, 200, 500]);
    t.start_hand().unwrap();

    act(&mut t, "p0", Action::AllIn);
    act(&mut t, "p1", Action::AllIn);
    let progress = act(&mut t, "p2", Action::AllIn);

    // The board runs out one observable street at a time.
    assert!(matches!(progress, HandProgress::StreetAdvanced(Stage::Flop)));
    assert_eq!(t.hand().unwrap().community.len(), 3);
    let progress = t.advance_runout().unwrap();
    assert!(matches!(progress, HandProgress::StreetAdvanced(Stage::Turn)));
    assert_eq!(t.hand().unwrap().community.len(), 4);
    let progress = t.advance_runout().unwrap();
    assert!(matches!(progress, HandProgress::StreetAdvanced(Stage::River)));
    assert_eq!(t.hand().unwrap().community.len(), 5);
    let progress = t.advance_runout().unwrap();
    let HandProgress::Finished(result) = progress else {
        panic!("river run-out should show down");
    };
    assert!(t.advance_runout().is_none());

    let paid: Chips = result.winners.iter().map(|w| w.amount).sum();
    assert_eq!(paid, 750);
    assert_eq!(total_chips(&t), 750);
    // C can lose at most 200: the 300 only C was eligible for returns.
    assert!(t.player("p2").unwrap().chips >= 300);
}

#[test]
fn limit_cap_binds_on_every_street() {
    let mut t = table(BettingMode::Limit, 10, 20, &[2000, 2000, 2000]);
    t.start_hand().unwrap();

    // Preflop: big blind opened, so three raises hit the cap.
    act(&mut t, "p0", Action::Raise(20));
    act(&mut t, "p1", Action::Raise(20));
    act(&mut t, "p2", Action::Raise(20));
    assert_eq!(
        t.apply_action("p0", Action::Raise(20)),
        Err(ActionError::RaiseCapReached)
    );
    act(&mut t, "p0", Action::Call);
    let progress = act(&mut t, "p1", Action::Call);
    assert!(matches!(progress, HandProgress::StreetAdvanced(Stage::Flop)));

    // Flop: bet + three raises, the fifth aggression is refused.
    act(&mut t, "p1", Action::Bet(20));
    act(&mut t, "p2", Action::Raise(20));
    act(&mut t, "p0", Action::Raise(20));
    act(&mut t, "p1", Action::Raise(20));
    assert_eq!(
        t.apply_action("p2", Action::Raise(20)),
        Err(ActionError::RaiseCapReached)
    );
    act(&mut t, "p2", Action::Call);
    let progress = act(&mut t, "p0", Action::Call);
    assert!(matches!(progress, HandProgress::StreetAdvanced(Stage::Turn)));

    // Turn plays the big bet: 20 is no longer a legal size.
    assert_eq!(
        t.apply_action("p1", Action::Bet(20)),
        Err(ActionError::BetBelowMinimum { min: 40 })
    );
    act(&mut t, "p1", Action::Bet(40));
}

#[test]
fn pot_limit_raise_is_bounded_by_the_pot() {
    // Blinds 10/20, pot 30 preflop. Under the gun owes 20, so the cap
    // is 30 + 20 = 50 above the current bet.
    let mut t = table(BettingMode::PotLimit, 10, 20, &[1000, 1000, 1000]);
    t.start_hand().unwrap();

    assert_eq!(
        t.apply_action("p0", Action::Raise(60)),
        Err(ActionError::RaiseAboveMaximum { max: 50 })
    );
    act(&mut t, "p0", Action::Raise(50));
    // Raise-by semantics: total commitment is 20 + 50.
    assert_eq!(t.player("p0").unwrap().current_bet, 70);
}

#[test]
fn raise_amount_is_additive_above_current_bet() {
    let mut t = table(BettingMode::NoLimit, 10, 20, &[1000, 1000, 1000]);
    t.start_hand().unwrap();

    act(&mut t, "p0", Action::Raise(40));
    assert_eq!(t.player("p0").unwrap().current_bet, 60);
    assert_eq!(t.hand().unwrap().current_bet, 60);
    assert_eq!(t.hand().unwrap().last_raise, 40);

    // The next raise must add at least the last raise size.
    assert_eq!(
        t.apply_action("p1", Action::Raise(30)),
        Err(ActionError::RaiseBelowMinimum { min: 40 })
    );
    act(&mut t, "p1", Action::Raise(40));
    assert_eq!(t.player("p1").unwrap().current_bet, 100);
}

#[test]
fn checked_down_hand_reaches_showdown() {
    let mut t = table(BettingMode::NoLimit, 10, 20, &[500, 500]);
    t.start_hand().unwrap();

    // Preflop: button completes, big blind checks.
    let button = t.button();
    let button_id = t.players[button].id.clone();
    let other_id = t
        .players
        .iter()
        .find(|p| p.id != button_id)
        .unwrap()
        .id
        .clone();
    act(&mut t, &button_id, Action::Call);
    act(&mut t, &other_id, Action::Check);

    // Post-flop the big blind acts first.
    for _ in 0..2 {
        act(&mut t, &other_id, Action::Check);
        act(&mut t, &button_id, Action::Check);
    }
    act(&mut t, &other_id, Action::Check);
    let progress = act(&mut t, &button_id, Action::Check);
    let HandProgress::Finished(result) = progress else {
        panic!("river check should close the hand");
    };

    assert_eq!(t.hand().unwrap().community.len(), 5);
    assert!(t.hand().unwrap().revealed);
    assert!(!result.winners.is_empty());
    assert!(result.winners.iter().all(|w| w.hand_name.is_some()));
    let paid: Chips = result.winners.iter().map(|w| w.amount).sum();
    assert_eq!(paid, 40);
    assert_eq!(total_chips(&t), 1000);
}

#[test]
fn button_rotates_between_hands() {
    let mut t = table(BettingMode::NoLimit, 10, 20, &[1000, 1000, 1000]);
    t.start_hand().unwrap();
    assert_eq!(t.button(), 0);

    act(&mut t, "p0", Action::Fold);
    act(&mut t, "p1", Action::Fold);

    t.start_hand().unwrap();
    assert_eq!(t.button(), 1);
    let hand = t.hand().unwrap();
    assert_eq!(hand.sb_seat, 2);
    assert_eq!(hand.bb_seat, 0);
}

#[test]
fn conservation_holds_at_every_step() {
    let mut t = table(BettingMode::NoLimit, 10, 20, &[300, 800, 1500]);
    t.start_hand().unwrap();

    act(&mut t, "p0", Action::Raise(60));
    assert_eq!(total_chips(&t), 2600);
    act(&mut t, "p1", Action::Call);
    assert_eq!(total_chips(&t), 2600);
    act(&mut t, "p2", Action::Raise(200));
    assert_eq!(total_chips(&t), 2600);
    act(&mut t, "p0", Action::AllIn);
    assert_eq!(total_chips(&t), 2600);
    act(&mut t, "p1", Action::Fold);
    let mut progress = act(&mut t, "p2", Action::Call);
    // Conservation holds through every step of the run-out.
    loop {
        assert_eq!(total_chips(&t), 2600);
        match progress {
            HandProgress::Finished(_) => break,
            _ => progress = t.advance_runout().expect("run-out continues"),
        }
    }
    assert_eq!(total_chips(&t), 2600);
}

#[test]
fn starting_mid_hand_is_refused() {
    let mut t = table(BettingMode::NoLimit, 10, 20, &[1000, 1000]);
    t.start_hand().unwrap();
    assert_eq!(t.start_hand(), Err(ActionError::HandInProgress));
}
