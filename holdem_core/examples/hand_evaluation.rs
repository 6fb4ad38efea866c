//! Hand Evaluation Example
//!
//! Demonstrates evaluating and comparing poker hands.

use holdem_core::game::cards::{Card, Suit};
use holdem_core::game::eval::evaluate;

fn main() {
    println!("=== Poker Hand Evaluation Example ===\n");

    // A 7-card hand: two hole cards plus a full board.
    let seven = vec![
        Card(14, Suit::Heart), // Ace of Hearts
        Card(13, Suit::Heart), // King of Hearts
        Card(12, Suit::Heart), // Queen of Hearts
        Card(11, Suit::Heart), // Jack of Hearts
        Card(10, Suit::Heart), // Ten of Hearts
        Card(9, Suit::Spade),
        Card(2, Suit::Club),
    ];
    let value = evaluate(&seven);
    println!("Cards: {seven:?}");
    println!("Best hand: {} {:?}\n", value.rank, value.kickers);

    // Comparing two made hands.
    let aces = evaluate(&[
        Card(14, Suit::Spade),
        Card(14, Suit::Heart),
        Card(10, Suit::Club),
        Card(9, Suit::Diamond),
        Card(2, Suit::Spade),
    ]);
    let kings = evaluate(&[
        Card(13, Suit::Spade),
        Card(13, Suit::Heart),
        Card(10, Suit::Club),
        Card(9, Suit::Diamond),
        Card(2, Suit::Spade),
    ]);
    println!("Pair of aces vs pair of kings:");
    if aces > kings {
        println!("  aces win\n");
    } else {
        println!("  kings win\n");
    }

    // The wheel counts the ace low.
    let wheel = evaluate(&[
        Card(14, Suit::Spade),
        Card(2, Suit::Heart),
        Card(3, Suit::Diamond),
        Card(4, Suit::Club),
        Card(5, Suit::Spade),
    ]);
    println!("A-2-3-4-5 evaluates as a {} to the {}", wheel.rank, wheel.kickers[0]);
}
