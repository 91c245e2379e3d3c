//! Random legal move sequences for property tests and benchmarks.
//!
//! Sequences never contain a winning move, so every prefix replays into a
//! position the solver accepts.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::game_state::board_rules::WIDTH;
use crate::game_state::position::Position;

/// Up to `plies` random non-winning moves from the empty board.
///
/// Stops early when every playable column would end the game.
pub fn random_move_sequence<R: Rng + ?Sized>(rng: &mut R, plies: usize) -> String {
    let mut position = Position::new();
    let mut moves = String::with_capacity(plies);

    while moves.len() < plies {
        let candidates: Vec<usize> = (0..WIDTH)
            .filter(|&column| position.can_play(column) && !position.is_winning_move(column))
            .collect();
        let Some(&column) = candidates.choose(&mut *rng) else {
            break;
        };
        position.play_column(column);
        moves.push(char::from(b'1' + column as u8));
    }

    moves
}

/// `count` reproducible sequences of up to `plies` moves.
pub fn seeded_move_sequences(seed: u64, count: usize, plies: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| random_move_sequence(&mut rng, plies))
        .collect()
}
