//! Errors raised while replaying a move sequence into a position.
//!
//! These are the only failures the solver reports. Everything the search
//! itself encounters (forced losses, draws, full boards) is an ordinary score.

use thiserror::Error;

/// Failure to build a solvable position from a move string.
///
/// `ply` is the number of moves replayed successfully before the offending
/// move, so the failing move is the `ply + 1`-th character of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PositionError {
    /// The token is not a column digit on the board, or its column is full.
    #[error("invalid move '{token}' at ply {ply}")]
    InvalidMove { ply: usize, token: char },

    /// The move at `ply` completes four in a row; a decided game is never solved.
    #[error("game already over at ply {ply}")]
    GameAlreadyOver { ply: usize },
}

impl PositionError {
    /// Number of moves consumed before the failure.
    pub fn ply(&self) -> usize {
        match self {
            PositionError::InvalidMove { ply, .. } | PositionError::GameAlreadyOver { ply } => {
                *ply
            }
        }
    }
}
