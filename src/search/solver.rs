//! Exact connect-four solver.
//!
//! Negamax with alpha-beta pruning over [`Position`], memoized in a
//! [`TranspositionTable`] of one-sided bounds and ordered by [`MoveSorter`].
//! [`Solver::solve`] turns the bounded search into an exact score by
//! repeatedly probing with null windows and narrowing `[min, max]`.
//!
//! Scores are from the side to move: positive wins, negative loses, 0 draws.
//! Winning with the stone played after `n` plies scores
//! `(BOARD_CELLS + 1 - n) / 2`, so faster wins and slower losses score higher.

use std::time::{Duration, Instant};

use log::{debug, info, trace};

use crate::errors::PositionError;
use crate::game_state::board_rules::*;
use crate::game_state::position::Position;
use crate::search::move_sorter::MoveSorter;
use crate::search::transposition_table::{Bound, TTStats, TranspositionTable};

pub const DEFAULT_TABLE_LOG_SIZE: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Table holds `next_prime(2^table_log_size)` slots of 5 bytes.
    pub table_log_size: u32,
    /// Only decide win / draw / loss; scores collapse to their sign.
    pub weak: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            table_log_size: DEFAULT_TABLE_LOG_SIZE,
            weak: false,
        }
    }
}

/// Outcome of [`Solver::solve_report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveReport {
    /// Best column (1-indexed), 0 when the board is full.
    pub column: usize,
    pub score: i32,
    pub nodes: u64,
    pub elapsed: Duration,
    pub tt_stats: TTStats,
}

#[derive(Debug, Clone)]
pub struct Solver {
    table: TranspositionTable,
    nodes: u64,
    config: SolverConfig,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::with_config(SolverConfig::default())
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            table: TranspositionTable::new(config.table_log_size),
            nodes: 0,
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> SolverConfig {
        self.config
    }

    /// Nodes visited since the last [`Solver::reset`].
    #[inline]
    pub fn node_count(&self) -> u64 {
        self.nodes
    }

    #[inline]
    pub fn table_stats(&self) -> TTStats {
        self.table.stats()
    }

    /// Clear the transposition table and the node counter.
    pub fn reset(&mut self) {
        self.table.reset();
        self.nodes = 0;
    }

    /// Best column (1-indexed) and its score for the position after `moves`.
    ///
    /// The table is reset first, so the answer never depends on earlier
    /// queries. Ties go to the lowest column; column 0 means the board is full.
    pub fn optimal_move(&mut self, moves: &str) -> Result<(usize, i32), PositionError> {
        let position = Position::from_moves(moves)?;
        self.reset();
        let started_at = Instant::now();
        let best = best_column(self.analyze(&position));

        let stats = self.table.stats();
        info!(
            "optimal_move {moves:?}: column={} score={} nodes={} tt_hits={}/{} elapsed={:?}",
            best.0,
            best.1,
            self.nodes,
            stats.hits,
            stats.probes,
            started_at.elapsed()
        );
        Ok(best)
    }

    /// Reset, then find the best column of `position` and collect search
    /// statistics for it.
    pub fn solve_report(&mut self, position: &Position) -> SolveReport {
        self.reset();
        let started_at = Instant::now();
        let (column, score) = best_column(self.analyze(position));
        SolveReport {
            column,
            score,
            nodes: self.nodes,
            elapsed: started_at.elapsed(),
            tt_stats: self.table.stats(),
        }
    }

    /// Score of every column from the mover's perspective; `None` when full.
    pub fn analyze(&mut self, position: &Position) -> [Option<i32>; WIDTH] {
        let mut scores = [None; WIDTH];
        for (column, slot) in scores.iter_mut().enumerate() {
            if !position.can_play(column) {
                continue;
            }
            let score = if position.is_winning_move(column) {
                self.outcome(win_score(position.moves_played()))
            } else {
                -self.solve(&position.after_column(column))
            };
            trace!("analyze column={} score={score}", column + 1);
            *slot = Some(score);
        }
        scores
    }

    /// Exact score of `position`, or its sign in weak mode.
    ///
    /// Binary-searches the score with null-window negamax probes. Each probe
    /// only answers "above or below `mid`", which prunes far more than a
    /// full-window search would.
    pub fn solve(&mut self, position: &Position) -> i32 {
        let moves = position.moves_played();
        if position.can_win_next() {
            return self.outcome(win_score(moves));
        }

        let (mut min, mut max) = if self.config.weak {
            (-1, 1)
        } else {
            (loss_score(moves), win_score(moves))
        };

        while min < max {
            let mut mid = min + (max - min) / 2;
            // Probe closer to 0 first: short wins and losses are cheap to refute.
            if mid <= 0 && min / 2 < mid {
                mid = min / 2;
            } else if mid >= 0 && max / 2 > mid {
                mid = max / 2;
            }

            let r = self.negamax(position, mid, mid + 1);
            debug!("null window [{mid}, {}] -> {r} (range [{min}, {max}])", mid + 1);
            if r <= mid {
                max = r;
            } else {
                min = r;
            }
        }
        self.outcome(min)
    }

    // A weak search can stop on any bound beyond +-1; only the sign is meaningful.
    #[inline]
    fn outcome(&self, score: i32) -> i32 {
        if self.config.weak {
            score.signum()
        } else {
            score
        }
    }

    /// Bound on the score of `position` within `(alpha, beta)`.
    ///
    /// Requires that the player to move cannot win immediately. Returns the
    /// exact score when it lies inside the window, an upper bound `<= alpha`
    /// on fail-low, and a lower bound `>= beta` on fail-high.
    fn negamax(&mut self, position: &Position, mut alpha: i32, mut beta: i32) -> i32 {
        debug_assert!(alpha < beta);
        self.nodes += 1;

        let moves = position.moves_played();
        let possible = position.possible_non_losing_moves();
        if possible == 0 {
            return loss_score(moves);
        }

        // Two cells left and no way to lose: the opponent fills the last one.
        if moves >= BOARD_CELLS - 2 {
            return 0;
        }

        // The opponent cannot win on their next stone.
        let min = loss_score(moves + 2);
        if alpha < min {
            alpha = min;
            if alpha >= beta {
                return alpha;
            }
        }

        // Neither can we.
        let mut max = win_score(moves + 2);

        let key = position.key();
        match self.table.probe_bound(key) {
            Some(Bound::Lower(lower)) => {
                if alpha < lower {
                    alpha = lower;
                    if alpha >= beta {
                        return alpha;
                    }
                }
            }
            Some(Bound::Upper(upper)) => max = max.min(upper),
            None => {}
        }

        if beta > max {
            beta = max;
            if alpha >= beta {
                return beta;
            }
        }

        let mut candidates = MoveSorter::new();
        if possible & (possible - 1) == 0 {
            candidates.add(column_of(possible), 0);
        } else {
            // Edges first so that ties pop center-first.
            for &column in COLUMN_ORDER.iter().rev() {
                let cell = possible & column_mask(column);
                if cell != 0 {
                    candidates.add(column, position.move_score(cell));
                }
            }
        }

        for column in candidates {
            let next = position.after_column(column);
            let score = -self.negamax(&next, -beta, -alpha);
            if score >= beta {
                self.table.store_bound(key, Bound::Lower(score));
                return score;
            }
            if score > alpha {
                alpha = score;
            }
        }

        self.table.store_bound(key, Bound::Upper(alpha));
        alpha
    }
}

/// Highest-scoring playable column (1-indexed) with its score; ties go to the
/// lowest column and `(0, 0)` means nothing is playable.
fn best_column(scores: [Option<i32>; WIDTH]) -> (usize, i32) {
    scores
        .into_iter()
        .enumerate()
        .filter_map(|(column, score)| score.map(|score| (column + 1, score)))
        .fold(None, |best: Option<(usize, i32)>, candidate| match best {
            Some((_, score)) if score >= candidate.1 => best,
            _ => Some(candidate),
        })
        .unwrap_or((0, 0))
}
