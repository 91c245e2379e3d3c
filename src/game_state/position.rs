//! Packed connect-four position.
//!
//! `Position` stores two bitboards: every occupied cell, and the cells of the
//! player about to move. All rule queries (legality, win detection, hashing)
//! are O(1) bit operations over the layout documented in `board_rules`.

use std::fmt;
use std::str::FromStr;

use crate::errors::PositionError;
use crate::game_state::board_rules::*;

/// Board state reachable by legal play from the empty board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    // Cells of the player to move.
    current: Bitboard,
    // Every occupied cell.
    mask: Bitboard,
    moves: usize,
}

impl Position {
    #[inline]
    pub const fn new() -> Self {
        Self {
            current: 0,
            mask: 0,
            moves: 0,
        }
    }

    /// Replay a sequence of 1-indexed column digits from the empty board.
    pub fn from_moves(moves: &str) -> Result<Self, PositionError> {
        let mut position = Self::new();
        position.play_sequence(moves)?;
        Ok(position)
    }

    /// Replay `moves` on top of the current position.
    ///
    /// Stops at the first digit outside `1..=WIDTH`, the first move into a
    /// full column, or the first move that would complete four in a row. On
    /// failure the position keeps every move played before the offending one.
    pub fn play_sequence(&mut self, moves: &str) -> Result<usize, PositionError> {
        for (ply, token) in moves.chars().enumerate() {
            let column = token
                .to_digit(10)
                .map(|digit| digit as usize)
                .filter(|digit| (1..=WIDTH).contains(digit))
                .map(|digit| digit - 1)
                .filter(|&column| self.can_play(column))
                .ok_or(PositionError::InvalidMove { ply, token })?;

            if self.is_winning_move(column) {
                return Err(PositionError::GameAlreadyOver { ply });
            }
            self.play_column(column);
        }
        Ok(moves.chars().count())
    }

    /// True when `column` is on the board and its top cell is free.
    #[inline]
    pub fn can_play(&self, column: usize) -> bool {
        column < WIDTH && self.mask & top_mask_col(column) == 0
    }

    /// Drop a stone for the player to move. `column` must be playable.
    #[inline]
    pub fn play_column(&mut self, column: usize) {
        debug_assert!(self.can_play(column), "column {column} is not playable");
        self.play_move((self.mask + bottom_mask_col(column)) & column_mask(column));
    }

    /// Apply a move given as the single cell it fills.
    ///
    /// `cell` must be one of the bits of [`Position::possible`].
    #[inline]
    pub fn play_move(&mut self, cell: Bitboard) {
        self.current ^= self.mask;
        self.mask |= cell;
        self.moves += 1;
    }

    /// Copy of this position with `column` played.
    #[inline]
    pub fn after_column(&self, column: usize) -> Self {
        let mut next = *self;
        next.play_column(column);
        next
    }

    /// True when playing `column` completes four in a row for the player to move.
    #[inline]
    pub fn is_winning_move(&self, column: usize) -> bool {
        column < WIDTH && self.winning_position() & self.possible() & column_mask(column) != 0
    }

    /// True when the player to move has at least one immediately winning move.
    #[inline]
    pub fn can_win_next(&self) -> bool {
        self.winning_position() & self.possible() != 0
    }

    #[inline]
    pub fn moves_played(&self) -> usize {
        self.moves
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.moves == BOARD_CELLS
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.mask
    }

    #[inline]
    pub fn current_player_stones(&self) -> Bitboard {
        self.current
    }

    #[inline]
    pub fn opponent_stones(&self) -> Bitboard {
        self.current ^ self.mask
    }

    /// Stones of the player who moved first.
    #[inline]
    pub fn first_player_stones(&self) -> Bitboard {
        if self.moves % 2 == 0 {
            self.current_player_stones()
        } else {
            self.opponent_stones()
        }
    }

    /// Unique identifier of the position.
    ///
    /// `current + mask` sets, in every column, the bit just above the top
    /// stone and keeps the current player's stones below it, so the pair
    /// `(current, mask)` is recoverable and distinct positions never share a
    /// key. The key fits in `WIDTH * (HEIGHT + 1)` bits.
    #[inline]
    pub fn key(&self) -> u64 {
        self.current + self.mask
    }

    /// Mirror-canonical base-3 key.
    ///
    /// Each column contributes one digit per stone (1 for the player to move,
    /// 2 for the opponent) from bottom to top followed by a 0 terminator. The
    /// smaller of the left-to-right and right-to-left encodings is returned, so
    /// a position and its mirror image share the same `key3`.
    ///
    /// The search never uses it; it is meant for opening-book tooling and
    /// diagnostics that want one entry per mirror pair.
    pub fn key3(&self) -> u128 {
        let forward = (0..WIDTH).fold(0, |key, column| self.partial_key3(key, column));
        let reverse = (0..WIDTH)
            .rev()
            .fold(0, |key, column| self.partial_key3(key, column));
        forward.min(reverse) / 3
    }

    fn partial_key3(&self, mut key: u128, column: usize) -> u128 {
        let mut cell = bottom_mask_col(column);
        while cell & self.mask != 0 {
            key *= 3;
            key += if cell & self.current != 0 { 1 } else { 2 };
            cell <<= 1;
        }
        key * 3
    }

    /// Left-right mirror image of this position.
    pub fn mirrored(&self) -> Self {
        let flip = |board: Bitboard| {
            (0..WIDTH).fold(0, |acc, column| {
                let bits = (board >> (column * COLUMN_STRIDE)) & column_mask(0);
                acc | bits << ((WIDTH - 1 - column) * COLUMN_STRIDE)
            })
        };
        Self {
            current: flip(self.current),
            mask: flip(self.mask),
            moves: self.moves,
        }
    }

    /// Lowest free cell of every playable column.
    #[inline]
    pub fn possible(&self) -> Bitboard {
        (self.mask + BOTTOM_MASK) & BOARD_MASK
    }

    /// Playable cells that do not hand the opponent an immediate win.
    ///
    /// Must only be called when the player to move cannot win immediately.
    /// Returns 0 when every move loses on the next ply: either the opponent
    /// has two immediate threats, or the only blocking cell sits under another
    /// opponent threat.
    pub fn possible_non_losing_moves(&self) -> Bitboard {
        debug_assert!(!self.can_win_next());
        let mut possible = self.possible();
        let opponent_win = self.opponent_winning_position();
        let forced_moves = possible & opponent_win;
        if forced_moves != 0 {
            if forced_moves & (forced_moves - 1) != 0 {
                return 0;
            }
            possible = forced_moves;
        }
        // Never play directly below an opponent threat.
        possible & !(opponent_win >> 1)
    }

    /// Ordering heuristic: open winning cells the mover would own after `cell`.
    #[inline]
    pub fn move_score(&self, cell: Bitboard) -> u32 {
        compute_winning_position(self.current | cell, self.mask).count_ones()
    }

    #[inline]
    fn winning_position(&self) -> Bitboard {
        compute_winning_position(self.current, self.mask)
    }

    #[inline]
    fn opponent_winning_position(&self) -> Bitboard {
        compute_winning_position(self.current ^ self.mask, self.mask)
    }
}

/// Empty cells that would complete four in a row for the owner of `stones`.
fn compute_winning_position(stones: Bitboard, mask: Bitboard) -> Bitboard {
    // vertical: only the cell on top of three stacked stones
    let mut r = (stones << 1) & (stones << 2) & (stones << 3);

    // horizontal, then the two diagonals
    for shift in [COLUMN_STRIDE, HEIGHT, HEIGHT + 2] {
        let p = (stones << shift) & (stones << (2 * shift));
        r |= p & (stones << (3 * shift));
        r |= p & (stones >> shift);
        let p = (stones >> shift) & (stones >> (2 * shift));
        r |= p & (stones << shift);
        r |= p & (stones >> (3 * shift));
    }

    r & (BOARD_MASK ^ mask)
}

impl FromStr for Position {
    type Err = PositionError;

    fn from_str(moves: &str) -> Result<Self, Self::Err> {
        Self::from_moves(moves)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::utils::render_position::render_position(self))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::Position;
    use crate::errors::PositionError;
    use crate::game_state::board_rules::{bottom_mask_col, WIDTH};
    use crate::utils::random_positions::random_move_sequence;

    fn winning_columns(position: &Position) -> Vec<usize> {
        (0..WIDTH)
            .filter(|&column| position.can_play(column) && position.is_winning_move(column))
            .collect()
    }

    #[test]
    fn empty_position_allows_every_column() {
        let position = Position::new();
        assert_eq!(position.moves_played(), 0);
        assert_eq!(position.key(), 0);
        assert!((0..WIDTH).all(|column| position.can_play(column)));
        assert!(!position.can_play(WIDTH));
        assert!(!position.can_win_next());
    }

    #[test]
    fn replay_counts_moves_and_switches_player() {
        let position = Position::from_moves("4453").expect("sequence should replay");
        assert_eq!(position.moves_played(), 4);
        assert_eq!(position.first_player_stones().count_ones(), 2);
        assert_eq!(position.current_player_stones(), position.first_player_stones());
        assert_eq!(position.occupied().count_ones(), 4);
    }

    #[test]
    fn rejects_digits_outside_the_board() {
        assert_eq!(
            Position::from_moves("8"),
            Err(PositionError::InvalidMove { ply: 0, token: '8' })
        );
        assert_eq!(
            Position::from_moves("1230"),
            Err(PositionError::InvalidMove { ply: 3, token: '0' })
        );
        assert_eq!(
            Position::from_moves("12x"),
            Err(PositionError::InvalidMove { ply: 2, token: 'x' })
        );
    }

    #[test]
    fn rejects_move_into_full_column() {
        let err = Position::from_moves("1111111").expect_err("seventh stone cannot fit");
        assert_eq!(err, PositionError::InvalidMove { ply: 6, token: '1' });
    }

    #[test]
    fn rejects_play_past_a_win() {
        assert_eq!(
            Position::from_moves("1212121"),
            Err(PositionError::GameAlreadyOver { ply: 6 })
        );
        assert_eq!(
            Position::from_moves("12121212"),
            Err(PositionError::GameAlreadyOver { ply: 6 })
        );
        assert_eq!(
            Position::from_moves("1122334"),
            Err(PositionError::GameAlreadyOver { ply: 6 })
        );
    }

    #[test]
    fn partial_replay_keeps_prefix() {
        let mut position = Position::new();
        let err = position.play_sequence("445x").expect_err("bad token");
        assert_eq!(err.ply(), 3);
        assert_eq!(position, Position::from_moves("445").expect("prefix replays"));
    }

    #[test]
    fn detects_vertical_win_only_in_its_column() {
        let position = Position::from_moves("121212").expect("no win yet");
        assert_eq!(winning_columns(&position), vec![0]);
        assert!(position.can_win_next());
    }

    #[test]
    fn detects_horizontal_win_only_in_its_column() {
        let position = Position::from_moves("112233").expect("no win yet");
        assert_eq!(winning_columns(&position), vec![3]);
    }

    #[test]
    fn detects_diagonal_win_only_in_its_column() {
        let position = Position::from_moves("1223343447").expect("no win yet");
        assert_eq!(winning_columns(&position), vec![3]);
    }

    #[test]
    fn detects_anti_diagonal_win_only_in_its_column() {
        // First player holds (1,4), (3,2) and (4,1); the hole is the third
        // row of column 2.
        let position = Position::from_moves("1311321244").expect("no win yet");
        assert_eq!(position.moves_played() % 2, 0);
        assert_eq!(winning_columns(&position), vec![1]);
        assert!(position.is_winning_move(1));
        assert!(!position.is_winning_move(0));
    }

    #[test]
    fn detects_win_for_second_player() {
        let position = Position::from_moves("7665545").expect("no win yet");
        assert_eq!(position.moves_played() % 2, 1);
        assert_eq!(winning_columns(&position), vec![2]);
    }

    #[test]
    fn double_threat_leaves_no_non_losing_move() {
        let position = Position::from_moves("31415").expect("no win yet");
        assert!(!position.can_win_next());
        assert_eq!(position.possible_non_losing_moves(), 0);
    }

    #[test]
    fn single_threat_forces_the_block() {
        // First player threatens the bottom cell of the fourth column.
        let position = Position::from_moves("17273").expect("no win yet");
        assert!(!position.can_win_next());
        assert_eq!(position.possible_non_losing_moves(), bottom_mask_col(3));
    }

    #[test]
    fn keys_are_unique_across_random_games() {
        let mut rng = StdRng::seed_from_u64(0xC0FFEE);
        let mut seen: HashMap<u64, (u64, u64)> = HashMap::new();
        for _ in 0..2000 {
            let moves = random_move_sequence(&mut rng, 42);
            let mut position = Position::new();
            for token in moves.chars() {
                position
                    .play_sequence(&token.to_string())
                    .expect("generated moves are legal");
                let identity = (position.current_player_stones(), position.occupied());
                let previous = seen.entry(position.key()).or_insert(identity);
                assert_eq!(*previous, identity, "key collision for {moves}");
            }
        }
    }

    #[test]
    fn mirror_images_share_key3() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..200 {
            let moves = random_move_sequence(&mut rng, 30);
            let position = Position::from_moves(&moves).expect("generated moves are legal");
            let mirrored_moves: String = moves
                .chars()
                .map(|c| char::from(b'1' + b'7' - c as u8))
                .collect();
            let mirror = Position::from_moves(&mirrored_moves).expect("mirror replays too");
            assert_eq!(position.mirrored(), mirror);
            assert_eq!(mirror.mirrored(), position);
            assert_eq!(position.key3(), mirror.key3());
        }
    }

    #[test]
    fn key3_separates_non_mirrored_positions() {
        let a = Position::from_moves("1").expect("legal");
        let b = Position::from_moves("2").expect("legal");
        let c = Position::from_moves("7").expect("legal");
        assert_ne!(a.key3(), b.key3());
        assert_eq!(a.key3(), c.key3());
        assert_ne!(Position::new().key3(), a.key3());
    }

    #[test]
    fn parses_through_from_str() {
        let position: Position = "4444".parse().expect("legal sequence");
        assert_eq!(position.moves_played(), 4);
        assert!("44448".parse::<Position>().is_err());
    }
}
