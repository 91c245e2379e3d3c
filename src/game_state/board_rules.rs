//! Canonical board geometry and score-range constants.
//!
//! The board is packed column-major into a `u64`: each column owns
//! `HEIGHT + 1` consecutive bits, bottom cell first, with the extra top bit
//! acting as a sentinel so shifted-AND win detection never bleeds from one
//! column into the next.
//!
//! ```text
//!   .  .  .  .  .  .  .     <- sentinel row (always empty)
//!   5 12 19 26 33 40 47
//!   4 11 18 25 32 39 46
//!   3 10 17 24 31 38 45
//!   2  9 16 23 30 37 44
//!   1  8 15 22 29 36 43
//!   0  7 14 21 28 35 42
//! ```

/// Packed set of board cells, one bit per cell in the layout above.
pub type Bitboard = u64;

pub const WIDTH: usize = 7;
pub const HEIGHT: usize = 6;
pub const BOARD_CELLS: usize = WIDTH * HEIGHT;

/// Bits reserved per column, sentinel included.
pub const COLUMN_STRIDE: usize = HEIGHT + 1;

const _: () = assert!(WIDTH * COLUMN_STRIDE <= 64, "board must fit in a u64");
const _: () = assert!(WIDTH < 10, "columns are addressed by a single digit");

/// Lowest score any position can have: losing on the opponent's fourth stone.
pub const MIN_SCORE: i32 = -(BOARD_CELLS as i32) / 2 + 3;

/// Highest score any position can have: winning with the first player's fourth stone.
pub const MAX_SCORE: i32 = (BOARD_CELLS as i32 + 1) / 2 - 3;

/// Columns in exploration order: center first, then alternating outward.
pub const COLUMN_ORDER: [usize; WIDTH] = column_order();

pub const BOTTOM_MASK: Bitboard = bottom_mask();
pub const BOARD_MASK: Bitboard = BOTTOM_MASK * ((1 << HEIGHT) - 1);

const fn column_order() -> [usize; WIDTH] {
    let mut order = [0; WIDTH];
    let mut i = 0;
    while i < WIDTH {
        let offset = (i + 1) / 2;
        order[i] = if i % 2 == 0 {
            WIDTH / 2 + offset
        } else {
            WIDTH / 2 - offset
        };
        i += 1;
    }
    order
}

const fn bottom_mask() -> Bitboard {
    let mut mask = 0;
    let mut col = 0;
    while col < WIDTH {
        mask |= bottom_mask_col(col);
        col += 1;
    }
    mask
}

/// Bit of the bottom cell of `col`.
#[inline]
pub const fn bottom_mask_col(col: usize) -> Bitboard {
    1 << (col * COLUMN_STRIDE)
}

/// Bit of the top playable cell of `col`.
#[inline]
pub const fn top_mask_col(col: usize) -> Bitboard {
    1 << (HEIGHT - 1 + col * COLUMN_STRIDE)
}

/// All playable cells of `col`, sentinel excluded.
#[inline]
pub const fn column_mask(col: usize) -> Bitboard {
    ((1 << HEIGHT) - 1) << (col * COLUMN_STRIDE)
}

/// Column index owning the lowest set bit of `cells`.
#[inline]
pub const fn column_of(cells: Bitboard) -> usize {
    cells.trailing_zeros() as usize / COLUMN_STRIDE
}

/// Score of winning with the next stone when `moves_played` plies are on the board.
#[inline]
pub const fn win_score(moves_played: usize) -> i32 {
    ((BOARD_CELLS + 1 - moves_played) / 2) as i32
}

/// Score of losing on the opponent's next stone when `moves_played` plies are on the board.
#[inline]
pub const fn loss_score(moves_played: usize) -> i32 {
    -(((BOARD_CELLS - moves_played) / 2) as i32)
}
