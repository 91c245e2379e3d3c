//! Plain-text board renderer.
//!
//! Draws the first player's stones as `X`, the second player's as `O`, top
//! row first, with column numbers underneath matching the move-string digits.

use crate::game_state::board_rules::{bottom_mask_col, HEIGHT, WIDTH};
use crate::game_state::position::Position;

pub fn render_position(position: &Position) -> String {
    let first = position.first_player_stones();
    let occupied = position.occupied();
    let mut out = String::new();

    for row in (0..HEIGHT).rev() {
        for column in 0..WIDTH {
            let cell = bottom_mask_col(column) << row;
            out.push(if occupied & cell == 0 {
                '.'
            } else if first & cell != 0 {
                'X'
            } else {
                'O'
            });
            if column + 1 < WIDTH {
                out.push(' ');
            }
        }
        out.push('\n');
    }

    let footer: Vec<String> = (1..=WIDTH).map(|column| column.to_string()).collect();
    out.push_str(&footer.join(" "));
    out
}
