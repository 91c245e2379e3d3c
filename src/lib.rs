//! Crate root module declarations for the connect-four solver.
//!
//! This file exposes the board model, the exhaustive search engine and the
//! small utility helpers so binaries, benches, and tests can import stable
//! module paths.

pub mod errors;

pub mod game_state {
    pub mod board_rules;
    pub mod position;
}

pub mod search {
    pub mod move_sorter;
    pub mod solver;
    pub mod transposition_table;
}

pub mod utils {
    pub mod random_positions;
    pub mod render_position;
}
