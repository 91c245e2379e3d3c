//! Batch solver over standard input.
//!
//! Reads one position per line (a move string, optionally followed by the
//! expected score) and writes `<moves> <column> <score> <nodes> <micros>` per
//! line.
//! Invalid positions produce a diagnostic on stderr and an empty output line.
//!
//! Usage:
//! `cargo run --release --bin solve_positions < Test_L3_R1`
//! `cargo run --release --bin solve_positions -- --weak < positions.txt`

use std::io::{self, BufRead, Write};

use clap::Parser;
use log::{error, warn};

use connect_four_solver::game_state::position::Position;
use connect_four_solver::search::solver::{Solver, SolverConfig, DEFAULT_TABLE_LOG_SIZE};

#[derive(Debug, Parser)]
#[command(name = "solve_positions", about = "Solve connect-four positions read from stdin")]
struct Cli {
    /// Only decide win, draw or loss.
    #[arg(long)]
    weak: bool,

    /// The transposition table holds next_prime(2^N) entries.
    #[arg(long, default_value_t = DEFAULT_TABLE_LOG_SIZE)]
    table_log_size: u32,
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let mut solver = Solver::with_config(SolverConfig {
        table_log_size: cli.table_log_size,
        weak: cli.weak,
    });

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (line_no, line) in stdin.lock().lines().enumerate() {
        let line = line.map_err(|e| format!("failed to read line {}: {e}", line_no + 1))?;
        let mut fields = line.split_whitespace();
        let moves = fields.next().unwrap_or("");
        let expected = fields.next().and_then(|field| field.parse::<i32>().ok());

        let written = match Position::from_moves(moves) {
            Ok(position) => {
                let report = solver.solve_report(&position);
                if let Some(expected) = expected.filter(|&e| !cli.weak && e != report.score) {
                    warn!(
                        "line {}: {moves} scored {} but {expected} was expected",
                        line_no + 1,
                        report.score
                    );
                }
                writeln!(
                    out,
                    "{moves} {} {} {} {}",
                    report.column,
                    report.score,
                    report.nodes,
                    report.elapsed.as_micros()
                )
            }
            Err(err) => {
                error!("line {}: invalid position {moves:?}: {err}", line_no + 1);
                writeln!(out)
            }
        };
        written.map_err(|e| format!("failed to write output: {e}"))?;
    }

    Ok(())
}
