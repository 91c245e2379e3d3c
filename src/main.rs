//! Command-line entry point: solve one position and print its optimal move.
//!
//! Usage:
//! `connect_four_solve_state 4453` prints `4453 <column> <sign of score>`.
//! `connect_four_solve_state --analyze 4453` prints every column's score,
//! `-` for full columns.
//!
//! Invalid positions print a diagnostic on stderr and an empty line on stdout.
//! A missing state argument is a usage error: clap prints the usage to
//! stderr and the process exits with status 2.

use std::process::ExitCode;

use clap::Parser;
use log::error;

use connect_four_solver::errors::PositionError;
use connect_four_solver::game_state::position::Position;
use connect_four_solver::search::solver::{Solver, SolverConfig, DEFAULT_TABLE_LOG_SIZE};

#[derive(Debug, Parser)]
#[command(
    name = "connect_four_solve_state",
    about = "Solve a connect-four position and print its optimal move"
)]
struct Cli {
    /// Moves played so far as 1-indexed column digits; may be empty.
    state: String,

    /// Only decide win, draw or loss.
    #[arg(long)]
    weak: bool,

    /// The transposition table holds next_prime(2^N) entries.
    #[arg(long, default_value_t = DEFAULT_TABLE_LOG_SIZE)]
    table_log_size: u32,

    /// Print the score of every column instead of the best move.
    #[arg(long)]
    analyze: bool,
}

fn run(cli: &Cli) -> Result<String, PositionError> {
    let mut solver = Solver::with_config(SolverConfig {
        table_log_size: cli.table_log_size,
        weak: cli.weak,
    });

    if cli.analyze {
        let position = Position::from_moves(&cli.state)?;
        let scores: Vec<String> = solver
            .analyze(&position)
            .into_iter()
            .map(|score| score.map_or_else(|| "-".to_string(), |s| s.to_string()))
            .collect();
        return Ok(format!("{} {}", cli.state, scores.join(" ")));
    }

    let (column, score) = solver.optimal_move(&cli.state)?;
    Ok(format!("{} {} {}", cli.state, column, score.signum()))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(line) => {
            println!("{line}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("invalid position {:?}: {err}", cli.state);
            println!();
            ExitCode::FAILURE
        }
    }
}
