use std::{
    fs, io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use log::info;
use npuzzle_solver::{parse_board, ParseError, Solver};
use thiserror::Error;

// Format:
// the first number is the board dimension n,
// followed by n² tiles in row-major order,
// 0 is the blank.
const EXAMPLES: &[&str] = &[
    "
3
 0  1  3
 4  2  5
 7  8  6
",
    "
3
 1  2  3
 4  5  6
 8  7  0
",
    "
3
 8  1  3
 4  0  2
 7  6  5
",
    "
4
 1  2  3  4
 5  6  0  8
 9 10  7 11
13 14 15 12
",
];

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Puzzle files to solve; the built-in examples are solved when none are given
    paths: Vec<PathBuf>,
}

#[derive(Debug, Error)]
enum RunError {
    #[error("failed to read file: {0}")]
    Io(#[from] io::Error),
    #[error("invalid board: {0}")]
    Parse(#[from] ParseError),
}

fn solve_file(path: &Path) -> Result<(), RunError> {
    let input = fs::read_to_string(path)?;
    solve(&input)?;
    Ok(())
}

fn solve(input: &str) -> Result<(), ParseError> {
    let board = parse_board(input)?;
    let solver = Solver::new(board);

    match solver.solution() {
        Some(boards) => {
            println!("Minimum number of moves = {}", boards.len() - 1);
            for board in boards {
                println!("{}", board);
                println!();
            }
        }
        None => println!("No solution possible"),
    }

    let stats = solver.stats();
    info!(
        "Visited {} board positions (generated {} total).",
        stats.expanded, stats.generated
    );

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    if args.paths.is_empty() {
        for example in EXAMPLES {
            println!("----");
            if let Err(e) = solve(example) {
                eprintln!("built-in example: {}", e);
                return ExitCode::FAILURE;
            }
        }

        return ExitCode::SUCCESS;
    }

    let mut failed = false;
    for path in &args.paths {
        println!("----");
        println!("{}:", path.display());

        if let Err(e) = solve_file(path) {
            eprintln!("{}: {}", path.display(), e);
            failed = true;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
