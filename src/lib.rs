mod board;
mod solver;

use std::num::ParseIntError;

use thiserror::Error;

pub use board::{Board, BoardError};
pub use solver::{Pruning, SolveError, Solver, SolverConfig, Stats};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing board dimension")]
    MissingDimension,
    #[error("invalid number: {0}")]
    InvalidNumber(#[from] ParseIntError),
    #[error("expected {expected} tiles, found {found}")]
    WrongTileCount { expected: usize, found: usize },
    #[error(transparent)]
    Board(#[from] BoardError),
}

// Format: the dimension n, then n² whitespace-separated tiles in
// row-major order, 0 being the blank.
pub fn parse_board(b: &str) -> Result<Board, ParseError> {
    let mut tokens = b.split_whitespace();
    let n: usize = tokens.next().ok_or(ParseError::MissingDimension)?.parse()?;
    let tiles = tokens.map(str::parse).collect::<Result<Vec<u32>, _>>()?;

    let expected = n.saturating_mul(n);
    if tiles.len() != expected {
        return Err(ParseError::WrongTileCount {
            expected,
            found: tiles.len(),
        });
    }

    Ok(Board::from_tiles(n, tiles)?)
}
