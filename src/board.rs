use std::{
    fmt::{self, Display},
    hash::{Hash, Hasher},
    ops::Index,
};

use itertools::Itertools;
use smallvec::{Array, SmallVec};
use thiserror::Error;

const BLANK: u32 = 0;

const DELTAS: &[(isize, isize)] = &[(-1, 0), (1, 0), (0, -1), (0, 1)];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("board has no tiles")]
    Empty,
    #[error("row {row} has {len} tiles, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[error("expected {expected} tiles, found {found}")]
    TileCount { expected: usize, found: usize },
    #[error("tile {tile} is outside 0..{limit}")]
    TileOutOfRange { tile: u32, limit: usize },
    #[error("tile {tile} appears more than once")]
    DuplicateTile { tile: u32 },
}

/// One arrangement of an n×n sliding puzzle, `0` being the blank.
///
/// Boards are never mutated once built: moves produce new boards. The
/// Hamming and Manhattan distances to the goal are computed up front.
#[derive(Clone, Debug)]
pub struct Board {
    n: usize,
    tiles: Vec<u32>,
    blank: usize,
    hamming: u32,
    manhattan: u32,
}

impl Board {
    /// Builds a board from its rows.
    pub fn new(rows: Vec<Vec<u32>>) -> Result<Board, BoardError> {
        let n = rows.len();
        if n == 0 {
            return Err(BoardError::Empty);
        }

        if let Some((row, r)) = rows.iter().find_position(|r| r.len() != n) {
            return Err(BoardError::NotSquare {
                row,
                len: r.len(),
                expected: n,
            });
        }

        Board::from_tiles(n, rows.into_iter().flatten().collect())
    }

    /// Builds a board from `n * n` tiles listed in row-major order.
    pub fn from_tiles(n: usize, tiles: Vec<u32>) -> Result<Board, BoardError> {
        if n == 0 {
            return Err(BoardError::Empty);
        }

        let limit = n.saturating_mul(n);
        if tiles.len() != limit {
            return Err(BoardError::TileCount {
                expected: limit,
                found: tiles.len(),
            });
        }

        let mut seen = vec![false; limit];
        for &tile in &tiles {
            let slot = seen
                .get_mut(tile as usize)
                .ok_or(BoardError::TileOutOfRange { tile, limit })?;
            if *slot {
                return Err(BoardError::DuplicateTile { tile });
            }
            *slot = true;
        }

        Ok(Board::from_valid(n, tiles))
    }

    /// The ordered board: `1..n²` in row-major order, blank last.
    pub fn goal(n: usize) -> Result<Board, BoardError> {
        if n == 0 {
            return Err(BoardError::Empty);
        }

        let limit = n * n;
        let tiles = (1..limit as u32).chain([BLANK]).collect();
        Ok(Board::from_valid(n, tiles))
    }

    // tiles must already be a permutation of 0..n²
    fn from_valid(n: usize, tiles: Vec<u32>) -> Board {
        let mut blank = 0;
        let mut hamming = 0;
        let mut manhattan = 0;
        for (ix, &tile) in tiles.iter().enumerate() {
            if tile == BLANK {
                blank = ix;
                continue;
            }

            let distance = distance(n, tile, ix);
            if distance > 0 {
                hamming += 1;
                manhattan += distance;
            }
        }

        Board {
            n,
            tiles,
            blank,
            hamming,
            manhattan,
        }
    }

    pub fn dimension(&self) -> usize {
        self.n
    }

    /// Number of non-blank tiles out of place.
    pub fn hamming(&self) -> u32 {
        self.hamming
    }

    /// Sum over non-blank tiles of their row and column distance to their
    /// goal cell. Never overestimates the moves left, and changes by exactly
    /// one per slide.
    pub fn manhattan(&self) -> u32 {
        self.manhattan
    }

    pub fn is_goal(&self) -> bool {
        self.hamming == 0
    }

    /// The tile at `(row, col)`, or `None` outside the board.
    pub fn tile(&self, row: usize, col: usize) -> Option<u32> {
        if row < self.n && col < self.n {
            Some(self.tiles[row * self.n + col])
        } else {
            None
        }
    }

    /// The tiles in row-major order.
    pub fn tiles(&self) -> &[u32] {
        &self.tiles
    }

    /// Swaps the first two horizontally adjacent non-blank tiles in
    /// row-major order. Exactly one of a board and its twin can be solved.
    ///
    /// A 1×1 board has no such pair and is returned unchanged.
    pub fn twin(&self) -> Board {
        let n = self.n;
        let pair = (0..n)
            .cartesian_product(0..n.saturating_sub(1))
            .map(|(row, col)| row * n + col)
            .find(|&ix| self.tiles[ix] != BLANK && self.tiles[ix + 1] != BLANK);

        match pair {
            Some(ix) => {
                let mut tiles = self.tiles.clone();
                tiles.swap(ix, ix + 1);
                Board::from_valid(n, tiles)
            }
            None => self.clone(),
        }
    }

    /// Every board one blank slide away. The order is unspecified.
    pub fn neighbors(&self) -> impl Iterator<Item = Board> {
        let mut buffer = SmallVec::<[Board; 4]>::new();
        self.slides(&mut buffer);
        buffer.into_iter()
    }

    fn slides<const N: usize>(&self, out: &mut SmallVec<[Board; N]>)
    where
        [Board; N]: Array<Item = Board>,
    {
        let n = self.n as isize;
        let (row, col) = ((self.blank / self.n) as isize, (self.blank % self.n) as isize);
        for &(dr, dc) in DELTAS {
            let (r, c) = (row + dr, col + dc);
            if r < 0 || c < 0 || r >= n || c >= n {
                continue;
            }

            out.push(self.slide_from((r * n + c) as usize));
        }
    }

    // moves the tile at `from` into the blank; only that tile's distance changes
    fn slide_from(&self, from: usize) -> Board {
        let tile = self.tiles[from];
        let before = distance(self.n, tile, from);
        let after = distance(self.n, tile, self.blank);

        let mut tiles = self.tiles.clone();
        tiles.swap(from, self.blank);

        let hamming = match (before, after) {
            (0, 0) => self.hamming,
            (0, _) => self.hamming + 1,
            (_, 0) => self.hamming - 1,
            _ => self.hamming,
        };

        Board {
            n: self.n,
            tiles,
            blank: from,
            hamming,
            manhattan: self.manhattan - before + after,
        }
    }

    /// Decides solvability by permutation parity instead of search.
    ///
    /// Odd widths need an even number of inversions; even widths need
    /// inversions plus the blank's row to be odd.
    pub fn is_solvable_by_parity(&self) -> bool {
        let inversions = self
            .tiles
            .iter()
            .filter(|&&t| t != BLANK)
            .tuple_combinations()
            .filter(|(a, b)| a > b)
            .count();

        if self.n % 2 == 1 {
            inversions % 2 == 0
        } else {
            (inversions + self.blank / self.n) % 2 == 1
        }
    }
}

// steps between cell `ix` and the goal cell of `tile`
fn distance(n: usize, tile: u32, ix: usize) -> u32 {
    let goal = tile as usize - 1;
    let rows = (goal / n).abs_diff(ix / n);
    let cols = (goal % n).abs_diff(ix % n);
    (rows + cols) as u32
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n && self.tiles == other.tiles
    }
}

impl Eq for Board {}

impl Hash for Board {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.n.hash(state);
        self.tiles.hash(state);
    }
}

/// # Panics
///
/// Panics if `(row, col)` lies outside the board; see [`Board::tile`].
impl Index<(usize, usize)> for Board {
    type Output = u32;
    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.tiles[index.0 * self.n + index.1]
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let largest = (self.n * self.n).saturating_sub(1);
        let width = largest.to_string().len().max(2);

        write!(f, "{}", self.n)?;
        for line in self.tiles.chunks(self.n) {
            let row = line.iter().map(|t| format!("{:>width$}", t)).join(" ");
            write!(f, "\n{}", row)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use super::*;

    fn board(rows: &[&[u32]]) -> Board {
        Board::new(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(Board::new(vec![]), Err(BoardError::Empty));
        assert_eq!(
            Board::new(vec![vec![1, 2], vec![3]]),
            Err(BoardError::NotSquare {
                row: 1,
                len: 1,
                expected: 2
            })
        );
        assert_eq!(
            Board::new(vec![vec![1, 2], vec![3, 4]]),
            Err(BoardError::TileOutOfRange { tile: 4, limit: 4 })
        );
        assert_eq!(
            Board::new(vec![vec![1, 1], vec![3, 0]]),
            Err(BoardError::DuplicateTile { tile: 1 })
        );
        assert_eq!(
            Board::from_tiles(2, vec![1, 2, 0]),
            Err(BoardError::TileCount {
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn copies_its_input() {
        let mut rows = vec![vec![1, 2], vec![3, 0]];
        let b = Board::new(rows.clone()).unwrap();
        rows[0][0] = 2;
        rows[0][1] = 1;
        assert_eq!(b.tile(0, 0), Some(1));
        assert_eq!(b[(0, 1)], 2);
    }

    #[test]
    fn tile_lookup_stays_on_the_board() {
        let b = board(&[&[1, 2], &[3, 0]]);
        assert_eq!(b.tile(1, 0), Some(3));
        assert_eq!(b.tile(1, 1), Some(0));
        assert_eq!(b.tile(0, 2), None);
        assert_eq!(b.tile(2, 0), None);
    }

    #[test]
    fn distances() {
        let b = board(&[&[8, 1, 3], &[4, 0, 2], &[7, 6, 5]]);
        assert_eq!(b.dimension(), 3);
        assert_eq!(b.hamming(), 5);
        assert_eq!(b.manhattan(), 10);
        assert!(!b.is_goal());
    }

    #[test]
    fn goal_board() {
        for n in 1..=4 {
            let goal = Board::goal(n).unwrap();
            assert!(goal.is_goal());
            assert_eq!(goal.hamming(), 0);
            assert_eq!(goal.manhattan(), 0);
        }

        assert_eq!(Board::goal(0), Err(BoardError::Empty));

        let goal = board(&[&[1, 2, 3], &[4, 5, 6], &[7, 8, 0]]);
        assert_eq!(goal, Board::goal(3).unwrap());
        assert!(goal.is_goal());
    }

    #[test]
    fn blank_placement_does_not_count() {
        let b = board(&[&[1, 2, 3], &[4, 5, 6], &[7, 0, 8]]);
        assert_eq!(b.hamming(), 1);
        assert_eq!(b.manhattan(), 1);
        assert!(!b.is_goal());
    }

    #[test]
    fn twin_swaps_first_adjacent_pair() {
        let goal = Board::goal(3).unwrap();
        assert_eq!(goal.twin(), board(&[&[2, 1, 3], &[4, 5, 6], &[7, 8, 0]]));

        let b = board(&[&[0, 1, 3], &[4, 2, 5], &[7, 8, 6]]);
        assert_eq!(b.twin(), board(&[&[0, 3, 1], &[4, 2, 5], &[7, 8, 6]]));

        let b = board(&[&[0, 1], &[2, 3]]);
        assert_eq!(b.twin(), board(&[&[0, 1], &[3, 2]]));

        let single = Board::goal(1).unwrap();
        assert_eq!(single.twin(), single);
    }

    #[test]
    fn twin_of_twin_is_original() {
        for tiles in (0..9u32).permutations(9).step_by(997) {
            let b = Board::from_tiles(3, tiles).unwrap();
            assert_ne!(b.twin(), b);
            assert_eq!(b.twin().twin(), b);
        }
    }

    #[test]
    fn neighbor_counts() {
        let corner = board(&[&[0, 1, 3], &[4, 2, 5], &[7, 8, 6]]);
        let edge = board(&[&[1, 0, 3], &[4, 2, 5], &[7, 8, 6]]);
        let center = board(&[&[8, 1, 3], &[4, 0, 2], &[7, 6, 5]]);
        assert_eq!(corner.neighbors().count(), 2);
        assert_eq!(edge.neighbors().count(), 3);
        assert_eq!(center.neighbors().count(), 4);
        assert_eq!(Board::goal(1).unwrap().neighbors().count(), 0);

        let expected: HashSet<Board> = [
            board(&[&[1, 0, 3], &[4, 2, 5], &[7, 8, 6]]),
            board(&[&[4, 1, 3], &[0, 2, 5], &[7, 8, 6]]),
        ]
        .into_iter()
        .collect();
        assert_eq!(corner.neighbors().collect::<HashSet<_>>(), expected);
    }

    #[test]
    fn neighbors_keep_distances_consistent() {
        let b = board(&[&[8, 1, 3], &[4, 0, 2], &[7, 6, 5]]);
        for next in b.neighbors() {
            let fresh = Board::from_tiles(3, next.tiles().to_vec()).unwrap();
            assert_eq!(next.hamming(), fresh.hamming());
            assert_eq!(next.manhattan(), fresh.manhattan());
            assert_eq!(next.manhattan().abs_diff(b.manhattan()), 1);

            let changed = b
                .tiles()
                .iter()
                .zip_eq(next.tiles())
                .filter(|(x, y)| x != y)
                .count();
            assert_eq!(changed, 2);
        }
    }

    #[test]
    fn equality() {
        let a = board(&[&[8, 1, 3], &[4, 0, 2], &[7, 6, 5]]);
        let b = Board::from_tiles(3, vec![8, 1, 3, 4, 0, 2, 7, 6, 5]).unwrap();
        let c = a.twin();

        assert_eq!(a, a);
        assert_eq!(a, b);
        assert_eq!(b, a);
        assert_ne!(a, c);
        assert_ne!(c, a);
        assert_ne!(Board::goal(2).unwrap(), Board::goal(3).unwrap());

        let set: HashSet<Board> = [a.clone(), b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display() {
        let b = board(&[&[0, 1, 3], &[4, 2, 5], &[7, 8, 6]]);
        assert_eq!(b.to_string(), "3\n 0  1  3\n 4  2  5\n 7  8  6");

        let wide = Board::goal(4).unwrap();
        assert_eq!(
            wide.to_string(),
            "4\n 1  2  3  4\n 5  6  7  8\n 9 10 11 12\n13 14 15  0"
        );
    }

    #[test]
    fn parity_splits_board_and_twin() {
        for tiles in (0..4u32).permutations(4) {
            let b = Board::from_tiles(2, tiles).unwrap();
            assert_ne!(b.is_solvable_by_parity(), b.twin().is_solvable_by_parity());
        }

        assert!(Board::goal(3).unwrap().is_solvable_by_parity());
        assert!(Board::goal(4).unwrap().is_solvable_by_parity());
        assert!(!board(&[&[1, 2, 3], &[4, 5, 6], &[8, 7, 0]]).is_solvable_by_parity());
        assert!(board(&[&[0, 1, 3], &[4, 2, 5], &[7, 8, 6]]).is_solvable_by_parity());
    }
}
