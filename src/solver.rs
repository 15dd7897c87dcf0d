use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashSet},
};

use auto_enums::auto_enum;
use log::debug;
use smallvec::SmallVec;
use thiserror::Error;

use crate::board::Board;

/// How a search avoids re-enqueueing boards it has already dealt with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pruning {
    /// Skip only the board we just came from.
    #[default]
    Predecessor,
    /// Expand every board at most once. Same move counts, but ties between
    /// equally short solutions may resolve differently.
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolverConfig {
    pub pruning: Pruning,
    /// Give up once this many nodes have been expanded across both searches.
    pub max_expansions: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("no verdict after expanding {limit} search nodes")]
    ExpansionLimit { limit: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    /// Nodes popped and expanded.
    pub expanded: usize,
    /// Successor nodes pushed.
    pub generated: usize,
}

struct Node {
    board: Board,
    moves: usize,
    parent: Option<usize>,
}

enum Step {
    Goal(usize),
    Pending,
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Original,
    Twin,
}

// one A* run; nodes live in an arena and link back to their parent by index
struct Search {
    nodes: Vec<Node>,
    // (moves + manhattan, arena index); the index breaks ties by insertion order
    queue: BinaryHeap<Reverse<(usize, usize)>>,
    closed: HashSet<Board>,
}

impl Search {
    fn new(start: Board) -> Search {
        let mut search = Search {
            nodes: Vec::new(),
            queue: BinaryHeap::new(),
            closed: HashSet::new(),
        };
        search.push(start, 0, None);
        search
    }

    fn push(&mut self, board: Board, moves: usize, parent: Option<usize>) {
        let priority = moves + board.manhattan() as usize;
        let ix = self.nodes.len();
        self.nodes.push(Node {
            board,
            moves,
            parent,
        });
        self.queue.push(Reverse((priority, ix)));
    }

    fn expand(&mut self, pruning: Pruning, stats: &mut Stats) -> Step {
        let ix = match self.queue.pop() {
            Some(Reverse((_, ix))) => ix,
            None => return Step::Exhausted,
        };

        if pruning == Pruning::Closed && !self.closed.insert(self.nodes[ix].board.clone()) {
            return Step::Pending;
        }

        stats.expanded += 1;
        if self.nodes[ix].board.is_goal() {
            return Step::Goal(ix);
        }

        let moves = self.nodes[ix].moves + 1;
        let next: SmallVec<[Board; 4]> =
            successors(&self.nodes, ix, &self.closed, pruning).collect();
        stats.generated += next.len();
        for board in next {
            self.push(board, moves, Some(ix));
        }

        Step::Pending
    }

    fn path(&self, mut ix: usize) -> Vec<Board> {
        let mut boards = vec![self.nodes[ix].board.clone()];
        while let Some(parent) = self.nodes[ix].parent {
            ix = parent;
            boards.push(self.nodes[ix].board.clone());
        }

        boards.reverse();
        boards
    }
}

#[auto_enum(Iterator)]
fn successors<'a>(
    nodes: &'a [Node],
    ix: usize,
    closed: &'a HashSet<Board>,
    pruning: Pruning,
) -> impl Iterator<Item = Board> + 'a {
    let node = &nodes[ix];
    let previous = node.parent.map(|p| &nodes[p].board);
    match pruning {
        Pruning::Predecessor => node.board.neighbors().filter(move |b| Some(b) != previous),
        Pruning::Closed => node.board.neighbors().filter(move |b| !closed.contains(b)),
    }
}

/// Solves a board by racing A* on it against A* on its twin.
///
/// Exactly one of the two can reach the goal, so whichever search gets
/// there first settles whether the board is solvable. The search runs to
/// completion inside the constructor.
pub struct Solver {
    solution: Option<Vec<Board>>,
    stats: Stats,
}

impl Solver {
    pub fn new(initial: Board) -> Solver {
        match Solver::with_config(initial, SolverConfig::default()) {
            Ok(solver) => solver,
            Err(SolveError::ExpansionLimit { .. }) => unreachable!(),
        }
    }

    pub fn with_config(initial: Board, config: SolverConfig) -> Result<Solver, SolveError> {
        debug!(
            "solving {0}x{0} board, manhattan {1}, {2:?} pruning",
            initial.dimension(),
            initial.manhattan(),
            config.pruning
        );

        let twin = initial.twin();
        let mut searches = [
            (Side::Original, Search::new(initial)),
            (Side::Twin, Search::new(twin)),
        ];
        let mut stats = Stats::default();

        let winner = 'race: loop {
            let mut exhausted = true;
            for (side, search) in searches.iter_mut() {
                match search.expand(config.pruning, &mut stats) {
                    Step::Goal(ix) => break 'race Some((*side, ix)),
                    Step::Pending => exhausted = false,
                    Step::Exhausted => {}
                }

                if let Some(limit) = config.max_expansions {
                    if stats.expanded >= limit {
                        debug!("giving up after {} expansions", stats.expanded);
                        return Err(SolveError::ExpansionLimit { limit });
                    }
                }
            }

            // both queues ran dry, which a well-formed board never does
            if exhausted {
                break None;
            }
        };

        let solution = match winner {
            Some((Side::Original, ix)) => Some(searches[0].1.path(ix)),
            _ => None,
        };

        debug!(
            "{} after expanding {} nodes (generated {})",
            match &solution {
                Some(path) => format!("solved in {} moves", path.len() - 1),
                None => "unsolvable".to_string(),
            },
            stats.expanded,
            stats.generated
        );

        Ok(Solver { solution, stats })
    }

    pub fn is_solvable(&self) -> bool {
        self.solution.is_some()
    }

    /// Minimum number of slides to the goal, or `None` if there is none.
    pub fn moves(&self) -> Option<usize> {
        self.solution.as_ref().map(|path| path.len() - 1)
    }

    /// Every board from the initial one to the goal, inclusive.
    pub fn solution(&self) -> Option<&[Board]> {
        self.solution.as_deref()
    }

    pub fn into_solution(self) -> Option<Vec<Board>> {
        self.solution
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }
}
