//! Maze pathfinding as a tabu search domain.

use rand::Rng;

use super::grid::{Maze, Position};
use crate::tabu::{Acceptance, DeadEnd, Neighbor, TabuConfig, TabuDomain, TabuMemory};

/// Greedy walk towards the goal with tabu positions and backtracking.
///
/// The state is the walker's position. Each step moves to the open,
/// non-tabu adjacent cell closest to the goal by Manhattan distance (ties
/// in up, down, left, right order) and makes it tabu. Tabu memory starts
/// empty, so the walker may step back onto the start. At a dead end the
/// walker forbids its position and retreats to the cell it first came
/// from; a dead end at the start is final.
///
/// # Examples
///
/// ```
/// use u_tabu::maze::{Maze, MazeDomain};
/// use u_tabu::tabu::TabuRunner;
///
/// let maze = Maze::parse(&["S..", "#.#", "..G"]).unwrap();
/// let domain = MazeDomain::new(maze);
/// let result = TabuRunner::run(&domain, &MazeDomain::recommended_config()).unwrap();
/// assert!(result.is_solved());
/// assert_eq!(result.path.unwrap().len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct MazeDomain {
    maze: Maze,
}

impl MazeDomain {
    pub fn new(maze: Maze) -> Self {
        Self { maze }
    }

    /// Capacity 20, budget 10 000, four candidates per step.
    pub fn recommended_config() -> TabuConfig {
        TabuConfig::default()
            .with_tabu_capacity(20)
            .with_max_iterations(10_000)
            .with_batch_size(4)
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }
}

impl TabuDomain for MazeDomain {
    type State = Position;
    type Move = Position;
    const ACCEPTANCE: Acceptance = Acceptance::BestOfBatch;
    const RECORDS_PATH: bool = true;

    fn initial_state<R: Rng>(&self, _rng: &mut R) -> Position {
        self.maze.start()
    }

    /// Manhattan distance to the goal.
    fn conflicts(&self, pos: &Position) -> usize {
        pos.manhattan(self.maze.goal())
    }

    fn neighbors<R: Rng>(
        &self,
        pos: &Position,
        memory: &TabuMemory<Position>,
        _batch_size: usize,
        _rng: &mut R,
    ) -> Vec<Neighbor<Position, Position>> {
        self.maze
            .adjacent(*pos)
            .filter(|next| self.maze.is_open(*next) && !memory.contains(next))
            .map(|next| Neighbor::new(next, next))
            .collect()
    }

    fn dead_end(&self, pos: &Position) -> DeadEnd<Position> {
        DeadEnd::Backtrack(*pos)
    }

    fn is_goal(&self, pos: &Position) -> bool {
        *pos == self.maze.goal()
    }
}
