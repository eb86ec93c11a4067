//! Grid maze pathfinding domain.
//!
//! A walker moves between orthogonally adjacent open cells, guided by the
//! Manhattan distance to the goal. Conflicts here are that distance, so a
//! reached goal scores 0.

mod domain;
mod grid;

pub use domain::MazeDomain;
pub use grid::{CellKind, Maze, Position};
