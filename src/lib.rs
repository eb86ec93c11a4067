//! Tabu search for discrete constraint problems.
//!
//! Provides one generic driver and three problem domains built on it:
//!
//! - **Tabu Search (TS)**: A step-wise driver with short-term memory (the
//!   tabu list), pluggable candidate acceptance, dead-end handling and
//!   optional predecessor recording for backtracking.
//! - **Schedule**: Timetabling of courses and teachers into (timeslot,
//!   room) cells, minimizing teacher and room double-bookings.
//! - **Sudoku**: Value swaps between non-given cells of a 9×9 puzzle,
//!   minimizing repeated values per row, column and block.
//! - **Maze**: Greedy grid walking towards a goal with tabu positions and
//!   backtracking out of dead ends.
//!
//! # Architecture
//!
//! Every domain implements [`tabu::TabuDomain`]; the driver owns the
//! search state and reports progress through [`tabu::Snapshot`]s, so
//! renderers stay outside the crate. Runs are single-threaded and
//! reproducible for a fixed seed.

pub mod error;
pub mod maze;
pub mod random;
pub mod schedule;
pub mod sudoku;
pub mod tabu;

pub use error::{Result, TabuError};
