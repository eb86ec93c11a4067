//! Error types.
//!
//! Only construction and configuration can fail. Search outcomes such as
//! dead ends or an exhausted iteration budget are reported through
//! [`SearchStatus`](crate::tabu::SearchStatus), never as errors.

use thiserror::Error;

/// Main error type for u-tabu operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TabuError {
    /// A search parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A maze grid, start or goal is malformed.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// A Sudoku puzzle has an out-of-range digit or contradictory givens.
    #[error("invalid puzzle: {0}")]
    InvalidPuzzle(String),

    /// A timetable catalog or entry list is malformed.
    #[error("invalid timetable: {0}")]
    InvalidTimetable(String),
}

/// Result type alias for u-tabu operations.
pub type Result<T> = std::result::Result<T, TabuError>;
