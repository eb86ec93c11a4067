//! Sudoku domain.
//!
//! Fills the empty cells of a 9×9 puzzle by swapping values between
//! non-given cells. A group (row, column or block) with `k` distinct values
//! contributes `9 - k` conflicts.

mod board;
mod domain;

pub use board::{Board, Cell, BLOCK, SIZE};
pub use domain::{CellSwap, SudokuDomain, SwapKey};
