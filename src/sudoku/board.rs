//! 9×9 Sudoku boards.

use std::fmt;

use crate::error::TabuError;

/// Side length of the board.
pub const SIZE: usize = 9;
/// Side length of a block.
pub const BLOCK: usize = 3;

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A 9×9 grid of digits, 0 meaning empty.
///
/// # Examples
///
/// ```
/// use u_tabu::sudoku::Board;
///
/// let board = Board::parse(
///     "534678912 672195348 198342567 859761423 426853791
///      713924856 961537284 287419635 345286179",
/// ).unwrap();
/// assert_eq!(board.conflicts(), 0);
/// assert!(board.is_solved());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Board {
    cells: [[u8; SIZE]; SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    /// A board with every cell empty.
    pub const fn empty() -> Self {
        Self {
            cells: [[0; SIZE]; SIZE],
        }
    }

    /// Wraps a digit grid, rejecting values above 9.
    pub fn new(cells: [[u8; SIZE]; SIZE]) -> Result<Self, TabuError> {
        for (row, line) in cells.iter().enumerate() {
            for (col, &digit) in line.iter().enumerate() {
                check_digit(Cell::new(row, col), digit)?;
            }
        }
        Ok(Self { cells })
    }

    /// Parses 81 cells from digits, with `0` or `.` for empty.
    /// Whitespace is ignored.
    pub fn parse(text: &str) -> Result<Self, TabuError> {
        let mut cells = [[0; SIZE]; SIZE];
        let mut count = 0;
        for ch in text.chars().filter(|c| !c.is_whitespace()) {
            let digit = match ch {
                '.' => 0,
                '0'..='9' => ch as u8 - b'0',
                other => {
                    return Err(TabuError::InvalidPuzzle(format!(
                        "unexpected character '{other}'"
                    )))
                }
            };
            if count < SIZE * SIZE {
                cells[count / SIZE][count % SIZE] = digit;
            }
            count += 1;
        }
        if count != SIZE * SIZE {
            return Err(TabuError::InvalidPuzzle(format!(
                "expected 81 cells, found {count}"
            )));
        }
        Ok(Self { cells })
    }

    pub fn get(&self, cell: Cell) -> u8 {
        self.cells[cell.row][cell.col]
    }

    /// Writes `digit` (0 to clear) into `cell`.
    pub fn set(&mut self, cell: Cell, digit: u8) -> Result<(), TabuError> {
        if cell.row >= SIZE || cell.col >= SIZE {
            return Err(TabuError::InvalidPuzzle(format!(
                "cell ({}, {}) is outside the board",
                cell.row, cell.col
            )));
        }
        check_digit(cell, digit)?;
        self.put(cell, digit);
        Ok(())
    }

    /// Checks every cell, for boards that bypassed the constructors.
    pub fn validate(&self) -> Result<(), TabuError> {
        Self::new(self.cells).map(|_| ())
    }

    pub fn rows(&self) -> &[[u8; SIZE]; SIZE] {
        &self.cells
    }

    pub fn swap(&mut self, a: Cell, b: Cell) {
        let tmp = self.get(a);
        self.put(a, self.get(b));
        self.put(b, tmp);
    }

    // callers guarantee `digit <= 9`
    pub(crate) fn put(&mut self, cell: Cell, digit: u8) {
        self.cells[cell.row][cell.col] = digit;
    }

    /// Empty cells in row-major order.
    pub fn empty_cells(&self) -> Vec<Cell> {
        all_cells().filter(|&cell| self.get(cell) == 0).collect()
    }

    /// Whether `digit` appears nowhere in the row, column or block of `cell`.
    pub fn is_legal(&self, cell: Cell, digit: u8) -> bool {
        let (top, left) = block_origin(cell);
        let in_row = self.cells[cell.row].contains(&digit);
        let in_col = (0..SIZE).any(|row| self.cells[row][cell.col] == digit);
        let in_block = (top..top + BLOCK)
            .any(|row| (left..left + BLOCK).any(|col| self.cells[row][col] == digit));
        !(in_row || in_col || in_block)
    }

    /// Sums `9 - distinct values` over all rows, columns and blocks.
    ///
    /// Empty cells count as the value 0. A solved board scores 0; a board
    /// of one repeated value scores 27 × 8 = 216.
    pub fn conflicts(&self) -> usize {
        let mut total = 0;
        for i in 0..SIZE {
            total += SIZE - distinct((0..SIZE).map(|col| self.cells[i][col]));
            total += SIZE - distinct((0..SIZE).map(|row| self.cells[row][i]));
        }
        for top in (0..SIZE).step_by(BLOCK) {
            for left in (0..SIZE).step_by(BLOCK) {
                let block = (top..top + BLOCK)
                    .flat_map(|row| (left..left + BLOCK).map(move |col| (row, col)))
                    .map(|(row, col)| self.cells[row][col]);
                total += SIZE - distinct(block);
            }
        }
        total
    }

    /// Whether every cell is filled and no group repeats a digit.
    pub fn is_solved(&self) -> bool {
        self.empty_cells().is_empty() && self.conflicts() == 0
    }

    /// Repeatedly fills empty cells that admit exactly one legal digit,
    /// until a full pass changes nothing. Returns the filled cells in
    /// fill order.
    pub fn fill_singles(&mut self) -> Vec<Cell> {
        let candidates = self.empty_cells();
        let mut filled = Vec::new();
        let mut progress = true;
        while progress {
            progress = false;
            for &cell in &candidates {
                if self.get(cell) != 0 {
                    continue;
                }
                let mut legal = (1..=9).filter(|&digit| self.is_legal(cell, digit));
                if let (Some(digit), None) = (legal.next(), legal.next()) {
                    self.put(cell, digit);
                    filled.push(cell);
                    progress = true;
                }
            }
        }
        filled
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, line) in self.cells.iter().enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            for &digit in line {
                if digit == 0 {
                    write!(f, ".")?;
                } else {
                    write!(f, "{digit}")?;
                }
            }
        }
        Ok(())
    }
}

fn all_cells() -> impl Iterator<Item = Cell> {
    (0..SIZE).flat_map(|row| (0..SIZE).map(move |col| Cell::new(row, col)))
}

fn block_origin(cell: Cell) -> (usize, usize) {
    (BLOCK * (cell.row / BLOCK), BLOCK * (cell.col / BLOCK))
}

fn check_digit(cell: Cell, digit: u8) -> Result<(), TabuError> {
    if digit > 9 {
        return Err(TabuError::InvalidPuzzle(format!(
            "digit {digit} at ({}, {}) is out of range",
            cell.row, cell.col
        )));
    }
    Ok(())
}

// out-of-range values share one bit
fn distinct(values: impl Iterator<Item = u8>) -> usize {
    values
        .fold(0u16, |seen, value| seen | (1 << value.min(10)))
        .count_ones() as usize
}
