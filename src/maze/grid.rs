//! Maze grids.

use rand::Rng;

use crate::error::TabuError;

/// A cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance to `other`.
    pub fn manhattan(self, other: Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

/// What occupies a cell. Never changes during a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellKind {
    Empty,
    Obstacle,
    Start,
    Goal,
}

// up, down, left, right
const STEPS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// A rectangular maze with one start and one goal.
///
/// Start and goal may coincide.
///
/// # Examples
///
/// ```
/// use u_tabu::maze::{CellKind, Maze, Position};
///
/// let maze = Maze::parse(&[
///     "S.#",
///     "..G",
/// ]).unwrap();
/// assert_eq!(maze.start(), Position::new(0, 0));
/// assert_eq!(maze.goal(), Position::new(1, 2));
/// assert_eq!(maze.kind(Position::new(0, 2)), Some(CellKind::Obstacle));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Maze {
    rows: usize,
    cols: usize,
    obstacles: Vec<bool>,
    start: Position,
    goal: Position,
}

impl Maze {
    /// Creates an obstacle-free maze.
    pub fn new(
        rows: usize,
        cols: usize,
        start: Position,
        goal: Position,
    ) -> Result<Self, TabuError> {
        if rows == 0 || cols == 0 {
            return Err(TabuError::InvalidGrid(format!(
                "grid must be at least 1x1, got {rows}x{cols}"
            )));
        }
        let maze = Self {
            rows,
            cols,
            obstacles: vec![false; rows * cols],
            start,
            goal,
        };
        for (name, pos) in [("start", start), ("goal", goal)] {
            if !maze.contains(pos) {
                return Err(TabuError::InvalidGrid(format!(
                    "{name} ({}, {}) is outside a {rows}x{cols} grid",
                    pos.row, pos.col
                )));
            }
        }
        Ok(maze)
    }

    /// Parses rows of `.` (empty), `#` (obstacle), `S` (start), `G` (goal)
    /// and `*` (start and goal on the same cell).
    pub fn parse(lines: &[&str]) -> Result<Self, TabuError> {
        let rows = lines.len();
        let cols = lines.first().map_or(0, |line| line.chars().count());
        let mut start = None;
        let mut goal = None;
        let mut obstacles = Vec::with_capacity(rows * cols);

        for (row, line) in lines.iter().enumerate() {
            if line.chars().count() != cols {
                return Err(TabuError::InvalidGrid(format!(
                    "row {row} has {} cells, expected {cols}",
                    line.chars().count()
                )));
            }
            for (col, ch) in line.chars().enumerate() {
                let here = Position::new(row, col);
                match ch {
                    '.' => {}
                    '#' => {}
                    'S' => set_once(&mut start, here, "start")?,
                    'G' => set_once(&mut goal, here, "goal")?,
                    '*' => {
                        set_once(&mut start, here, "start")?;
                        set_once(&mut goal, here, "goal")?;
                    }
                    other => {
                        return Err(TabuError::InvalidGrid(format!(
                            "unknown cell '{other}' at ({row}, {col})"
                        )))
                    }
                }
                obstacles.push(ch == '#');
            }
        }

        let start = start.ok_or_else(|| TabuError::InvalidGrid("missing start 'S'".into()))?;
        let goal = goal.ok_or_else(|| TabuError::InvalidGrid("missing goal 'G'".into()))?;
        let mut maze = Self::new(rows, cols, start, goal)?;
        maze.obstacles = obstacles;
        Ok(maze)
    }

    /// Generates a random maze.
    ///
    /// The start lies in the upper-left quadrant and the goal 3 or more
    /// rows and columns further (clamped to the grid). Cells in the
    /// rectangle spanned by start and goal become obstacles with
    /// probability 0.2, then every remaining empty cell with probability
    /// 0.3. A path is not guaranteed to exist.
    pub fn random<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Result<Self, TabuError> {
        if rows == 0 || cols == 0 {
            return Err(TabuError::InvalidGrid(format!(
                "grid must be at least 1x1, got {rows}x{cols}"
            )));
        }
        let start = Position::new(rng.random_range(0..=rows / 2), rng.random_range(0..=cols / 2));
        let goal = Position::new(
            (start.row + rng.random_range(3..=(rows / 3).max(3))).min(rows - 1),
            (start.col + rng.random_range(3..=(cols / 3).max(3))).min(cols - 1),
        );
        let mut maze = Self::new(rows, cols, start, goal)?;

        for row in start.row.min(goal.row)..=start.row.max(goal.row) {
            for col in start.col.min(goal.col)..=start.col.max(goal.col) {
                maze.scatter(Position::new(row, col), 0.2, rng);
            }
        }
        for row in 0..rows {
            for col in 0..cols {
                maze.scatter(Position::new(row, col), 0.3, rng);
            }
        }
        Ok(maze)
    }

    /// Places an obstacle. Start and goal cannot be blocked.
    pub fn set_obstacle(&mut self, pos: Position) -> Result<(), TabuError> {
        match self.kind(pos) {
            None => Err(TabuError::InvalidGrid(format!(
                "({}, {}) is outside a {}x{} grid",
                pos.row, pos.col, self.rows, self.cols
            ))),
            Some(CellKind::Start | CellKind::Goal) => Err(TabuError::InvalidGrid(format!(
                "cannot block start or goal at ({}, {})",
                pos.row, pos.col
            ))),
            Some(_) => {
                let index = self.index(pos);
                self.obstacles[index] = true;
                Ok(())
            }
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Kind of the cell at `pos`, or `None` outside the grid.
    ///
    /// When start and goal coincide the cell reports [`CellKind::Goal`].
    pub fn kind(&self, pos: Position) -> Option<CellKind> {
        if !self.contains(pos) {
            None
        } else if pos == self.goal {
            Some(CellKind::Goal)
        } else if pos == self.start {
            Some(CellKind::Start)
        } else if self.obstacles[self.index(pos)] {
            Some(CellKind::Obstacle)
        } else {
            Some(CellKind::Empty)
        }
    }

    /// Whether `pos` is inside the grid and not an obstacle.
    pub fn is_open(&self, pos: Position) -> bool {
        matches!(self.kind(pos), Some(kind) if kind != CellKind::Obstacle)
    }

    /// In-bounds orthogonal neighbors in up, down, left, right order.
    pub fn adjacent(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        STEPS.iter().filter_map(move |&(dr, dc)| {
            let row = pos.row.checked_add_signed(dr)?;
            let col = pos.col.checked_add_signed(dc)?;
            let next = Position::new(row, col);
            self.contains(next).then_some(next)
        })
    }

    fn index(&self, pos: Position) -> usize {
        pos.row * self.cols + pos.col
    }

    fn scatter<R: Rng>(&mut self, pos: Position, probability: f64, rng: &mut R) {
        if self.kind(pos) == Some(CellKind::Empty) && rng.random_bool(probability) {
            let index = self.index(pos);
            self.obstacles[index] = true;
        }
    }
}

fn set_once(slot: &mut Option<Position>, pos: Position, name: &str) -> Result<(), TabuError> {
    if slot.replace(pos).is_some() {
        return Err(TabuError::InvalidGrid(format!("more than one {name}")));
    }
    Ok(())
}
