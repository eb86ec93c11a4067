//! Tabu Search execution engine.
//!
//! # Algorithm
//!
//! 1. Build the initial state, record it as the best, start with empty
//!    tabu memory
//! 2. At each iteration:
//!    a. Ask the domain for a bounded sample of non-tabu neighbors
//!    b. Select one according to the domain's [`Acceptance`] policy and
//!    adopt it unconditionally, or handle the [`DeadEnd`] when the sample
//!    is empty (skip, backtrack, or stop)
//!    c. Push the move key into tabu memory, evicting the oldest entry
//!    d. Update the best record on strict improvement
//!    e. Emit a [`Snapshot`]
//! 3. Terminate on a goal state, an exhausted neighborhood, or the
//!    iteration budget
//!
//! There is no aspiration criterion: a tabu move is never admitted, even
//! when it would produce a new best.
//!
//! # Reference
//!
//! Glover, F. (1989). "Tabu Search—Part I", *ORSA Journal on Computing* 1(3), 190-206.

use std::collections::HashMap;

use rand::rngs::StdRng;
use tracing::{debug, info, trace};

use super::config::TabuConfig;
use super::memory::TabuMemory;
use super::types::{Acceptance, DeadEnd, Exhaustion, Neighbor, TabuDomain};
use crate::error::TabuError;
use crate::random::rng_from;

/// Lifecycle of a search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchStatus {
    /// The run can take further steps.
    Iterating,
    /// A goal state was reached.
    Converged,
    /// The iteration budget ran out.
    BudgetReached,
    /// No move and no backtrack target remained.
    Exhausted(Exhaustion),
}

impl SearchStatus {
    /// Whether no further steps will be taken.
    pub fn is_terminal(self) -> bool {
        !matches!(self, SearchStatus::Iterating)
    }
}

/// The transition applied in one step.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Change<M> {
    /// A neighbor was adopted through this move.
    Moved(M),
    /// The driver retreated to the predecessor, forbidding this key.
    Retreated(M),
    /// Every sampled move was tabu; the iteration was spent without moving.
    Skipped,
}

/// Read-only copy of the search state after one step, for renderers and
/// progress reporting.
#[derive(Debug, Clone)]
pub struct Snapshot<S, M> {
    /// Zero-based index of the step that produced this snapshot.
    pub iteration: usize,
    /// The current state after the step.
    pub state: S,
    /// Conflict count of `state`.
    pub conflicts: usize,
    /// Best conflict count seen so far.
    pub best_conflicts: usize,
    /// What the step did.
    pub change: Change<M>,
    /// Tabu memory contents, oldest first.
    pub tabu: Vec<M>,
}

/// Result of a Tabu Search run.
#[derive(Debug, Clone)]
pub struct TabuResult<S: Clone> {
    /// Best state found.
    pub best: S,
    /// Conflict count of the best state.
    pub best_conflicts: usize,
    /// Total iterations executed.
    pub iterations: usize,
    /// Zero-based index of the step that found the best state, matching
    /// [`Snapshot::iteration`]. Also 0 when the initial state is still the best.
    pub best_iteration: usize,
    /// How the run ended.
    pub status: SearchStatus,
    /// Every strictly improving `(state, conflicts)` pair, starting with the
    /// initial state.
    pub improvements: Vec<(S, usize)>,
    /// Best conflict count after each iteration.
    pub conflict_history: Vec<usize>,
    /// States from the initial state to the goal, for path-recording
    /// domains that converged.
    pub path: Option<Vec<S>>,
}

impl<S: Clone> TabuResult<S> {
    /// Whether the run reached a goal state.
    pub fn is_solved(&self) -> bool {
        self.status == SearchStatus::Converged
    }
}

/// Step-by-step tabu search driver.
///
/// Owns the current state, tabu memory and best record for one run. The
/// caller advances it with [`step`](Self::step) and may stop at any time;
/// [`finish`](Self::finish) turns whatever has been found into a result.
///
/// # Examples
///
/// ```
/// use u_tabu::sudoku::{Board, SudokuDomain};
/// use u_tabu::tabu::TabuSearch;
///
/// let domain = SudokuDomain::new(Board::empty()).unwrap();
/// let config = SudokuDomain::recommended_config().with_seed(7);
/// let mut search = TabuSearch::new(&domain, config).unwrap();
/// while let Some(snapshot) = search.step() {
///     assert!(snapshot.best_conflicts <= snapshot.conflicts);
/// }
/// let result = search.finish();
/// assert!(result.iterations <= 100);
/// ```
pub struct TabuSearch<'a, D: TabuDomain> {
    domain: &'a D,
    config: TabuConfig,
    rng: StdRng,
    origin: D::State,
    current: D::State,
    current_conflicts: usize,
    best: D::State,
    best_conflicts: usize,
    best_iteration: usize,
    memory: TabuMemory<D::Move>,
    // first-visit predecessor of every entered state; forms a tree rooted at `origin`
    predecessors: HashMap<D::State, D::State>,
    improvements: Vec<(D::State, usize)>,
    conflict_history: Vec<usize>,
    iteration: usize,
    status: SearchStatus,
}

impl<'a, D: TabuDomain> TabuSearch<'a, D> {
    /// Validates `config` and builds the initial state.
    pub fn new(domain: &'a D, config: TabuConfig) -> Result<Self, TabuError> {
        config.validate()?;

        let mut rng = rng_from(config.seed);
        let current = domain.initial_state(&mut rng);
        let conflicts = domain.conflicts(&current);

        info!(
            event = "search_start",
            conflicts,
            tabu_capacity = config.tabu_capacity,
            max_iterations = config.max_iterations,
            batch_size = config.batch_size,
        );

        let mut search = Self {
            domain,
            memory: TabuMemory::new(config.tabu_capacity),
            config,
            rng,
            origin: current.clone(),
            best: current.clone(),
            best_conflicts: conflicts,
            best_iteration: 0,
            improvements: vec![(current.clone(), conflicts)],
            current,
            current_conflicts: conflicts,
            predecessors: HashMap::new(),
            conflict_history: Vec::new(),
            iteration: 0,
            status: SearchStatus::Iterating,
        };
        if domain.is_goal(&search.current) {
            search.end(SearchStatus::Converged);
        }
        Ok(search)
    }

    /// Advances the search by one iteration.
    ///
    /// Returns `None` once the run is terminal. A dead end without
    /// recourse ends the run without producing a snapshot.
    pub fn step(&mut self) -> Option<Snapshot<D::State, D::Move>> {
        if self.status.is_terminal() {
            return None;
        }
        if self.iteration >= self.config.max_iterations {
            self.end(SearchStatus::BudgetReached);
            return None;
        }

        let candidates = self.domain.neighbors(
            &self.current,
            &self.memory,
            self.config.batch_size,
            &mut self.rng,
        );

        let change = match self.select(candidates) {
            Some((neighbor, conflicts)) => self.adopt(neighbor, conflicts),
            None => match self.domain.dead_end(&self.current) {
                DeadEnd::Retry => Change::Skipped,
                DeadEnd::Backtrack(key) => match self.predecessors.get(&self.current).cloned() {
                    Some(previous) => self.retreat(previous, key),
                    None => {
                        self.end(SearchStatus::Exhausted(Exhaustion::NoNeighbors));
                        return None;
                    }
                },
                DeadEnd::Stop(reason) => {
                    self.end(SearchStatus::Exhausted(reason));
                    return None;
                }
            },
        };

        let iteration = self.iteration;
        self.iteration += 1;
        self.conflict_history.push(self.best_conflicts);

        trace!(
            event = "step",
            iteration,
            conflicts = self.current_conflicts,
            best_conflicts = self.best_conflicts,
            change = ?change,
        );

        if self.domain.is_goal(&self.current) {
            self.end(SearchStatus::Converged);
        } else if self.iteration >= self.config.max_iterations {
            self.end(SearchStatus::BudgetReached);
        }

        Some(Snapshot {
            iteration,
            state: self.current.clone(),
            conflicts: self.current_conflicts,
            best_conflicts: self.best_conflicts,
            change,
            tabu: self.memory.iter().cloned().collect(),
        })
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn current(&self) -> &D::State {
        &self.current
    }

    pub fn current_conflicts(&self) -> usize {
        self.current_conflicts
    }

    pub fn best(&self) -> &D::State {
        &self.best
    }

    pub fn best_conflicts(&self) -> usize {
        self.best_conflicts
    }

    pub fn iterations(&self) -> usize {
        self.iteration
    }

    pub fn memory(&self) -> &TabuMemory<D::Move> {
        &self.memory
    }

    /// Reconstructs the states leading from the initial state to the
    /// current one. `None` for domains that do not record predecessors.
    pub fn path(&self) -> Option<Vec<D::State>> {
        if !D::RECORDS_PATH {
            return None;
        }
        let mut path = vec![self.current.clone()];
        let mut cursor = &self.current;
        while let Some(previous) = self.predecessors.get(cursor) {
            path.push(previous.clone());
            cursor = previous;
        }
        path.reverse();
        Some(path)
    }

    /// Consumes the driver and reports what was found.
    pub fn finish(self) -> TabuResult<D::State> {
        let path = if self.status == SearchStatus::Converged {
            self.path()
        } else {
            None
        };
        TabuResult {
            best: self.best,
            best_conflicts: self.best_conflicts,
            iterations: self.iteration,
            best_iteration: self.best_iteration,
            status: self.status,
            improvements: self.improvements,
            conflict_history: self.conflict_history,
            path,
        }
    }

    fn select(
        &self,
        candidates: Vec<Neighbor<D::State, D::Move>>,
    ) -> Option<(Neighbor<D::State, D::Move>, usize)> {
        let mut scored = candidates.into_iter().map(|neighbor| {
            let conflicts = self.domain.conflicts(&neighbor.state);
            (neighbor, conflicts)
        });
        match D::ACCEPTANCE {
            Acceptance::FirstSampled => scored.next(),
            // min_by_key keeps the first of equal minima
            Acceptance::BestOfBatch => scored.min_by_key(|&(_, conflicts)| conflicts),
        }
    }

    fn adopt(
        &mut self,
        neighbor: Neighbor<D::State, D::Move>,
        conflicts: usize,
    ) -> Change<D::Move> {
        let Neighbor { state, mv } = neighbor;
        if D::RECORDS_PATH && state != self.origin && !self.predecessors.contains_key(&state) {
            self.predecessors.insert(state.clone(), self.current.clone());
        }
        self.current = state;
        self.current_conflicts = conflicts;
        self.memory.push(mv.clone());
        self.record_if_improved();
        Change::Moved(mv)
    }

    fn retreat(&mut self, previous: D::State, key: D::Move) -> Change<D::Move> {
        debug!(
            event = "backtrack",
            iteration = self.iteration,
            from = ?self.current,
            to = ?previous,
        );
        self.memory.push(key.clone());
        self.current_conflicts = self.domain.conflicts(&previous);
        self.current = previous;
        self.record_if_improved();
        Change::Retreated(key)
    }

    fn record_if_improved(&mut self) {
        if self.current_conflicts < self.best_conflicts {
            debug!(
                event = "improvement",
                iteration = self.iteration,
                from = self.best_conflicts,
                to = self.current_conflicts,
            );
            self.best = self.current.clone();
            self.best_conflicts = self.current_conflicts;
            self.best_iteration = self.iteration;
            self.improvements
                .push((self.current.clone(), self.current_conflicts));
        }
    }

    fn end(&mut self, status: SearchStatus) {
        self.status = status;
        info!(
            event = "search_end",
            status = ?status,
            iterations = self.iteration,
            best_conflicts = self.best_conflicts,
            best_iteration = self.best_iteration,
        );
    }
}

/// Runs a search to completion.
pub struct TabuRunner;

impl TabuRunner {
    /// Executes Tabu Search on the given domain.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_tabu::schedule::{Catalog, ScheduleDomain};
    /// use u_tabu::tabu::TabuRunner;
    ///
    /// let domain = ScheduleDomain::new(Catalog::default());
    /// let config = ScheduleDomain::recommended_config().with_seed(42);
    /// let result = TabuRunner::run(&domain, &config).unwrap();
    /// assert!(result.iterations <= 100);
    /// ```
    pub fn run<D: TabuDomain>(
        domain: &D,
        config: &TabuConfig,
    ) -> Result<TabuResult<D::State>, TabuError> {
        Self::run_with_observer(domain, config, |_| {})
    }

    /// Executes Tabu Search, handing every snapshot to `observer` before
    /// the next step begins.
    pub fn run_with_observer<D, F>(
        domain: &D,
        config: &TabuConfig,
        mut observer: F,
    ) -> Result<TabuResult<D::State>, TabuError>
    where
        D: TabuDomain,
        F: FnMut(&Snapshot<D::State, D::Move>),
    {
        let mut search = TabuSearch::new(domain, config.clone())?;
        while let Some(snapshot) = search.step() {
            observer(&snapshot);
        }
        Ok(search.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    // ---- Integer walk towards a target ----

    struct LineWalk {
        start: i32,
        target: i32,
    }

    impl TabuDomain for LineWalk {
        type State = i32;
        type Move = i32;
        const ACCEPTANCE: Acceptance = Acceptance::BestOfBatch;

        fn initial_state<R: Rng>(&self, _rng: &mut R) -> i32 {
            self.start
        }

        fn conflicts(&self, &x: &i32) -> usize {
            (self.target - x).unsigned_abs() as usize
        }

        fn neighbors<R: Rng>(
            &self,
            &x: &i32,
            memory: &TabuMemory<i32>,
            _batch_size: usize,
            _rng: &mut R,
        ) -> Vec<Neighbor<i32, i32>> {
            [x - 1, x + 1]
                .into_iter()
                .filter(|n| !memory.contains(n))
                .map(|n| Neighbor::new(n, n))
                .collect()
        }

        fn dead_end(&self, _x: &i32) -> DeadEnd<i32> {
            DeadEnd::Stop(Exhaustion::NoNeighbors)
        }
    }

    #[test]
    fn test_tabu_line_walk_converges() {
        let domain = LineWalk {
            start: 0,
            target: 10,
        };
        let config = TabuConfig::default().with_tabu_capacity(3).with_seed(42);

        let result = TabuRunner::run(&domain, &config).unwrap();

        assert_eq!(result.status, SearchStatus::Converged);
        assert_eq!(result.best, 10);
        assert_eq!(result.best_conflicts, 0);
        assert_eq!(result.iterations, 10);
        assert_eq!(result.best_iteration, 9);
        assert!(result.path.is_none());
    }

    #[test]
    fn test_tabu_conflict_history_non_increasing() {
        let domain = LineWalk {
            start: -20,
            target: 7,
        };
        let config = TabuConfig::default().with_max_iterations(15).with_seed(1);

        let result = TabuRunner::run(&domain, &config).unwrap();

        assert_eq!(result.conflict_history.len(), result.iterations);
        for window in result.conflict_history.windows(2) {
            assert!(
                window[1] <= window[0],
                "best conflicts should be non-increasing: {} > {}",
                window[1],
                window[0]
            );
        }
        for window in result.improvements.windows(2) {
            assert!(window[1].1 < window[0].1);
        }
    }

    #[test]
    fn test_tabu_budget_reached() {
        let domain = LineWalk {
            start: 0,
            target: 100,
        };
        let config = TabuConfig::default().with_max_iterations(5).with_seed(42);

        let result = TabuRunner::run(&domain, &config).unwrap();

        assert_eq!(result.status, SearchStatus::BudgetReached);
        assert_eq!(result.iterations, 5);
        assert_eq!(result.best, 5);
        assert!(!result.is_solved());
    }

    #[test]
    fn test_tabu_initial_goal_takes_no_steps() {
        let domain = LineWalk {
            start: 3,
            target: 3,
        };
        let mut search = TabuSearch::new(&domain, TabuConfig::default().with_seed(42)).unwrap();

        assert_eq!(search.status(), SearchStatus::Converged);
        assert!(search.step().is_none());
        let result = search.finish();
        assert_eq!(result.iterations, 0);
        assert_eq!(result.improvements, vec![(3, 0)]);
    }

    #[test]
    fn test_tabu_invalid_config_rejected() {
        let domain = LineWalk {
            start: 0,
            target: 1,
        };
        let config = TabuConfig::default().with_tabu_capacity(0);
        assert!(matches!(
            TabuRunner::run(&domain, &config),
            Err(TabuError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_tabu_observer_sees_every_step() {
        let domain = LineWalk {
            start: 0,
            target: 4,
        };
        let config = TabuConfig::default().with_tabu_capacity(2).with_seed(42);
        let mut seen = Vec::new();

        let result = TabuRunner::run_with_observer(&domain, &config, |snapshot| {
            seen.push((snapshot.iteration, snapshot.state, snapshot.change.clone()));
            assert!(snapshot.tabu.len() <= 2);
        })
        .unwrap();

        assert_eq!(result.iterations, seen.len());
        assert_eq!(
            seen,
            vec![
                (0, 1, Change::Moved(1)),
                (1, 2, Change::Moved(2)),
                (2, 3, Change::Moved(3)),
                (3, 4, Change::Moved(4)),
            ]
        );
    }

    // ---- Fixed candidate lists for selection policy checks ----

    struct FixedCandidates<const FIRST: bool>;

    impl<const FIRST: bool> TabuDomain for FixedCandidates<FIRST> {
        type State = u8;
        type Move = char;
        const ACCEPTANCE: Acceptance = if FIRST {
            Acceptance::FirstSampled
        } else {
            Acceptance::BestOfBatch
        };

        fn initial_state<R: Rng>(&self, _rng: &mut R) -> u8 {
            0
        }

        fn conflicts(&self, &s: &u8) -> usize {
            match s {
                0 => 4,
                1 => 5,
                2 => 3,
                3 => 3,
                _ => 9,
            }
        }

        fn neighbors<R: Rng>(
            &self,
            _s: &u8,
            _memory: &TabuMemory<char>,
            _batch_size: usize,
            _rng: &mut R,
        ) -> Vec<Neighbor<u8, char>> {
            vec![
                Neighbor::new(1, 'a'),
                Neighbor::new(2, 'b'),
                Neighbor::new(3, 'c'),
            ]
        }

        fn dead_end(&self, _s: &u8) -> DeadEnd<char> {
            DeadEnd::Retry
        }
    }

    #[test]
    fn test_best_of_batch_first_minimum_wins() {
        let domain = FixedCandidates::<false>;
        let mut search = TabuSearch::new(&domain, TabuConfig::default().with_seed(42)).unwrap();

        let snapshot = search.step().unwrap();
        assert_eq!(snapshot.state, 2);
        assert_eq!(snapshot.change, Change::Moved('b'));
        assert_eq!(snapshot.best_conflicts, 3);
    }

    #[test]
    fn test_first_sampled_adopts_worse_candidate() {
        let domain = FixedCandidates::<true>;
        let mut search = TabuSearch::new(&domain, TabuConfig::default().with_seed(42)).unwrap();

        let snapshot = search.step().unwrap();
        assert_eq!(snapshot.state, 1);
        assert_eq!(snapshot.conflicts, 5);
        assert_eq!(snapshot.best_conflicts, 4);
        assert_eq!(*search.best(), 0);
    }

    // ---- Dead-end handling ----

    struct NoMoves(DeadEnd<()>);

    impl TabuDomain for NoMoves {
        type State = u8;
        type Move = ();
        const ACCEPTANCE: Acceptance = Acceptance::BestOfBatch;

        fn initial_state<R: Rng>(&self, _rng: &mut R) -> u8 {
            1
        }

        fn conflicts(&self, &s: &u8) -> usize {
            s as usize
        }

        fn neighbors<R: Rng>(
            &self,
            _s: &u8,
            _memory: &TabuMemory<()>,
            _batch_size: usize,
            _rng: &mut R,
        ) -> Vec<Neighbor<u8, ()>> {
            vec![]
        }

        fn dead_end(&self, _s: &u8) -> DeadEnd<()> {
            self.0.clone()
        }
    }

    #[test]
    fn test_dead_end_stop_exhausts() {
        let domain = NoMoves(DeadEnd::Stop(Exhaustion::InsufficientMutableCells));
        let result = TabuRunner::run(&domain, &TabuConfig::default().with_seed(42)).unwrap();

        assert_eq!(
            result.status,
            SearchStatus::Exhausted(Exhaustion::InsufficientMutableCells)
        );
        assert_eq!(result.iterations, 0);
        assert_eq!(result.best_conflicts, 1);
    }

    #[test]
    fn test_dead_end_retry_spends_budget() {
        let domain = NoMoves(DeadEnd::Retry);
        let config = TabuConfig::default().with_max_iterations(7).with_seed(42);
        let mut skipped = 0;

        let result = TabuRunner::run_with_observer(&domain, &config, |snapshot| {
            assert_eq!(snapshot.change, Change::Skipped);
            skipped += 1;
        })
        .unwrap();

        assert_eq!(result.status, SearchStatus::BudgetReached);
        assert_eq!(skipped, 7);
        assert_eq!(result.conflict_history, vec![1; 7]);
    }

    #[test]
    fn test_backtrack_without_predecessor_exhausts() {
        let domain = NoMoves(DeadEnd::Backtrack(()));
        let result = TabuRunner::run(&domain, &TabuConfig::default().with_seed(42)).unwrap();

        assert_eq!(
            result.status,
            SearchStatus::Exhausted(Exhaustion::NoNeighbors)
        );
        assert!(result.path.is_none());
    }
}
