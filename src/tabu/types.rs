//! Core trait for Tabu Search domains.

use std::fmt::Debug;
use std::hash::Hash;

use rand::Rng;

use super::memory::TabuMemory;

/// A candidate reachable from the current state by one local move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbor<S, M> {
    /// The state after applying `mv`.
    pub state: S,
    /// The move descriptor, recorded in tabu memory if the candidate is adopted.
    pub mv: M,
}

impl<S, M> Neighbor<S, M> {
    pub fn new(state: S, mv: M) -> Self {
        Self { state, mv }
    }
}

/// How the driver picks the next state among the generated candidates.
///
/// Neither policy overrides the tabu restriction: tabu candidates are
/// filtered out by the generator before selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Acceptance {
    /// Adopt the first generated candidate regardless of its conflict count.
    ///
    /// With a single sample per iteration this is a random walk
    /// constrained only by recency.
    FirstSampled,
    /// Score every candidate and adopt the lowest-conflict one, even when
    /// it is worse than the current state. Ties go to the earliest
    /// generated candidate.
    BestOfBatch,
}

/// Why a run ended without reaching a goal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Exhaustion {
    /// Every move is tabu or blocked and no backtrack target remains.
    NoNeighbors,
    /// Fewer than two mutable entries exist, so no swap can be formed.
    InsufficientMutableCells,
}

/// What the driver does when the generator yields no candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeadEnd<M> {
    /// Consume the iteration without moving; a fresh sample follows.
    Retry,
    /// Retreat to the recorded predecessor, forbidding the current state
    /// with the given key. Without a predecessor the run is exhausted.
    Backtrack(M),
    /// End the run.
    Stop(Exhaustion),
}

/// Defines a problem for the tabu search driver.
///
/// A domain supplies the initial state, a bounded neighbor sample, and a
/// non-negative conflict count where 0 marks a goal. The driver owns the
/// current state, tabu memory and best record.
///
/// # Examples
///
/// ```
/// use rand::Rng;
/// use u_tabu::tabu::{Acceptance, DeadEnd, Neighbor, TabuDomain, TabuMemory};
///
/// /// Walk an integer towards 10.
/// struct Walk;
///
/// impl TabuDomain for Walk {
///     type State = i32;
///     type Move = i32;
///     const ACCEPTANCE: Acceptance = Acceptance::BestOfBatch;
///
///     fn initial_state<R: Rng>(&self, _rng: &mut R) -> i32 { 0 }
///
///     fn conflicts(&self, x: &i32) -> usize { (10 - x).unsigned_abs() as usize }
///
///     fn neighbors<R: Rng>(
///         &self,
///         x: &i32,
///         memory: &TabuMemory<i32>,
///         _batch_size: usize,
///         _rng: &mut R,
///     ) -> Vec<Neighbor<i32, i32>> {
///         [x - 1, x + 1]
///             .into_iter()
///             .filter(|n| !memory.contains(n))
///             .map(|n| Neighbor::new(n, n))
///             .collect()
///     }
///
///     fn dead_end(&self, _x: &i32) -> DeadEnd<i32> { DeadEnd::Retry }
/// }
/// ```
pub trait TabuDomain {
    /// Snapshot of the assignment being searched.
    type State: Clone + Eq + Hash + Debug;

    /// Move descriptor stored in tabu memory.
    type Move: Clone + Eq + Hash + Debug;

    /// Candidate selection policy.
    const ACCEPTANCE: Acceptance;

    /// Whether the driver records a predecessor for every newly entered
    /// state, enabling [`DeadEnd::Backtrack`] and path reconstruction.
    const RECORDS_PATH: bool = false;

    /// Creates the starting state.
    fn initial_state<R: Rng>(&self, rng: &mut R) -> Self::State;

    /// Counts constraint violations (or distance to goal). 0 is a goal.
    ///
    /// Must be pure: candidates are scored before any is adopted.
    fn conflicts(&self, state: &Self::State) -> usize;

    /// Generates a bounded sample of non-tabu candidates.
    ///
    /// `batch_size` is the configured number of samples; domains with a
    /// fixed neighborhood may ignore it.
    fn neighbors<R: Rng>(
        &self,
        state: &Self::State,
        memory: &TabuMemory<Self::Move>,
        batch_size: usize,
        rng: &mut R,
    ) -> Vec<Neighbor<Self::State, Self::Move>>;

    /// Decides how to proceed when [`neighbors`](Self::neighbors) is empty.
    fn dead_end(&self, state: &Self::State) -> DeadEnd<Self::Move>;

    /// Whether `state` ends the search.
    fn is_goal(&self, state: &Self::State) -> bool {
        self.conflicts(state) == 0
    }
}
