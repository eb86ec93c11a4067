//! Timetabling as a tabu search domain.

use std::collections::BTreeSet;

use rand::Rng;

use super::timetable::{Catalog, Timetable};
use crate::error::TabuError;
use crate::random::distinct_pair;
use crate::tabu::{Acceptance, DeadEnd, Exhaustion, Neighbor, TabuConfig, TabuDomain, TabuMemory};

/// What a swap exchanges between two entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SwapMode {
    /// Exchange course and teacher; timeslot and room stay put.
    #[default]
    Payload,
    /// Exchange whole entries. This reorders the list but never changes
    /// the conflict count.
    WholeEntry,
}

/// A swap between two entry indices, stored with the smaller index first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntrySwap {
    pub first: usize,
    pub second: usize,
}

impl EntrySwap {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            first: a.min(b),
            second: a.max(b),
        }
    }
}

/// Timetabling domain.
///
/// Each iteration samples one swap between two unpinned entries and adopts
/// it regardless of its conflict count; only recency, via tabu memory,
/// constrains the walk. A sampled swap that is still tabu skips the
/// iteration.
///
/// # Examples
///
/// ```
/// use u_tabu::schedule::{Catalog, ScheduleDomain, SwapMode};
/// use u_tabu::tabu::TabuRunner;
///
/// let domain = ScheduleDomain::new(Catalog::default()).with_swap_mode(SwapMode::Payload);
/// let config = ScheduleDomain::recommended_config().with_seed(3);
/// let result = TabuRunner::run(&domain, &config).unwrap();
/// assert!(result.best_conflicts <= result.improvements[0].1);
/// ```
#[derive(Debug, Clone)]
pub struct ScheduleDomain {
    catalog: Catalog,
    swap_mode: SwapMode,
    initial: Option<Timetable>,
    pinned: BTreeSet<usize>,
}

impl ScheduleDomain {
    /// Creates a domain that starts from a random timetable over `catalog`.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            swap_mode: SwapMode::default(),
            initial: None,
            pinned: BTreeSet::new(),
        }
    }

    /// Capacity 10, budget 100, one sample per iteration.
    pub fn recommended_config() -> TabuConfig {
        TabuConfig::default()
            .with_tabu_capacity(10)
            .with_max_iterations(100)
            .with_batch_size(1)
    }

    pub fn with_swap_mode(mut self, mode: SwapMode) -> Self {
        self.swap_mode = mode;
        self
    }

    /// Starts from `timetable` instead of a random one.
    ///
    /// Entries are re-validated against this domain's catalog.
    pub fn with_initial(mut self, timetable: Timetable) -> Result<Self, TabuError> {
        let checked = Timetable::from_entries(&self.catalog, timetable.entries().to_vec())?;
        self.initial = Some(checked);
        Ok(self)
    }

    /// Marks entries that swaps must never touch.
    pub fn with_pinned(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.pinned = indices.into_iter().collect();
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn is_pinned(&self, index: usize) -> bool {
        self.pinned.contains(&index)
    }

    fn mutable_indices(&self, timetable: &Timetable) -> Vec<usize> {
        (0..timetable.len())
            .filter(|i| !self.pinned.contains(i))
            .collect()
    }
}

impl TabuDomain for ScheduleDomain {
    type State = Timetable;
    type Move = EntrySwap;
    const ACCEPTANCE: Acceptance = Acceptance::FirstSampled;

    fn initial_state<R: Rng>(&self, rng: &mut R) -> Timetable {
        match &self.initial {
            Some(timetable) => timetable.clone(),
            None => Timetable::random(&self.catalog, rng),
        }
    }

    fn conflicts(&self, timetable: &Timetable) -> usize {
        timetable.conflicts()
    }

    fn neighbors<R: Rng>(
        &self,
        timetable: &Timetable,
        memory: &TabuMemory<EntrySwap>,
        _batch_size: usize,
        rng: &mut R,
    ) -> Vec<Neighbor<Timetable, EntrySwap>> {
        let mutable = self.mutable_indices(timetable);
        let Some((a, b)) = distinct_pair(mutable.len(), rng) else {
            return Vec::new();
        };
        let mv = EntrySwap::new(mutable[a], mutable[b]);
        if memory.contains(&mv) {
            return Vec::new();
        }

        let mut next = timetable.clone();
        match self.swap_mode {
            SwapMode::Payload => next.swap_payload(mv.first, mv.second),
            SwapMode::WholeEntry => next.swap_entries(mv.first, mv.second),
        }
        vec![Neighbor::new(next, mv)]
    }

    fn dead_end(&self, timetable: &Timetable) -> DeadEnd<EntrySwap> {
        if self.mutable_indices(timetable).len() < 2 {
            DeadEnd::Stop(Exhaustion::InsufficientMutableCells)
        } else {
            DeadEnd::Retry
        }
    }
}
