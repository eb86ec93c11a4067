//! Tabu Search (TS).
//!
//! A single-solution trajectory metaheuristic that uses memory structures
//! (the tabu list) to forbid recently used moves, preventing cycling
//! and encouraging exploration of new regions of the search space.
//!
//! The driver is generic over a [`TabuDomain`], which supplies the initial
//! state, the neighbor sample and the conflict count. Domains that record
//! predecessors additionally get backtracking and path reconstruction.
//!
//! # References
//!
//! - Glover, F. (1989). "Tabu Search—Part I", *ORSA Journal on Computing* 1(3), 190-206.
//! - Glover, F. (1990). "Tabu Search—Part II", *ORSA Journal on Computing* 2(1), 4-32.

mod config;
mod memory;
mod runner;
mod types;

pub use config::TabuConfig;
pub use memory::TabuMemory;
pub use runner::{Change, SearchStatus, Snapshot, TabuResult, TabuRunner, TabuSearch};
pub use types::{Acceptance, DeadEnd, Exhaustion, Neighbor, TabuDomain};
