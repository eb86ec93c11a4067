//! Random number helpers shared by the search driver and the domains.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Creates a seeded, reproducible RNG.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Creates an RNG from an optional seed, drawing a fresh seed when absent.
pub fn rng_from(seed: Option<u64>) -> StdRng {
    create_rng(seed.unwrap_or_else(rand::random))
}

/// Picks two distinct indices in `0..len` uniformly at random.
///
/// The order of the pair is the order in which the indices were drawn.
/// Returns `None` when `len < 2`.
pub fn distinct_pair<R: Rng>(len: usize, rng: &mut R) -> Option<(usize, usize)> {
    if len < 2 {
        return None;
    }
    let picked = rand::seq::index::sample(rng, len, 2);
    Some((picked.index(0), picked.index(1)))
}
