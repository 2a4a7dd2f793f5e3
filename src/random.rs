//! Random number helpers.
//!
//! Every randomized operation in the crate takes `&mut R where R: Rng`;
//! this module only decides how generators are created.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Creates a generator from a seed.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Draws one seed per task from a master generator.
///
/// Parallel work items each build their own generator from these seeds,
/// so no generator is shared across threads.
pub fn spawn_seeds<R: Rng>(rng: &mut R, n: usize) -> Vec<u64> {
    (0..n).map(|_| rng.random()).collect()
}
