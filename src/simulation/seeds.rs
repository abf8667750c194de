use rand::{
    SeedableRng,
    distributions::{DistIter, Distribution, Uniform},
    rngs,
};

/// Seed of replicate `index`; depends only on the base seed and the index
pub(crate) fn replicate_seed(base_seed: u64, index: usize) -> u64 {
    base_seed.wrapping_add(index as u64)
}

/// Independent sub-seeds for the stages of one replicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StageSeeds {
    pub generator: u64,
    pub missingness: u64,
    pub estimator: u64,
}

impl StageSeeds {
    pub fn derive(replicate_seed: u64) -> Self {
        let master_rng = rngs::StdRng::seed_from_u64(replicate_seed);
        let seed_distribution = Uniform::new_inclusive(1_000_000_u64, i64::MAX as u64);
        let mut seed_generator: DistIter<_, _, u64> = seed_distribution.sample_iter(master_rng);
        // The iterator never ends; the fallbacks only satisfy the types
        let generator = seed_generator.next().unwrap_or(replicate_seed);
        let missingness = seed_generator.next().unwrap_or(replicate_seed ^ 1);
        let estimator = seed_generator.next().unwrap_or(replicate_seed ^ 2);
        Self {
            generator,
            missingness,
            estimator,
        }
    }
}
