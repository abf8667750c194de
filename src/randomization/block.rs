use itertools::Itertools;
use rand::{SeedableRng, rngs, seq::SliceRandom};
use tracing::debug;

use crate::condition::Condition;
use crate::error::PowerSimErr;
use crate::randomization::error::RandomizationError;
use crate::randomization::types::{Assignment, RandomizationConfig};

const MIN_ID_WIDTH: usize = 3;

impl RandomizationConfig {
    pub fn validate(&self) -> Result<(), PowerSimErr> {
        if self.block_size != Condition::COUNT {
            return Err(RandomizationError::BadBlockSize {
                expected: Condition::COUNT,
                got: self.block_size,
            }
            .into());
        }
        if self.strata.is_empty() {
            return Err(RandomizationError::NoStrata.into());
        }
        if let Some(label) = self.strata.iter().map(|s| &s.label).duplicates().next() {
            return Err(RandomizationError::DuplicateStratum(label.clone()).into());
        }
        for stratum in &self.strata {
            if stratum.n_participants % self.block_size != 0 {
                return Err(RandomizationError::NotMultipleOfBlock {
                    stratum: stratum.label.clone(),
                    n_participants: stratum.n_participants,
                    block_size: self.block_size,
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Permuted-block allocation list.
///
/// Every block holds each condition exactly once, in a seeded random order.
/// Strata are filled in configuration order from a single generator, so the
/// list depends only on the configuration.
pub fn generate_list(config: &RandomizationConfig) -> Result<Vec<Assignment>, PowerSimErr> {
    config.validate()?;
    let mut rng = rngs::StdRng::seed_from_u64(config.seed);

    let mut assignments = Vec::with_capacity(config.strata.iter().map(|s| s.n_participants).sum());
    for stratum in &config.strata {
        let width = stratum.n_participants.to_string().len().max(MIN_ID_WIDTH);
        let mut running = 0;
        for block in 1..=stratum.n_participants / config.block_size {
            let mut conditions = Condition::ALL;
            conditions.shuffle(&mut rng);
            for condition in conditions {
                running += 1;
                assignments.push(Assignment {
                    id: format!("{}{:0width$}", stratum.id_prefix, running),
                    stratum: stratum.label.clone(),
                    condition,
                    block,
                });
            }
        }
        debug!(stratum = %stratum.label, n = running, "randomized stratum");
    }
    Ok(assignments)
}
