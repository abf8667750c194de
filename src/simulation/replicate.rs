use rand::{SeedableRng, rngs};
use tracing::{debug, warn};

use crate::config::TrialConfig;
use crate::data::{generate_dataset, inject_missingness, standardize};
use crate::error::PowerSimErr;
use crate::estimation::model::PosteriorSampler;
use crate::hypothesis::{HypothesisProbabilities, evaluate_hypotheses};
use crate::simulation::seeds::{StageSeeds, replicate_seed};
use crate::simulation::types::ReplicateResult;

/// Simulates, fits and evaluates one trial.
///
/// Depends only on `(config, sampler, index)`. Errors inside the pipeline are
/// recorded as a failed replicate rather than returned.
pub fn run_replicate<S: PosteriorSampler + ?Sized>(
    config: &TrialConfig,
    sampler: &S,
    index: usize,
) -> ReplicateResult {
    let seed = replicate_seed(config.seed, index);
    match replicate_probabilities(config, sampler, seed) {
        Ok(probabilities) => {
            debug!(
                replicate = index,
                seed,
                prob_h1 = probabilities.h1,
                prob_h2 = probabilities.h2,
                "replicate converged"
            );
            ReplicateResult::converged(index, seed, probabilities)
        }
        Err(e) => {
            warn!(replicate = index, seed, error = %e, "replicate failed");
            ReplicateResult::failed(index, seed, e.to_string())
        }
    }
}

fn replicate_probabilities<S: PosteriorSampler + ?Sized>(
    config: &TrialConfig,
    sampler: &S,
    seed: u64,
) -> Result<HypothesisProbabilities, PowerSimErr> {
    let seeds = StageSeeds::derive(seed);

    //----------------------------------------
    // Simulate and prepare data
    let mut dataset = generate_dataset(config, seeds.generator)?;
    standardize(&mut dataset)?;
    let mut missingness_rng = rngs::StdRng::seed_from_u64(seeds.missingness);
    inject_missingness(&mut dataset, config.dropout_rate, &mut missingness_rng)?;

    //----------------------------------------
    // Fit and evaluate
    let draws = sampler.fit(&dataset, seeds.estimator)?;
    evaluate_hypotheses(&draws, config.ni_margin)
}
