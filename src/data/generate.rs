use rand::{SeedableRng, distributions::Distribution, rngs};
use statrs::distribution::Normal;

use crate::condition::Condition;
use crate::config::TrialConfig;
use crate::data::{error::DataError, types::TrialDataset};
use crate::error::PowerSimErr;

/// Simulates one complete trial dataset (no missing values).
///
/// Total outcome variance is 1, split into a stable person effect with
/// variance `icc` and per-occasion noise with variance `1 - icc`. A condition's
/// effect is added at the post occasion only, so all arms share a baseline.
/// Identical `(config, seed)` pairs give identical datasets.
///
/// With `icc = 1` there is no occasion noise, so every participant's change is
/// exactly their condition's effect. The change-score variance then has no
/// positive estimate, so those replicates fail convergence and are counted as
/// failures rather than aborting the run.
pub fn generate_dataset(config: &TrialConfig, seed: u64) -> Result<TrialDataset, PowerSimErr> {
    config.validate_design()?;

    let mut rng = rngs::StdRng::seed_from_u64(seed);
    let std_normal = Normal::new(0.0, 1.0)
        .map_err(|e| -> PowerSimErr { DataError::Distribution(e.to_string()).into() })?;
    let person_sd = config.icc.sqrt();
    let noise_sd = (1.0 - config.icc).sqrt();

    let mut dataset = TrialDataset::with_capacity(config.total_participants());
    for condition in Condition::ALL {
        let effect = config.effect_size(condition);
        for _ in 0..config.arm_size(condition) {
            let person_effect = person_sd * std_normal.sample(&mut rng);
            let raw_pre = person_effect + noise_sd * std_normal.sample(&mut rng);
            let raw_post = person_effect + effect + noise_sd * std_normal.sample(&mut rng);
            dataset.push_participant(condition, person_effect, raw_pre, raw_post);
        }
    }
    Ok(dataset)
}
