use rand::{Rng, seq::index};

use crate::config::error::ConfigError;
use crate::data::types::TrialDataset;
use crate::error::PowerSimErr;

/// Number of participants who drop out under a given rate
pub fn n_dropouts(n_participants: usize, dropout_rate: f64) -> usize {
    ((n_participants as f64 * dropout_rate).round() as usize).min(n_participants)
}

/// Masks post-treatment outcomes completely at random.
///
/// Picks `round(n × dropout_rate)` participants uniformly without replacement,
/// regardless of condition or outcome, and clears their post standardized
/// value. Pre rows are never touched. Returns the number of rows masked.
pub fn inject_missingness<R: Rng + ?Sized>(
    dataset: &mut TrialDataset,
    dropout_rate: f64,
    rng: &mut R,
) -> Result<usize, PowerSimErr> {
    if !(0.0..=1.0).contains(&dropout_rate) {
        return Err(ConfigError::DropoutOutOfRange(dropout_rate).into());
    }
    let n = dataset.n_participants();
    let n_drop = n_dropouts(n, dropout_rate);
    for participant_id in index::sample(rng, n, n_drop) {
        dataset.post_mut(participant_id).standardized = None;
    }
    Ok(n_drop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::config::TrialConfig;
    use crate::data::{generate::generate_dataset, standardize::standardize, types::Occasion};
    use rand::{SeedableRng, rngs};

    fn standardized_dataset(seed: u64) -> TrialDataset {
        let mut dataset = generate_dataset(&TrialConfig::default(), seed).unwrap();
        standardize(&mut dataset).unwrap();
        dataset
    }

    #[test]
    fn twenty_percent_of_110() {
        let mut dataset = standardized_dataset(1);
        let mut rng = rngs::StdRng::seed_from_u64(2);
        let masked = inject_missingness(&mut dataset, 0.20, &mut rng).unwrap();

        assert_eq!(masked, 22);
        assert_eq!(dataset.n_missing(Occasion::Post), 22);
        assert_eq!(dataset.n_missing(Occasion::Pre), 0);
    }

    #[test]
    fn dropouts_ignore_condition() {
        let config = TrialConfig::default();
        let dataset = standardized_dataset(3);
        let n_rounds = 2000;
        let mut masked_by_arm = [0usize; Condition::COUNT];
        let mut masked_ever = vec![false; dataset.n_participants()];
        for round in 0..n_rounds {
            let mut masked = dataset.clone();
            let mut rng = rngs::StdRng::seed_from_u64(round);
            inject_missingness(&mut masked, config.dropout_rate, &mut rng).unwrap();
            for (participant, _, post) in masked.paired() {
                if post.standardized.is_none() {
                    masked_by_arm[participant.condition.index()] += 1;
                    masked_ever[participant.id] = true;
                }
            }
        }

        let total_masked = (22 * n_rounds) as f64;
        for condition in Condition::ALL {
            let share = masked_by_arm[condition.index()] as f64 / total_masked;
            let arm_share = config.arm_size(condition) as f64 / 110.0;
            assert!((share - arm_share).abs() < 0.02, "{condition}: {share} vs {arm_share}");
        }
        assert!(masked_ever.iter().all(|&m| m));
    }

    #[test]
    fn raw_values_untouched() {
        let mut dataset = standardized_dataset(1);
        let before = dataset.clone();
        let mut rng = rngs::StdRng::seed_from_u64(2);
        inject_missingness(&mut dataset, 0.5, &mut rng).unwrap();
        for (a, b) in dataset.observations().iter().zip(before.observations()) {
            assert_eq!(a.raw, b.raw);
        }
    }

    #[test]
    fn zero_and_full_dropout() {
        let mut dataset = standardized_dataset(4);
        let mut rng = rngs::StdRng::seed_from_u64(4);
        assert_eq!(inject_missingness(&mut dataset, 0.0, &mut rng).unwrap(), 0);
        assert_eq!(dataset.n_missing(Occasion::Post), 0);
        assert_eq!(inject_missingness(&mut dataset, 1.0, &mut rng).unwrap(), 110);
        assert_eq!(dataset.n_missing(Occasion::Post), 110);
        assert_eq!(dataset.n_missing(Occasion::Pre), 0);
    }

    #[test]
    fn same_stream_same_dropouts() {
        let mut a = standardized_dataset(9);
        let mut b = standardized_dataset(9);
        inject_missingness(&mut a, 0.3, &mut rngs::StdRng::seed_from_u64(10)).unwrap();
        inject_missingness(&mut b, 0.3, &mut rngs::StdRng::seed_from_u64(10)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rate_out_of_range() {
        let mut dataset = standardized_dataset(1);
        let mut rng = rngs::StdRng::seed_from_u64(2);
        assert!(matches!(
            inject_missingness(&mut dataset, 1.2, &mut rng),
            Err(PowerSimErr::InvalidConfig(ConfigError::DropoutOutOfRange(_)))
        ));
    }
}
