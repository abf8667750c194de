use serde::Serialize;
use statrs::statistics::{Data, OrderStatistics, Statistics};

use crate::hypothesis::types::Hypothesis;

/// Aggregate over replicates of one hypothesis' non-inferiority probability
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerSummary {
    pub hypothesis: Hypothesis,
    pub median_probability: f64,
    pub sd_probability: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub credible_mass: f64,
    /// Fraction of contributing replicates whose probability exceeds the
    /// decision threshold
    pub power: f64,
    pub n_contributing: usize,
    pub n_requested: usize,
}

/// Summarizes per-replicate probabilities. NaN entries (failed replicates)
/// are excluded; with no contributing replicates every statistic is NaN.
pub fn summarize_hypothesis(
    hypothesis: Hypothesis,
    probabilities: &[f64],
    prob_threshold: f64,
    credible_mass: f64,
    n_requested: usize,
) -> PowerSummary {
    let contributing: Vec<f64> = probabilities
        .iter()
        .copied()
        .filter(|p| !p.is_nan())
        .collect();
    let n_contributing = contributing.len();

    if n_contributing == 0 {
        return PowerSummary {
            hypothesis,
            median_probability: f64::NAN,
            sd_probability: f64::NAN,
            ci_lower: f64::NAN,
            ci_upper: f64::NAN,
            credible_mass,
            power: f64::NAN,
            n_contributing,
            n_requested,
        };
    }

    let exceeding = contributing.iter().filter(|&&p| p > prob_threshold).count();
    let power = exceeding as f64 / n_contributing as f64;
    // Sample SD is undefined for one replicate
    let sd_probability = if n_contributing > 1 {
        contributing.iter().std_dev()
    } else {
        f64::NAN
    };

    let tail = (1.0 - credible_mass) / 2.0;
    let mut data = Data::new(contributing);
    let median_probability = data.quantile(0.5);
    let ci_lower = data.quantile(tail);
    let ci_upper = data.quantile(1.0 - tail);

    PowerSummary {
        hypothesis,
        median_probability,
        sd_probability,
        ci_lower,
        ci_upper,
        credible_mass,
        power,
        n_contributing,
        n_requested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn power_is_fraction_above_threshold() {
        let probs = [0.95, 0.90, 0.50, 0.99, 0.89];
        let summary = summarize_hypothesis(Hypothesis::H1, &probs, 0.89, 0.89, 5);
        assert_abs_diff_eq!(summary.power, 0.6);
        assert_abs_diff_eq!(summary.median_probability, 0.90, epsilon = 1e-9);
        assert_eq!(summary.n_contributing, 5);
    }

    #[test]
    fn failed_replicates_excluded() {
        let probs = [1.0, f64::NAN, 0.0, f64::NAN];
        let summary = summarize_hypothesis(Hypothesis::H2, &probs, 0.5, 0.89, 4);
        assert_eq!(summary.n_contributing, 2);
        assert_eq!(summary.n_requested, 4);
        assert_abs_diff_eq!(summary.power, 0.5);
        assert_abs_diff_eq!(summary.median_probability, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(summary.sd_probability, 0.5_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn interval_brackets_median() {
        let probs: Vec<f64> = (0..=100).map(|i| i as f64 / 100.0).collect();
        let summary = summarize_hypothesis(Hypothesis::H1, &probs, 0.89, 0.89, 101);
        assert!(summary.ci_lower < summary.median_probability);
        assert!(summary.median_probability < summary.ci_upper);
        assert_abs_diff_eq!(summary.ci_lower, 0.055, epsilon = 0.01);
        assert_abs_diff_eq!(summary.ci_upper, 0.945, epsilon = 0.01);
    }

    #[test]
    fn nothing_contributing() {
        let summary = summarize_hypothesis(Hypothesis::H1, &[f64::NAN], 0.89, 0.89, 1);
        assert_eq!(summary.n_contributing, 0);
        assert!(summary.power.is_nan());
        assert!(summary.median_probability.is_nan());
    }

    #[test]
    fn single_replicate_has_no_spread() {
        let summary = summarize_hypothesis(Hypothesis::H1, &[0.93], 0.89, 0.89, 1);
        assert_eq!(summary.power, 1.0);
        assert!(summary.sd_probability.is_nan());
        assert_abs_diff_eq!(summary.median_probability, 0.93, epsilon = 1e-12);
    }
}
