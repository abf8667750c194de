use rand::{
    SeedableRng,
    distributions::{Distribution, Uniform},
    rngs,
};
use rayon::prelude::*;
use tracing::debug;

use crate::condition::Condition;
use crate::config::SamplerSettings;
use crate::data::types::TrialDataset;
use crate::error::PowerSimErr;
use crate::estimation::diagnostics::{effective_sample_size, split_rhat};
use crate::estimation::error::EstimationError;
use crate::estimation::sampler::ChainSampler;
use crate::estimation::sufficient::DatasetSummary;
use crate::estimation::types::{Draw, ParameterDiagnostics, PosteriorDraws};

/// Anything that turns one standardized dataset into posterior draws.
///
/// Implementations must be deterministic in `(dataset, seed)` so replicates
/// can be dispatched in any order.
pub trait PosteriorSampler: Sync {
    fn fit(&self, dataset: &TrialDataset, seed: u64) -> Result<PosteriorDraws, PowerSimErr>;
}

/// Bayesian multilevel change model with condition-specific intercepts and
/// slopes and correlated participant-level random intercepts and slopes
#[derive(Debug, Clone)]
pub struct HierarchicalModel {
    settings: SamplerSettings,
    parallel_chains: bool,
}

impl HierarchicalModel {
    pub fn new(settings: SamplerSettings) -> Self {
        Self {
            settings,
            parallel_chains: true,
        }
    }

    pub fn with_parallel_chains(mut self, parallel_chains: bool) -> Self {
        self.parallel_chains = parallel_chains;
        self
    }

    /// Seeds for each chain, derived from the fit seed
    fn chain_seeds(&self, seed: u64) -> Vec<u64> {
        let master_rng = rngs::StdRng::seed_from_u64(seed);
        Uniform::new_inclusive(1_000_000_u64, i64::MAX as u64)
            .sample_iter(master_rng)
            .take(self.settings.chains)
            .collect()
    }

    /// Quantities that must pass the convergence checks: every fixed effect
    /// and every variance component
    pub fn monitored_parameters() -> Vec<(String, Box<dyn Fn(&Draw) -> f64 + Send + Sync>)> {
        let mut monitored: Vec<(String, Box<dyn Fn(&Draw) -> f64 + Send + Sync>)> = Vec::new();
        monitored.push((String::from("sigma"), Box::new(|d: &Draw| d.sigma)));
        monitored.push((String::from("tau_intercept"), Box::new(|d: &Draw| d.tau_intercept)));
        monitored.push((String::from("tau_slope"), Box::new(|d: &Draw| d.tau_slope)));
        monitored.push((String::from("rho"), Box::new(|d: &Draw| d.rho)));
        for condition in Condition::ALL {
            monitored.push((
                format!("intercept[{condition}]"),
                Box::new(move |d: &Draw| d.intercept(condition)),
            ));
            monitored.push((
                format!("slope[{condition}]"),
                Box::new(move |d: &Draw| d.slope(condition)),
            ));
        }
        monitored
    }

    fn diagnose(draws: &PosteriorDraws) -> Vec<ParameterDiagnostics> {
        Self::monitored_parameters()
            .into_iter()
            .map(|(name, f)| {
                let traces = draws.traces(f);
                ParameterDiagnostics {
                    name,
                    rhat: split_rhat(&traces),
                    ess: effective_sample_size(&traces),
                }
            })
            .collect()
    }

    fn check_convergence(&self, diagnostics: &[ParameterDiagnostics]) -> Result<(), PowerSimErr> {
        let max_rhat = self.settings.max_rhat;
        let min_ess = self.settings.min_ess;
        // NaN diagnostics count as failures
        let failure = diagnostics
            .iter()
            .find(|d| !(d.rhat <= max_rhat) || !(d.ess >= min_ess));
        if let Some(d) = failure {
            return Err(EstimationError::NonConvergence {
                parameter: d.name.clone(),
                rhat: d.rhat,
                ess: d.ess,
                max_rhat,
                min_ess,
            }
            .into());
        }
        Ok(())
    }
}

impl PosteriorSampler for HierarchicalModel {
    fn fit(&self, dataset: &TrialDataset, seed: u64) -> Result<PosteriorDraws, PowerSimErr> {
        let summary = DatasetSummary::from_dataset(dataset)?;
        let seeds = self.chain_seeds(seed);

        let run_chain = |(chain, &chain_seed): (usize, &u64)| {
            ChainSampler::new(&summary, chain, chain_seed)?.run(&self.settings)
        };
        let chains = if self.parallel_chains {
            seeds
                .par_iter()
                .enumerate()
                .map(run_chain)
                .collect::<Result<Vec<_>, PowerSimErr>>()?
        } else {
            seeds
                .iter()
                .enumerate()
                .map(run_chain)
                .collect::<Result<Vec<_>, PowerSimErr>>()?
        };

        let mut draws = PosteriorDraws::from_chains(chains);
        let diagnostics = Self::diagnose(&draws);
        debug!(
            seed,
            n_draws = self.settings.total_draws(),
            worst_rhat = diagnostics.iter().map(|d| d.rhat).fold(f64::NAN, f64::max),
            min_ess = diagnostics.iter().map(|d| d.ess).fold(f64::NAN, f64::min),
            "fitted hierarchical model"
        );
        self.check_convergence(&diagnostics)?;
        draws.set_diagnostics(diagnostics);
        Ok(draws)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrialConfig;
    use crate::data::{generate_dataset, inject_missingness, standardize};

    fn prepared_dataset(config: &TrialConfig, seed: u64) -> TrialDataset {
        let mut dataset = generate_dataset(config, seed).unwrap();
        standardize(&mut dataset).unwrap();
        let mut rng = rngs::StdRng::seed_from_u64(seed + 1);
        inject_missingness(&mut dataset, config.dropout_rate, &mut rng).unwrap();
        dataset
    }

    fn quick_settings() -> SamplerSettings {
        SamplerSettings {
            chains: 2,
            warmup: 400,
            draws: 500,
            max_rhat: 1.05,
            min_ess: 100.0,
        }
    }

    #[test]
    fn fit_returns_all_draws_with_diagnostics() {
        let dataset = prepared_dataset(&TrialConfig::default(), 24601);
        let model = HierarchicalModel::new(quick_settings());
        let draws = model.fit(&dataset, 1).expect("failed to fit model");

        assert_eq!(draws.n_chains(), 2);
        assert_eq!(draws.len(), 1000);
        assert_eq!(draws.diagnostics().len(), 10);
        for d in draws.diagnostics() {
            assert!(d.rhat <= 1.05 && d.ess >= 100.0, "{d:?}");
        }
    }

    #[test]
    fn default_settings_converge_for_every_parameter() {
        let model = HierarchicalModel::new(SamplerSettings::default());
        for seed in [1, 3] {
            let dataset = prepared_dataset(&TrialConfig::default(), seed);
            let draws = model.fit(&dataset, seed).expect("failed to converge");
            let names: Vec<&str> = draws.diagnostics().iter().map(|d| d.name.as_str()).collect();
            for name in ["sigma", "tau_intercept", "tau_slope", "rho", "slope[f2f]"] {
                assert!(names.contains(&name), "{name} not monitored");
            }
            for d in draws.diagnostics() {
                assert!(d.rhat <= 1.01 && d.ess >= 400.0, "{d:?}");
            }
        }
    }

    #[test]
    fn variance_components_gate_convergence() {
        // A constant variance trace across disagreeing chains is caught
        let flat = |sigma: f64| Draw {
            intercepts: [0.0; 3],
            slopes: [0.0; 3],
            sigma,
            tau_intercept: 1.0,
            tau_slope: 1.0,
            rho: 0.0,
        };
        let noisy = |i: usize, sigma: f64| Draw {
            intercepts: [(i as f64 * 0.7).sin(); 3],
            slopes: [(i as f64 * 1.3).cos(); 3],
            tau_intercept: 1.0 + 0.1 * (i as f64 * 0.9).sin(),
            tau_slope: 1.0 + 0.1 * (i as f64 * 1.7).cos(),
            rho: 0.1 * (i as f64 * 2.3).sin(),
            ..flat(sigma + 0.01 * (i as f64 * 0.4).sin())
        };
        let draws = PosteriorDraws::from_chains(vec![
            (0..200).map(|i| noisy(i, 0.5)).collect(),
            (0..200).map(|i| noisy(i + 1000, 2.0)).collect(),
        ]);
        let diagnostics = HierarchicalModel::diagnose(&draws);
        let model = HierarchicalModel::new(SamplerSettings {
            max_rhat: 1.5,
            min_ess: 1.0,
            ..Default::default()
        });
        match model.check_convergence(&diagnostics) {
            Err(PowerSimErr::Estimation(EstimationError::NonConvergence { parameter, .. })) => {
                assert_eq!(parameter, "sigma")
            }
            other => panic!("expected non-convergence on sigma, got {other:?}"),
        }
    }

    #[test]
    fn parallel_and_sequential_chains_agree() {
        let dataset = prepared_dataset(&TrialConfig::default(), 3);
        let parallel = HierarchicalModel::new(quick_settings());
        let sequential = HierarchicalModel::new(quick_settings()).with_parallel_chains(false);
        assert_eq!(
            parallel.fit(&dataset, 77).unwrap(),
            sequential.fit(&dataset, 77).unwrap()
        );
    }

    #[test]
    fn recovers_effect_in_large_trial() {
        let config = TrialConfig {
            arm_sizes: [300, 300, 300],
            effect_sizes: [0.8, 0.8, 0.0],
            dropout_rate: 0.2,
            ..Default::default()
        };
        let dataset = prepared_dataset(&config, 12);
        let draws = HierarchicalModel::new(quick_settings())
            .fit(&dataset, 5)
            .unwrap();
        let n = draws.len() as f64;
        let mean_slope = |c: Condition| draws.iter().map(|d| d.slope(c)).sum::<f64>() / n;
        assert!((mean_slope(Condition::FaceToFace) - 0.8).abs() < 0.2);
        assert!((mean_slope(Condition::AppExpert) - 0.8).abs() < 0.2);
        assert!(mean_slope(Condition::AppNonExpert).abs() < 0.2);
    }

    #[test]
    fn impossible_floor_is_non_convergence() {
        let dataset = prepared_dataset(&TrialConfig::default(), 8);
        let settings = SamplerSettings {
            min_ess: 1.0e9,
            ..quick_settings()
        };
        let result = HierarchicalModel::new(settings).fit(&dataset, 2);
        assert!(matches!(
            result,
            Err(PowerSimErr::Estimation(EstimationError::NonConvergence { .. }))
        ));
    }

    #[test]
    fn chain_seeds_are_distinct_and_stable() {
        let model = HierarchicalModel::new(SamplerSettings::default());
        let seeds = model.chain_seeds(24601);
        assert_eq!(seeds, model.chain_seeds(24601));
        assert_eq!(seeds.len(), 4);
        let mut unique = seeds.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 4);
    }
}
