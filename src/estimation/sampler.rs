use nalgebra::Vector2;
use rand::{
    SeedableRng,
    distributions::{Distribution, Uniform},
    rngs,
};
use statrs::distribution::Normal;
use tracing::trace;

use crate::condition::Condition;
use crate::config::SamplerSettings;
use crate::error::PowerSimErr;
use crate::estimation::error::EstimationError;
use crate::estimation::likelihood::{
    FixedEffectPosterior, Unconstrained, VarianceComponents, log_posterior,
};
use crate::estimation::sufficient::DatasetSummary;
use crate::estimation::types::Draw;

/// Warmup iterations between step-size updates
const ADAPT_BATCH: usize = 50;
/// Optimal acceptance rate for one-dimensional random-walk proposals
const TARGET_ACCEPTANCE: f64 = 0.44;
/// Metropolis sweeps between stored draws
const SWEEPS_PER_ITERATION: usize = 3;
const INITIAL_LOG_STEP: f64 = -1.2;
const MAX_INIT_ATTEMPTS: usize = 100;

/// One Markov chain over the model parameters.
///
/// Variance components move by component-wise random-walk Metropolis on the
/// collapsed posterior, several sweeps per iteration; after each iteration the
/// fixed effects are drawn exactly from their conditional normal. Step sizes
/// adapt during warmup only.
pub(crate) struct ChainSampler<'a> {
    summary: &'a DatasetSummary,
    chain: usize,
    rng: rngs::StdRng,
    std_normal: Normal,
    unit: Uniform<f64>,
    theta: Unconstrained,
    log_post: f64,
    log_step: [f64; 4],
    accepted: [usize; 4],
}

impl<'a> ChainSampler<'a> {
    pub fn new(summary: &'a DatasetSummary, chain: usize, seed: u64) -> Result<Self, PowerSimErr> {
        let mut rng = rngs::StdRng::seed_from_u64(seed);
        let std_normal = Normal::new(0.0, 1.0)
            .map_err(|e| -> PowerSimErr { EstimationError::Distribution(e.to_string()).into() })?;

        // Dispersed starting points on the unconstrained scale
        let init = Uniform::new(-1.0, 1.0);
        let mut theta = [0.0; 4];
        let mut log_post = f64::NEG_INFINITY;
        for _ in 0..MAX_INIT_ATTEMPTS {
            for x in theta.iter_mut() {
                *x = init.sample(&mut rng);
            }
            log_post = log_posterior(summary, &theta);
            if log_post.is_finite() {
                break;
            }
        }
        if !log_post.is_finite() {
            return Err(EstimationError::BadInitialValues(chain).into());
        }

        Ok(Self {
            summary,
            chain,
            rng,
            std_normal,
            unit: Uniform::new(0.0, 1.0),
            theta,
            log_post,
            log_step: [INITIAL_LOG_STEP; 4],
            accepted: [0; 4],
        })
    }

    fn iterate(&mut self) {
        for _ in 0..SWEEPS_PER_ITERATION {
            self.sweep();
        }
    }

    /// One Metropolis update per sampling coordinate
    fn sweep(&mut self) {
        for k in 0..self.theta.len() {
            let mut proposal = self.theta;
            proposal[k] += self.log_step[k].exp() * self.std_normal.sample(&mut self.rng);
            let proposal_log_post = log_posterior(self.summary, &proposal);
            let log_u = self.unit.sample(&mut self.rng).ln();
            if log_u < proposal_log_post - self.log_post {
                self.theta = proposal;
                self.log_post = proposal_log_post;
                self.accepted[k] += 1;
            }
        }
    }

    fn adapt(&mut self, batch: usize) {
        let delta = (1.0 / (batch as f64).sqrt()).min(0.5);
        for k in 0..self.theta.len() {
            let rate = self.accepted[k] as f64 / (ADAPT_BATCH * SWEEPS_PER_ITERATION) as f64;
            if rate > TARGET_ACCEPTANCE {
                self.log_step[k] += delta;
            } else {
                self.log_step[k] -= delta;
            }
        }
        self.accepted = [0; 4];
    }

    fn draw_fixed_effects(&mut self) -> Result<Draw, PowerSimErr> {
        let vc = VarianceComponents::from_unconstrained(&self.theta)
            .ok_or_else(|| -> PowerSimErr { EstimationError::NotPositiveDefinite.into() })?
            .components;
        let mut intercepts = [0.0; Condition::COUNT];
        let mut slopes = [0.0; Condition::COUNT];
        for condition in Condition::ALL {
            let posterior = FixedEffectPosterior::new(self.summary.condition(condition), &vc)
                .ok_or_else(|| -> PowerSimErr { EstimationError::NotPositiveDefinite.into() })?;
            let z = Vector2::new(
                self.std_normal.sample(&mut self.rng),
                self.std_normal.sample(&mut self.rng),
            );
            let beta = posterior
                .transform(&z)
                .ok_or_else(|| -> PowerSimErr { EstimationError::NotPositiveDefinite.into() })?;
            intercepts[condition.index()] = beta[0];
            slopes[condition.index()] = beta[1];
        }
        Ok(Draw {
            intercepts,
            slopes,
            sigma: vc.sigma,
            tau_intercept: vc.tau_intercept,
            tau_slope: vc.tau_slope,
            rho: vc.rho,
        })
    }

    pub fn run(mut self, settings: &SamplerSettings) -> Result<Vec<Draw>, PowerSimErr> {
        for iteration in 1..=settings.warmup {
            self.iterate();
            if iteration % ADAPT_BATCH == 0 {
                self.adapt(iteration / ADAPT_BATCH);
            }
        }
        trace!(
            chain = self.chain,
            step_sizes = ?self.log_step.map(f64::exp),
            "warmup finished"
        );

        let mut draws = Vec::with_capacity(settings.draws);
        for _ in 0..settings.draws {
            self.iterate();
            draws.push(self.draw_fixed_effects()?);
        }
        Ok(draws)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrialConfig;
    use crate::data::{generate_dataset, standardize};

    fn summary(seed: u64) -> DatasetSummary {
        let config = TrialConfig {
            arm_sizes: [60, 60, 60],
            effect_sizes: [1.0, 0.5, 0.0],
            ..Default::default()
        };
        let mut dataset = generate_dataset(&config, seed).unwrap();
        standardize(&mut dataset).unwrap();
        DatasetSummary::from_dataset(&dataset).unwrap()
    }

    fn settings() -> SamplerSettings {
        SamplerSettings {
            chains: 1,
            warmup: 300,
            draws: 400,
            ..Default::default()
        }
    }

    #[test]
    fn chain_is_deterministic() {
        let summary = summary(1);
        let a = ChainSampler::new(&summary, 0, 42).unwrap().run(&settings()).unwrap();
        let b = ChainSampler::new(&summary, 0, 42).unwrap().run(&settings()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 400);
    }

    #[test]
    fn draws_are_in_support() {
        let summary = summary(2);
        let draws = ChainSampler::new(&summary, 0, 9).unwrap().run(&settings()).unwrap();
        for draw in draws {
            assert!(draw.sigma > 0.0 && draw.tau_intercept > 0.0 && draw.tau_slope > 0.0);
            assert!(draw.rho > -1.0 && draw.rho < 1.0);
            assert!(draw.slopes.iter().all(|s| s.is_finite()));
        }
    }

    #[test]
    fn slopes_order_follows_effects() {
        // Effects in baseline SD units are 1.0 > 0.5 > 0.0
        let summary = summary(3);
        let draws = ChainSampler::new(&summary, 0, 5).unwrap().run(&settings()).unwrap();
        let n = draws.len() as f64;
        let mean_slope = |c: Condition| draws.iter().map(|d| d.slope(c)).sum::<f64>() / n;
        let f2f = mean_slope(Condition::FaceToFace);
        let expert = mean_slope(Condition::AppExpert);
        let nonexpert = mean_slope(Condition::AppNonExpert);
        assert!(f2f > expert && expert > nonexpert, "{f2f} {expert} {nonexpert}");
        assert!(nonexpert.abs() < 0.4);
    }

    #[test]
    fn warmup_adapts_step_sizes() {
        let summary = summary(4);
        let mut sampler = ChainSampler::new(&summary, 0, 1).unwrap();
        for iteration in 1..=200 {
            sampler.iterate();
            if iteration % ADAPT_BATCH == 0 {
                sampler.adapt(iteration / ADAPT_BATCH);
            }
        }
        assert!(sampler.log_step.iter().any(|&s| s != INITIAL_LOG_STEP));
        assert_eq!(sampler.accepted, [0; 4]);
    }
}
