//----------------------------------------
// config mod types
//----------------------------------------
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::condition::Condition;
use crate::config::error::ConfigError;
use crate::error::PowerSimErr;
use crate::randomization::types::RandomizationConfig;

/// Design of the simulated trial. Arrays are indexed by `Condition::index()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialConfig {
    pub arm_sizes: [usize; Condition::COUNT],
    pub effect_sizes: [f64; Condition::COUNT],
    pub icc: f64,
    pub dropout_rate: f64,
    pub ni_margin: f64,
    pub prob_threshold: f64,
    pub n_simulations: usize,
    pub seed: u64,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            arm_sizes: [50, 30, 30],
            effect_sizes: [1.24, 1.24, 1.24],
            icc: 0.5,
            dropout_rate: 0.20,
            ni_margin: 0.5,
            prob_threshold: 0.89,
            n_simulations: 50,
            seed: 1,
        }
    }
}

impl TrialConfig {
    pub fn arm_size(&self, condition: Condition) -> usize {
        self.arm_sizes[condition.index()]
    }

    pub fn effect_size(&self, condition: Condition) -> f64 {
        self.effect_sizes[condition.index()]
    }

    pub fn total_participants(&self) -> usize {
        self.arm_sizes.iter().sum()
    }

    /// Checks the parameters the data generator depends on
    pub fn validate_design(&self) -> Result<(), PowerSimErr> {
        for condition in Condition::ALL {
            if self.arm_size(condition) == 0 {
                return Err(ConfigError::NonPositiveArmSize(condition).into());
            }
            let effect = self.effect_size(condition);
            if !effect.is_finite() {
                return Err(ConfigError::NonFiniteEffect {
                    condition,
                    value: effect,
                }
                .into());
            }
        }
        if !(0.0..=1.0).contains(&self.icc) {
            return Err(ConfigError::IccOutOfRange(self.icc).into());
        }
        if !(0.0..=1.0).contains(&self.dropout_rate) {
            return Err(ConfigError::DropoutOutOfRange(self.dropout_rate).into());
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), PowerSimErr> {
        self.validate_design()?;
        if !self.ni_margin.is_finite() {
            return Err(ConfigError::NonFiniteMargin(self.ni_margin).into());
        }
        if self.prob_threshold <= 0.0 || self.prob_threshold >= 1.0 || self.prob_threshold.is_nan()
        {
            return Err(ConfigError::ThresholdOutOfRange(self.prob_threshold).into());
        }
        if self.n_simulations == 0 {
            return Err(ConfigError::NoSimulations.into());
        }
        Ok(())
    }
}

/// MCMC settings for the hierarchical estimator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerSettings {
    pub chains: usize,
    pub warmup: usize,
    pub draws: usize,
    pub max_rhat: f64,
    pub min_ess: f64,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            chains: 4,
            warmup: 1000,
            draws: 1000,
            max_rhat: 1.01,
            min_ess: 400.0,
        }
    }
}

impl SamplerSettings {
    pub fn total_draws(&self) -> usize {
        self.chains * self.draws
    }

    pub fn validate(&self) -> Result<(), PowerSimErr> {
        if self.chains == 0 {
            return Err(ConfigError::NoChains.into());
        }
        // Split R-hat needs two halves of at least two draws
        if self.draws < 4 {
            return Err(ConfigError::TooFewDraws(self.draws).into());
        }
        if !(self.max_rhat >= 1.0) {
            return Err(ConfigError::BadRhatLimit(self.max_rhat).into());
        }
        if !(self.min_ess > 0.0) {
            return Err(ConfigError::BadEssFloor(self.min_ess).into());
        }
        Ok(())
    }
}

/// Driver-level settings: dispatch, budgets and summary coverage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub parallel: bool,
    pub credible_mass: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_budget_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_replicates: Option<usize>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            parallel: true,
            credible_mass: 0.89,
            time_budget_secs: None,
            max_replicates: None,
        }
    }
}

impl RunSettings {
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), PowerSimErr> {
        if !(self.credible_mass > 0.0 && self.credible_mass < 1.0) {
            return Err(ConfigError::CredibleMassOutOfRange(self.credible_mass).into());
        }
        Ok(())
    }
}

/// Complete configuration document, one section per concern
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerAnalysisConfig {
    pub trial: TrialConfig,
    pub sampler: SamplerSettings,
    pub run: RunSettings,
    pub randomization: RandomizationConfig,
}

impl PowerAnalysisConfig {
    /// Validates the sections used by the power simulation
    pub fn validate(&self) -> Result<(), PowerSimErr> {
        self.trial.validate()?;
        self.sampler.validate()?;
        self.run.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_config_error(result: Result<(), PowerSimErr>) -> ConfigError {
        match result {
            Err(PowerSimErr::InvalidConfig(e)) => e,
            other => panic!("expected invalid config, got {other:?}"),
        }
    }

    #[test]
    fn default_is_valid() {
        assert!(PowerAnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_arm_size_rejected() {
        let config = TrialConfig {
            arm_sizes: [50, 0, 30],
            ..Default::default()
        };
        assert_eq!(
            expect_config_error(config.validate()),
            ConfigError::NonPositiveArmSize(Condition::AppExpert)
        );
    }

    #[test]
    fn icc_out_of_range_rejected() {
        let config = TrialConfig {
            icc: 1.5,
            ..Default::default()
        };
        assert_eq!(
            expect_config_error(config.validate()),
            ConfigError::IccOutOfRange(1.5)
        );
    }

    #[test]
    fn dropout_out_of_range_rejected() {
        let config = TrialConfig {
            dropout_rate: -0.1,
            ..Default::default()
        };
        assert_eq!(
            expect_config_error(config.validate()),
            ConfigError::DropoutOutOfRange(-0.1)
        );
    }

    #[test]
    fn threshold_bounds_are_open() {
        for threshold in [0.0, 1.0, f64::NAN] {
            let config = TrialConfig {
                prob_threshold: threshold,
                ..Default::default()
            };
            assert!(matches!(
                expect_config_error(config.validate()),
                ConfigError::ThresholdOutOfRange(_)
            ));
        }
    }

    #[test]
    fn error_message() {
        let config = TrialConfig {
            icc: 2.0,
            ..Default::default()
        };
        if let Err(e) = config.validate() {
            assert_eq!(
                String::from("invalid configuration: icc should be in [0, 1]; got 2"),
                format!("{}", e)
            );
        } else {
            panic!()
        }
    }

    #[test]
    fn sampler_needs_draws_for_split_chains() {
        let settings = SamplerSettings {
            draws: 3,
            ..Default::default()
        };
        assert_eq!(
            expect_config_error(settings.validate()),
            ConfigError::TooFewDraws(3)
        );
    }

    #[test]
    fn credible_mass_checked() {
        let settings = RunSettings {
            credible_mass: 1.0,
            ..Default::default()
        };
        assert_eq!(
            expect_config_error(settings.validate()),
            ConfigError::CredibleMassOutOfRange(1.0)
        );
    }
}
