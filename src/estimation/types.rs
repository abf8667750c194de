//----------------------------------------
// estimation mod types
//----------------------------------------
use crate::condition::Condition;

/// One joint posterior draw of the hierarchical model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Draw {
    pub intercepts: [f64; Condition::COUNT],
    pub slopes: [f64; Condition::COUNT],
    /// Residual standard deviation
    pub sigma: f64,
    pub tau_intercept: f64,
    pub tau_slope: f64,
    /// Correlation between participant intercepts and slopes
    pub rho: f64,
}

impl Draw {
    pub fn intercept(&self, condition: Condition) -> f64 {
        self.intercepts[condition.index()]
    }

    pub fn slope(&self, condition: Condition) -> f64 {
        self.slopes[condition.index()]
    }
}

/// Convergence diagnostics of one monitored quantity
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDiagnostics {
    pub name: String,
    pub rhat: f64,
    pub ess: f64,
}

/// Posterior sample, stored chain by chain in iteration order
#[derive(Debug, Clone, PartialEq)]
pub struct PosteriorDraws {
    chains: Vec<Vec<Draw>>,
    diagnostics: Vec<ParameterDiagnostics>,
}

impl PosteriorDraws {
    /// Builds a sample from per-chain draws. Chains are truncated to the
    /// shortest one so every chain contributes the same number of draws.
    pub fn from_chains(mut chains: Vec<Vec<Draw>>) -> Self {
        let draws_per_chain = chains.iter().map(Vec::len).min().unwrap_or(0);
        for chain in chains.iter_mut() {
            chain.truncate(draws_per_chain);
        }
        Self {
            chains,
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn set_diagnostics(&mut self, diagnostics: Vec<ParameterDiagnostics>) {
        self.diagnostics = diagnostics;
    }

    pub fn n_chains(&self) -> usize {
        self.chains.len()
    }

    pub fn draws_per_chain(&self) -> usize {
        self.chains.first().map_or(0, Vec::len)
    }

    pub fn len(&self) -> usize {
        self.n_chains() * self.draws_per_chain()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn chains(&self) -> &[Vec<Draw>] {
        &self.chains
    }

    /// All draws, chain by chain
    pub fn iter(&self) -> impl Iterator<Item = &Draw> {
        self.chains.iter().flatten()
    }

    /// Per-chain trace of a scalar function of the draws
    pub fn traces<F>(&self, f: F) -> Vec<Vec<f64>>
    where
        F: Fn(&Draw) -> f64,
    {
        self.chains
            .iter()
            .map(|chain| chain.iter().map(&f).collect())
            .collect()
    }

    pub fn diagnostics(&self) -> &[ParameterDiagnostics] {
        &self.diagnostics
    }
}
