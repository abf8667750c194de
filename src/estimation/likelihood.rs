//----------------------------------------
// Collapsed likelihood of the multilevel model
//----------------------------------------
//! Participant random effects are integrated out analytically. With
//! occasion design `Z = [[1, 0], [1, 1]]`, a complete participant's outcome
//! vector is bivariate normal with covariance `V = Z Σ_u Z' + σ² I`; a
//! participant whose post outcome is missing contributes only the pre row,
//! with variance `τ₀² + σ²`. Condition-specific fixed effects have a conjugate
//! normal prior, so they can be integrated out too, leaving the variance
//! components.
//!
//! With two occasions the data identify `V` but only bound `σ²`: any
//! `σ² ∈ (0, λ_min(V))` gives the same likelihood. The sampler therefore
//! moves on `[ln V₁₁, ln V₂₂, atanh corr(V), logit(σ² / λ_min(V))]`, where
//! the last coordinate is informed by the prior alone.

use nalgebra::{Cholesky, Matrix2, Vector2};
use std::f64::consts::{LN_2, PI};

use crate::condition::Condition;
use crate::estimation::sufficient::{ConditionSummary, DatasetSummary};

pub(crate) const INTERCEPT_PRIOR_SD: f64 = 1.0;
pub(crate) const SLOPE_PRIOR_SD: f64 = 0.5;
/// Rate of the exponential prior on sigma and both taus
pub(crate) const SCALE_PRIOR_RATE: f64 = 1.0;
/// LKJ shape for the intercept-slope correlation
pub(crate) const LKJ_ETA: f64 = 2.0;

/// Unconstrained sampling coordinates:
/// `[ln V₁₁, ln V₂₂, atanh corr(V), logit(σ² / λ_min(V))]`
pub(crate) type Unconstrained = [f64; 4];

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct VarianceComponents {
    pub sigma: f64,
    pub tau_intercept: f64,
    pub tau_slope: f64,
    pub rho: f64,
}

/// Variance components at a point of the sampling scale, with the log
/// Jacobian of the map back to `(σ, τ₀, τ₁, ρ)`
#[derive(Debug, Clone, Copy)]
pub(crate) struct Reparameterized {
    pub components: VarianceComponents,
    pub log_jacobian: f64,
}

/// `ln(1 + e^x)` without overflow
fn softplus(x: f64) -> f64 {
    if x > 0.0 {
        x + (-x).exp().ln_1p()
    } else {
        x.exp().ln_1p()
    }
}

fn logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

impl VarianceComponents {
    /// Maps sampling coordinates to variance components. `None` outside the
    /// region where all scales are positive and `|ρ| < 1`.
    pub fn from_unconstrained(theta: &Unconstrained) -> Option<Reparameterized> {
        if theta.iter().any(|x| !x.is_finite()) {
            return None;
        }
        let var_pre = theta[0].exp();
        let var_post = theta[1].exp();
        let corr = theta[2].tanh();
        let share = logistic(theta[3]);
        let cov = corr * (var_pre * var_post).sqrt();

        let min_eigenvalue =
            0.5 * ((var_pre + var_post) - ((var_pre - var_post).powi(2) + 4.0 * cov * cov).sqrt());
        let sigma_sq = share * min_eigenvalue;
        let tau_intercept_sq = var_pre - sigma_sq;
        let tau_slope_sq = var_pre - 2.0 * cov + var_post - 2.0 * sigma_sq;
        if !(sigma_sq > 0.0 && tau_intercept_sq > 0.0 && tau_slope_sq > 0.0) {
            return None;
        }
        let sigma = sigma_sq.sqrt();
        let tau_intercept = tau_intercept_sq.sqrt();
        let tau_slope = tau_slope_sq.sqrt();
        let rho = (cov - tau_intercept_sq) / (tau_intercept * tau_slope);
        if !(rho.abs() < 1.0) {
            return None;
        }

        // (a, c, z, w) -> (a, c, V₁₂, σ²) is triangular; (σ, τ₀, τ₁, ρ) ->
        // (σ², τ₀², τ₁², ρτ₀τ₁) is triangular with determinant 8στ₀²τ₁², and
        // (σ², τ₀², τ₁², ρτ₀τ₁) -> (V₁₁, V₁₂, V₂₂, σ²) is linear with |det| 1
        let log_jacobian = theta[0]
            + theta[1]
            + ln_one_minus_tanh_sq(theta[2])
            + 0.5 * (theta[0] + theta[1])
            + min_eigenvalue.ln()
            - softplus(-theta[3])
            - softplus(theta[3])
            - (8.0 * sigma * tau_intercept_sq * tau_slope_sq).ln();

        Some(Reparameterized {
            components: Self {
                sigma,
                tau_intercept,
                tau_slope,
                rho,
            },
            log_jacobian,
        })
    }

    /// Marginal covariance of (pre, post) for a participant with both outcomes
    fn complete_covariance(&self) -> Matrix2<f64> {
        let t0 = self.tau_intercept * self.tau_intercept;
        let t1 = self.tau_slope * self.tau_slope;
        let t01 = self.rho * self.tau_intercept * self.tau_slope;
        let s2 = self.sigma * self.sigma;
        Matrix2::new(t0 + s2, t0 + t01, t0 + t01, t0 + 2.0 * t01 + t1 + s2)
    }

    fn baseline_variance(&self) -> f64 {
        self.tau_intercept * self.tau_intercept + self.sigma * self.sigma
    }
}

/// `ln(1 - tanh(z)^2)`, stable for large `|z|`
fn ln_one_minus_tanh_sq(z: f64) -> f64 {
    let a = z.abs();
    2.0 * LN_2 - 2.0 * a - 2.0 * (-2.0 * a).exp().ln_1p()
}

/// Log prior density of the variance components on their natural scale:
/// exponential on the three scales, LKJ on the 2x2 correlation
pub(crate) fn log_prior(vc: &VarianceComponents) -> f64 {
    -SCALE_PRIOR_RATE * (vc.sigma + vc.tau_intercept + vc.tau_slope)
        + (LKJ_ETA - 1.0) * (1.0 - vc.rho * vc.rho).ln()
}

fn prior_precision() -> Matrix2<f64> {
    Matrix2::new(
        1.0 / (INTERCEPT_PRIOR_SD * INTERCEPT_PRIOR_SD),
        0.0,
        0.0,
        1.0 / (SLOPE_PRIOR_SD * SLOPE_PRIOR_SD),
    )
}

/// Conditional posterior of one condition's `(intercept, slope)` given the
/// variance components, plus the pieces of its marginal likelihood
pub(crate) struct FixedEffectPosterior {
    pub mean: Vector2<f64>,
    pub precision_chol: Cholesky<f64, nalgebra::Const<2>>,
    log_marginal: f64,
}

impl FixedEffectPosterior {
    pub fn new(summary: &ConditionSummary, vc: &VarianceComponents) -> Option<Self> {
        let design = Matrix2::new(1.0, 0.0, 1.0, 1.0);
        let covariance = vc.complete_covariance();
        let cov_chol = Cholesky::new(covariance)?;
        let weight = cov_chol.inverse();
        let log_det_cov = 2.0 * cov_chol.l().diagonal().map(f64::ln).sum();
        let v0 = vc.baseline_variance();

        let n_complete = summary.n_complete as f64;
        let n_baseline = summary.n_baseline_only as f64;

        let mut precision = prior_precision() + design.transpose() * weight * design * n_complete;
        precision[(0, 0)] += n_baseline / v0;

        let mut linear = design.transpose() * weight * summary.sum_complete;
        linear[0] += summary.sum_baseline_only / v0;

        let quadratic =
            weight.component_mul(&summary.cross_complete).sum() + summary.sq_baseline_only / v0;
        let log_det_data = n_complete * log_det_cov + n_baseline * v0.ln();

        let precision_chol = Cholesky::new(precision)?;
        let mean = precision_chol.solve(&linear);
        let log_det_precision = 2.0 * precision_chol.l().diagonal().map(f64::ln).sum();
        let log_det_prior = prior_precision().determinant().ln();

        let log_marginal = -0.5 * (quadratic - linear.dot(&mean))
            + 0.5 * log_det_prior
            - 0.5 * log_det_precision
            - 0.5 * log_det_data
            - 0.5 * summary.n_observations() as f64 * (2.0 * PI).ln();

        Some(Self {
            mean,
            precision_chol,
            log_marginal,
        })
    }

    /// Maps a standard normal vector to a draw from this posterior
    pub fn transform(&self, z: &Vector2<f64>) -> Option<Vector2<f64>> {
        self.precision_chol
            .l()
            .transpose()
            .solve_upper_triangular(z)
            .map(|offset| self.mean + offset)
    }
}

/// Log density of the observed outcomes given variance components, with
/// random and fixed effects integrated out. `None` if any covariance is not
/// positive definite.
pub(crate) fn log_marginal_likelihood(
    summary: &DatasetSummary,
    vc: &VarianceComponents,
) -> Option<f64> {
    Condition::ALL.iter().try_fold(0.0, |acc, &condition| {
        FixedEffectPosterior::new(summary.condition(condition), vc)
            .map(|posterior| acc + posterior.log_marginal)
    })
}

/// Unnormalized log posterior of the variance components
pub(crate) fn log_posterior(summary: &DatasetSummary, theta: &Unconstrained) -> f64 {
    let Some(point) = VarianceComponents::from_unconstrained(theta) else {
        return f64::NEG_INFINITY;
    };
    match log_marginal_likelihood(summary, &point.components) {
        Some(ll) if ll.is_finite() => ll + log_prior(&point.components) + point.log_jacobian,
        _ => f64::NEG_INFINITY,
    }
}
