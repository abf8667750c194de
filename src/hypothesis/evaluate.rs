use crate::error::PowerSimErr;
use crate::estimation::types::PosteriorDraws;
use crate::hypothesis::{
    error::HypothesisError,
    types::{Hypothesis, HypothesisProbabilities},
};

/// Fraction of draws whose contrast lies below the non-inferiority margin.
///
/// Every draw counts; a draw with a NaN contrast counts as not satisfying the
/// inequality.
pub fn non_inferiority_probability(
    draws: &PosteriorDraws,
    hypothesis: Hypothesis,
    ni_margin: f64,
) -> Result<f64, PowerSimErr> {
    if draws.is_empty() {
        return Err(HypothesisError::EmptyPosterior.into());
    }
    let below = draws
        .iter()
        .filter(|draw| hypothesis.contrast(draw) < ni_margin)
        .count();
    Ok(below as f64 / draws.len() as f64)
}

pub fn evaluate_hypotheses(
    draws: &PosteriorDraws,
    ni_margin: f64,
) -> Result<HypothesisProbabilities, PowerSimErr> {
    Ok(HypothesisProbabilities {
        h1: non_inferiority_probability(draws, Hypothesis::H1, ni_margin)?,
        h2: non_inferiority_probability(draws, Hypothesis::H2, ni_margin)?,
    })
}
