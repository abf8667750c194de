use rayon::prelude::*;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::{PowerAnalysisConfig, RunSettings, TrialConfig};
use crate::error::PowerSimErr;
use crate::estimation::model::{HierarchicalModel, PosteriorSampler};
use crate::hypothesis::types::Hypothesis;
use crate::simulation::replicate::run_replicate;
use crate::simulation::types::{PowerReport, ReplicateResult, RunStatus};
use crate::summary::{PowerSummary, summarize_hypothesis};

/// Runs the full power analysis with the hierarchical model.
///
/// An invalid configuration stops the run before any replicate starts.
pub fn run_power_analysis(config: &PowerAnalysisConfig) -> Result<PowerReport, PowerSimErr> {
    config.validate()?;
    let model = HierarchicalModel::new(config.sampler).with_parallel_chains(config.run.parallel);
    run_power_analysis_with(&config.trial, &config.run, &model)
}

/// Runs the power analysis with any posterior sampler.
///
/// Replicates not yet started when the time budget runs out, and those past
/// `max_replicates`, are skipped and reported in the run status. Results are
/// identical whether replicates are dispatched in parallel or in order.
pub fn run_power_analysis_with<S: PosteriorSampler + ?Sized>(
    trial: &TrialConfig,
    run: &RunSettings,
    sampler: &S,
) -> Result<PowerReport, PowerSimErr> {
    trial.validate()?;
    run.validate()?;

    let n_requested = trial.n_simulations;
    let n_dispatched = run
        .max_replicates
        .map_or(n_requested, |max| max.min(n_requested));
    let deadline = run.time_budget().map(|budget| Instant::now() + budget);
    info!(
        n_requested,
        n_dispatched,
        parallel = run.parallel,
        seed = trial.seed,
        "starting power analysis"
    );

    //----------------------------------------
    // Dispatch replicates
    let attempt = |index: usize| -> Option<ReplicateResult> {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return None;
        }
        Some(run_replicate(trial, sampler, index))
    };
    let outcomes: Vec<Option<ReplicateResult>> = if run.parallel {
        (0..n_dispatched).into_par_iter().map(attempt).collect()
    } else {
        (0..n_dispatched).map(attempt).collect()
    };
    let replicates: Vec<ReplicateResult> = outcomes.into_iter().flatten().collect();

    //----------------------------------------
    // Aggregate
    let n_attempted = replicates.len();
    let n_completed = replicates.iter().filter(|r| r.is_converged()).count();
    let n_failed = n_attempted - n_completed;
    let n_skipped = n_requested - n_attempted;

    let summaries: Vec<PowerSummary> = Hypothesis::ALL
        .into_iter()
        .map(|hypothesis| {
            let probabilities: Vec<f64> = replicates
                .iter()
                .map(|r| r.probability(hypothesis))
                .collect();
            summarize_hypothesis(
                hypothesis,
                &probabilities,
                trial.prob_threshold,
                run.credible_mass,
                n_requested,
            )
        })
        .collect();

    let status = if n_attempted > 0 && n_completed == 0 {
        RunStatus::AllFailed
    } else if n_skipped > 0 {
        RunStatus::Partial { skipped: n_skipped }
    } else {
        RunStatus::Complete
    };
    for summary in &summaries {
        info!(
            hypothesis = %summary.hypothesis,
            contrast = summary.hypothesis.description(),
            power = summary.power,
            median_probability = summary.median_probability,
            n_contributing = summary.n_contributing,
            "hypothesis summary"
        );
    }
    if n_skipped > 0 {
        warn!(n_skipped, n_requested, "budget exhausted before all replicates started");
    }
    info!(
        n_completed,
        n_failed,
        n_skipped,
        ?status,
        "power analysis finished"
    );

    Ok(PowerReport {
        summaries,
        replicates,
        n_requested,
        n_completed,
        n_failed,
        n_skipped,
        status,
    })
}
