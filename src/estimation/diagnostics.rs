//----------------------------------------
// MCMC convergence diagnostics
//----------------------------------------
//! Split-chain potential scale reduction and multi-chain effective sample
//! size (Gelman et al., Bayesian Data Analysis 3rd ed., ch. 11).

/// Splits every chain into a first and second half, dropping the middle
/// draw of odd-length chains
fn split_chains(chains: &[Vec<f64>]) -> Vec<&[f64]> {
    chains
        .iter()
        .flat_map(|chain| {
            let half = chain.len() / 2;
            [&chain[..half], &chain[chain.len() - half..]]
        })
        .filter(|half| !half.is_empty())
        .collect()
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample variance with n - 1 denominator
fn sample_variance(xs: &[f64]) -> f64 {
    let m = mean(xs);
    xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (xs.len() as f64 - 1.0)
}

/// Biased lag-`lag` autocovariance
fn autocovariance(xs: &[f64], chain_mean: f64, lag: usize) -> f64 {
    let n = xs.len();
    xs[..n - lag]
        .iter()
        .zip(&xs[lag..])
        .map(|(a, b)| (a - chain_mean) * (b - chain_mean))
        .sum::<f64>()
        / n as f64
}

/// Split R-hat. Constant identical chains give 1.0; constant chains that
/// disagree give infinity.
pub fn split_rhat(chains: &[Vec<f64>]) -> f64 {
    let split = split_chains(chains);
    let m = split.len();
    if m < 2 {
        return f64::NAN;
    }
    let n = split.iter().map(|c| c.len()).min().unwrap_or(0);
    if n < 2 {
        return f64::NAN;
    }

    let means: Vec<f64> = split.iter().map(|c| mean(&c[..n])).collect();
    let within = split.iter().map(|c| sample_variance(&c[..n])).sum::<f64>() / m as f64;
    let between = n as f64 * sample_variance(&means);

    if within == 0.0 {
        return if between == 0.0 { 1.0 } else { f64::INFINITY };
    }
    let n = n as f64;
    let var_plus = (n - 1.0) / n * within + between / n;
    (var_plus / within).sqrt()
}

/// Effective sample size across split chains, truncating the
/// autocorrelation sum with Geyer's initial monotone sequence
pub fn effective_sample_size(chains: &[Vec<f64>]) -> f64 {
    let split = split_chains(chains);
    let m = split.len();
    let n = split.iter().map(|c| c.len()).min().unwrap_or(0);
    if m == 0 || n < 4 {
        return 0.0;
    }
    let split: Vec<&[f64]> = split.into_iter().map(|c| &c[..n]).collect();
    let total = (m * n) as f64;

    let chain_means: Vec<f64> = split.iter().map(|c| mean(c)).collect();
    let nf = n as f64;
    let mean_var = split
        .iter()
        .zip(&chain_means)
        .map(|(c, &mu)| autocovariance(c, mu, 0))
        .sum::<f64>()
        / m as f64
        * nf
        / (nf - 1.0);
    let mut var_plus = mean_var * (nf - 1.0) / nf;
    if m > 1 {
        var_plus += sample_variance(&chain_means);
    }
    if var_plus <= 0.0 {
        return total;
    }

    let rho = |lag: usize| -> f64 {
        let mean_acov = split
            .iter()
            .zip(&chain_means)
            .map(|(c, &mu)| autocovariance(c, mu, lag))
            .sum::<f64>()
            / m as f64;
        1.0 - (mean_var - mean_acov) / var_plus
    };

    // Sum of consecutive even/odd autocorrelation pairs, stopping at the
    // first non-positive pair and forcing the sequence to be non-increasing
    let mut pair_sum_total = 0.0;
    let mut previous_pair = f64::INFINITY;
    let mut lag = 0;
    while lag + 1 < n {
        let even = if lag == 0 { 1.0 } else { rho(lag) };
        let pair = (even + rho(lag + 1)).min(previous_pair);
        if pair <= 0.0 {
            break;
        }
        pair_sum_total += pair;
        previous_pair = pair;
        lag += 2;
    }

    let tau = (-1.0 + 2.0 * pair_sum_total).max(1.0 / total.log10());
    total / tau
}
