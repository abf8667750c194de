use trialpower::report::write_power_csv;
use trialpower::{
    Hypothesis, PowerAnalysisConfig, RunSettings, RunStatus, SamplerSettings, TrialConfig,
    run_power_analysis,
};

#[test]
fn reference_scenario_end_to_end() {
    let config = PowerAnalysisConfig::from_toml_str(
        r#"
        [trial]
        arm_sizes = [50, 30, 30]
        effect_sizes = [1.24, 1.24, 1.24]
        icc = 0.5
        dropout_rate = 0.2
        ni_margin = 0.5
        prob_threshold = 0.89
        n_simulations = 50
        seed = 1
        "#,
    )
    .expect("failed to parse scenario");

    let report = run_power_analysis(&config).expect("power analysis failed");
    assert_eq!(report.summaries.len(), 2);
    assert_eq!(report.n_requested, 50);
    assert!(report.n_completed <= 50);
    assert_eq!(report.n_completed + report.n_failed + report.n_skipped, 50);
    for summary in &report.summaries {
        assert_eq!(summary.n_contributing, report.n_completed);
        if summary.n_contributing > 0 {
            assert!((0.0..=1.0).contains(&summary.power), "{summary:?}");
            assert!(summary.ci_lower <= summary.median_probability);
            assert!(summary.median_probability <= summary.ci_upper);
        }
    }

    let mut csv = Vec::new();
    write_power_csv(&report, &mut csv).unwrap();
    let csv = String::from_utf8(csv).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.lines().next().unwrap().ends_with(",n_failed,n_skipped,run_status"));
    assert!(csv.lines().skip(1).all(|line| line.ends_with(report.status.label())));
}

#[test]
fn equal_effects_with_lenient_margin_have_high_power() {
    let config = PowerAnalysisConfig {
        trial: TrialConfig {
            arm_sizes: [100, 100, 100],
            effect_sizes: [0.5, 0.5, 0.5],
            icc: 0.0,
            ni_margin: 1.0,
            n_simulations: 6,
            seed: 11,
            ..Default::default()
        },
        sampler: SamplerSettings {
            chains: 2,
            warmup: 500,
            draws: 500,
            max_rhat: 1.05,
            min_ess: 100.0,
        },
        ..Default::default()
    };

    let report = run_power_analysis(&config).expect("power analysis failed");
    assert_ne!(report.status, RunStatus::AllFailed);
    let h2 = report.summary(Hypothesis::H2).unwrap();
    assert!(h2.n_contributing > 0);
    assert!(h2.power >= 0.8, "{h2:?}");
    assert!(h2.median_probability > 0.95, "{h2:?}");
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let trial = TrialConfig {
        arm_sizes: [20, 20, 20],
        n_simulations: 4,
        seed: 5,
        ..Default::default()
    };
    let sampler = SamplerSettings {
        chains: 2,
        warmup: 200,
        draws: 200,
        max_rhat: 1.5,
        min_ess: 10.0,
    };
    let parallel = PowerAnalysisConfig {
        trial: trial.clone(),
        sampler,
        ..Default::default()
    };
    let sequential = PowerAnalysisConfig {
        run: RunSettings {
            parallel: false,
            ..Default::default()
        },
        ..parallel.clone()
    };

    let a = run_power_analysis(&parallel).unwrap();
    let b = run_power_analysis(&sequential).unwrap();
    assert_eq!(a.replicates.len(), b.replicates.len());
    for (x, y) in a.replicates.iter().zip(&b.replicates) {
        assert_eq!(x.seed, y.seed);
        assert_eq!(x.status, y.status);
        assert_eq!(x.prob_h1.to_bits(), y.prob_h1.to_bits());
        assert_eq!(x.prob_h2.to_bits(), y.prob_h2.to_bits());
    }
}

#[test]
fn invalid_configuration_rejected_before_running() {
    let mut config = PowerAnalysisConfig::default();
    config.trial.prob_threshold = 1.5;
    assert!(matches!(
        run_power_analysis(&config),
        Err(trialpower::PowerSimErr::InvalidConfig(_))
    ));
}
