use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use trialpower::randomization::generate_list;
use trialpower::report::{
    write_assignments_csv, write_power_csv, write_replicates_csv, write_report_json,
};
use trialpower::{PowerAnalysisConfig, RunStatus, run_power_analysis};

#[derive(Parser)]
#[command(name = "trialpower")]
#[command(about = "Simulation-based power analysis for a three-arm Bayesian non-inferiority trial")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the power simulation and write the per-hypothesis summary
    Simulate {
        /// TOML configuration file
        #[arg(long)]
        config: PathBuf,
        /// Power summary CSV (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Per-replicate results CSV
        #[arg(long)]
        replicates: Option<PathBuf>,
        /// Print the full report as JSON on stdout
        #[arg(long)]
        json: bool,
        /// Run replicates one after another instead of in parallel
        #[arg(long)]
        sequential: bool,
        /// Log every replicate
        #[arg(long, short)]
        verbose: bool,
    },
    /// Write a permuted-block randomization list
    Randomize {
        /// TOML configuration file
        #[arg(long)]
        config: PathBuf,
        /// Allocation list CSV (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, short)]
        verbose: bool,
    },
    /// Write the default configuration
    InitConfig {
        /// Destination file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Commands::Simulate { verbose, .. } | Commands::Randomize { verbose, .. } => *verbose,
            Commands::InitConfig { .. } => false,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "trialpower=debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Buffered writer to `path`, or to stdout when no path is given
fn output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn load_config(path: &Path) -> anyhow::Result<PowerAnalysisConfig> {
    PowerAnalysisConfig::from_file(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Simulate {
            config,
            out,
            replicates,
            json,
            sequential,
            ..
        } => {
            let mut config = load_config(&config)?;
            if sequential {
                config.run.parallel = false;
            }
            let report = run_power_analysis(&config)?;

            if json {
                let mut stdout = output(None)?;
                write_report_json(&report, &mut stdout)?;
                stdout.flush()?;
            }
            if out.is_some() || !json {
                let mut writer = output(out.as_deref())?;
                write_power_csv(&report, &mut writer)?;
                writer.flush()?;
            }
            if let Some(path) = replicates.as_deref() {
                let mut writer = output(Some(path))?;
                write_replicates_csv(&report, &mut writer)?;
                writer.flush()?;
            }

            Ok(match report.status {
                RunStatus::Complete => ExitCode::SUCCESS,
                RunStatus::Partial { .. } => ExitCode::from(2),
                RunStatus::AllFailed => ExitCode::from(3),
            })
        }
        Commands::Randomize { config, out, .. } => {
            let config = load_config(&config)?;
            let assignments = generate_list(&config.randomization)?;
            let mut writer = output(out.as_deref())?;
            write_assignments_csv(&assignments, &mut writer)?;
            writer.flush()?;
            info!(n = assignments.len(), "wrote randomization list");
            Ok(ExitCode::SUCCESS)
        }
        Commands::InitConfig { out } => {
            let contents = PowerAnalysisConfig::default().to_toml_string()?;
            let mut writer = output(out.as_deref())?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.command.verbose());

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
