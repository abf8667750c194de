//----------------------------------------
// Report writers
//----------------------------------------
//! CSV and JSON renderings of a power report and of a randomization list.
//! Missing values (NaN) are written as empty CSV fields.
use itertools::Itertools;
use std::io::Write;

use crate::error::PowerSimErr;
use crate::randomization::types::Assignment;
use crate::simulation::types::PowerReport;

pub const POWER_HEADER: [&str; 11] = [
    "hypothesis",
    "median_probability",
    "sd_probability",
    "ci_lower",
    "ci_upper",
    "power",
    "n_contributing",
    "n_requested",
    "n_failed",
    "n_skipped",
    "run_status",
];

pub const REPLICATE_HEADER: [&str; 6] = [
    "replicate",
    "seed",
    "prob_h1",
    "prob_h2",
    "status",
    "reason",
];

pub const ASSIGNMENT_HEADER: [&str; 4] = ["id", "stratum", "condition", "block"];

fn number(x: f64) -> String {
    if x.is_nan() {
        String::new()
    } else {
        x.to_string()
    }
}

/// Quotes a field when it would otherwise break the row
fn text(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn write_row<W: Write, I: IntoIterator<Item = String>>(
    out: &mut W,
    fields: I,
) -> Result<(), PowerSimErr> {
    writeln!(out, "{}", fields.into_iter().join(","))?;
    Ok(())
}

/// One row per hypothesis. Every row repeats the run status, so a run cut
/// short by its budget reads `partial` with the number of skipped replicates.
pub fn write_power_csv<W: Write>(report: &PowerReport, out: &mut W) -> Result<(), PowerSimErr> {
    write_row(out, POWER_HEADER.map(String::from))?;
    for s in &report.summaries {
        write_row(
            out,
            [
                s.hypothesis.name().to_string(),
                number(s.median_probability),
                number(s.sd_probability),
                number(s.ci_lower),
                number(s.ci_upper),
                number(s.power),
                s.n_contributing.to_string(),
                s.n_requested.to_string(),
                report.n_failed.to_string(),
                report.n_skipped.to_string(),
                report.status.label().to_string(),
            ],
        )?;
    }
    Ok(())
}

/// One row per attempted replicate; skipped replicates do not appear
pub fn write_replicates_csv<W: Write>(
    report: &PowerReport,
    out: &mut W,
) -> Result<(), PowerSimErr> {
    write_row(out, REPLICATE_HEADER.map(String::from))?;
    for r in &report.replicates {
        write_row(
            out,
            [
                r.index.to_string(),
                r.seed.to_string(),
                number(r.prob_h1),
                number(r.prob_h2),
                r.status.label().to_string(),
                text(r.status.reason()),
            ],
        )?;
    }
    Ok(())
}

pub fn write_assignments_csv<W: Write>(
    assignments: &[Assignment],
    out: &mut W,
) -> Result<(), PowerSimErr> {
    write_row(out, ASSIGNMENT_HEADER.map(String::from))?;
    for a in assignments {
        write_row(
            out,
            [
                text(&a.id),
                text(&a.stratum),
                a.condition.label().to_string(),
                a.block.to_string(),
            ],
        )?;
    }
    Ok(())
}

pub fn write_report_json<W: Write>(report: &PowerReport, out: &mut W) -> Result<(), PowerSimErr> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}
