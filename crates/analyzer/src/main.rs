//! remtrack CLI
//!
//! Subcommands mirror the analysis pipelines: `track` rebuilds remediation
//! history, `plan` prioritizes open failures, `risk` runs the quantitative
//! model, `summary` aggregates scan statistics, `diff` compares two
//! snapshots.
//!
//! Usage:
//!   remtrack track ./scans/ --output tracking.csv
//!   remtrack plan ./scans/ --output plan.csv
//!   remtrack risk ./scans/ --output risk.json
//!   remtrack diff before.csv after.csv

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use remtrack_analyzer::error::AnalyzerError;
use remtrack_analyzer::report::{self, RiskReport, SummaryReport};
use remtrack_analyzer::risk;
use remtrack_analyzer::{account_metrics, ingest, prioritize, reconstruct, summarize, PriorityPolicy};

use remtrack_analyzer::diff as snapshot;

/// Security finding lifecycle tracker for Prowler scan exports
#[derive(Parser, Debug)]
#[command(name = "remtrack")]
#[command(about = "Track, prioritize, and model cloud security findings over time")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconstruct per-resource remediation history
    Track {
        /// CSV/JSON file or directory of CSV scan exports
        input: PathBuf,

        /// Output CSV path (stdout JSON when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Build a prioritized remediation plan from current failures
    Plan {
        /// CSV/JSON file or directory of CSV scan exports
        input: PathBuf,

        /// Output CSV path (stdout JSON when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Age saturation cap in days
        #[arg(long, default_value = "100")]
        age_cap: i64,
    },

    /// Estimate quantified risk with confidence intervals
    Risk {
        /// CSV/JSON file or directory of CSV scan exports
        input: PathBuf,

        /// Output JSON path (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Aggregate scan statistics and per-account posture
    Summary {
        /// CSV/JSON file or directory of CSV scan exports
        input: PathBuf,

        /// Output JSON path (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Compare two scan snapshots
    Diff {
        /// Earlier snapshot (CSV or JSON)
        before: PathBuf,

        /// Later snapshot (CSV or JSON)
        after: PathBuf,

        /// Output JSON path (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "remtrack=info".into()),
        )
        .init();

    let args = Args::parse();
    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "analysis failed");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), AnalyzerError> {
    match command {
        Command::Track { input, output } => {
            let findings = ingest::load_input(&input)?;
            let records = reconstruct(&findings);
            info!(records = records.len(), "reconstructed remediation history");
            match output {
                Some(path) => report::write_tracking_csv(&records, &path)?,
                None => print_json(&records)?,
            }
        }
        Command::Plan {
            input,
            output,
            age_cap,
        } => {
            let findings = ingest::load_input(&input)?;
            let records = reconstruct(&findings);
            let policy = PriorityPolicy {
                age_cap_days: age_cap,
                ..PriorityPolicy::default()
            };
            let plan = prioritize(&records, &policy);
            info!(entries = plan.len(), "built remediation plan");
            match output {
                Some(path) => report::write_plan_csv(&plan, &path)?,
                None => print_json(&plan)?,
            }
        }
        Command::Risk { input, output } => {
            let findings = ingest::load_input(&input)?;
            let inputs = risk::estimate_parameters(&findings, &risk::SeverityCosts::default());
            let intervals =
                risk::confidence_intervals(&inputs, &risk::DEFAULT_CONFIDENCE_LEVELS);
            let estimate = risk::assess(&findings);
            let report = RiskReport {
                generated_at: Utc::now(),
                model_inputs: inputs,
                confidence_intervals: intervals,
                estimate,
            };
            match output {
                Some(path) => report::write_json(&report, &path)?,
                None => print_json(&report)?,
            }
        }
        Command::Summary { input, output } => {
            let findings = ingest::load_input(&input)?;
            let report = SummaryReport {
                generated_at: Utc::now(),
                summary: summarize(&findings),
                accounts: account_metrics(&findings),
            };
            match output {
                Some(path) => report::write_json(&report, &path)?,
                None => print_json(&report)?,
            }
        }
        Command::Diff {
            before,
            after,
            output,
        } => {
            let before = ingest::load_input(&before)?;
            let after = ingest::load_input(&after)?;
            let d = snapshot::diff(&before, &after);
            info!(
                new_failures = d.new_failures.len(),
                fixed = d.fixed.len(),
                "compared snapshots"
            );
            match output {
                Some(path) => report::write_json(&d, &path)?,
                None => print_json(&d)?,
            }
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AnalyzerError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
