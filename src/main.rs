//! CLI entry point for the marks grader.
//!
//! Provides subcommands for plotting a grade ledger from raw score text,
//! finalizing and submitting a grade sheet, and restoring a saved session
//! snapshot.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use marks_grader::{
    finalize::build_submission,
    ledger::{Ledger, NUM_BANDS},
    output::{print_json, write_grades_csv, write_view},
    snapshot::SavedSheet,
    submit::{BasicClient, post_submission},
};
use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// One `--set INDEX:ENABLED:CUTOFF` cut-off edit from the command line.
#[derive(Debug, Clone)]
struct CutOffEdit {
    index: usize,
    enabled: bool,
    cut_off: u32,
}

fn parse_edit(s: &str) -> Result<CutOffEdit, String> {
    let parts: Vec<&str> = s.split(':').collect();
    let [index, enabled, cut_off] = parts.as_slice() else {
        return Err(format!("expected INDEX:ENABLED:CUTOFF, got '{s}'"));
    };
    Ok(CutOffEdit {
        index: index.parse().map_err(|_| format!("bad band index '{index}'"))?,
        enabled: enabled.parse().map_err(|_| format!("bad enabled flag '{enabled}'"))?,
        cut_off: cut_off.parse().map_err(|_| format!("bad cut-off '{cut_off}'"))?,
    })
}

#[derive(Parser)]
#[command(name = "marks_grader")]
#[command(about = "Grade-band histogram and grade-point tool for pasted marks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a grade ledger from raw score text and print its view as JSON
    Plot {
        /// Scores file, or '-' to read from stdin
        #[arg(value_name = "SCORES_FILE")]
        scores: String,

        /// Maximum attainable score (must be at least the highest mark)
        #[arg(short, long)]
        max_score: u32,

        /// Course title, stored in the session snapshot
        #[arg(short, long, default_value = "")]
        title: String,

        /// JSON file with semester course totals: [["CS101", 55], ...]
        #[arg(long)]
        courses: Option<PathBuf>,

        /// Cut-off edits applied in order, e.g. --set 0:true:85
        #[arg(long = "set", value_parser = parse_edit)]
        edits: Vec<CutOffEdit>,

        /// Write the ledger view JSON to this file as well
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a reloadable session snapshot to this file
        #[arg(long)]
        snapshot_out: Option<PathBuf>,
    },
    /// Assign letter grades, write the grades CSV, and optionally submit
    Finalize {
        /// Scores file, or '-' to read from stdin
        #[arg(value_name = "SCORES_FILE")]
        scores: String,

        /// Maximum attainable score (must be at least the highest mark)
        #[arg(short, long)]
        max_score: u32,

        /// JSON file with semester course totals: [["CS101", 55], ...]
        #[arg(long)]
        courses: Option<PathBuf>,

        /// Cut-off edits applied in order, e.g. --set 0:true:85
        #[arg(long = "set", value_parser = parse_edit)]
        edits: Vec<CutOffEdit>,

        /// CSV file to write the per-student grades to
        #[arg(short, long, default_value = "grades.csv")]
        output: PathBuf,

        /// Endpoint to POST the finalized grade sheet to
        #[arg(long)]
        submit_url: Option<String>,

        /// Mark the payload as save-and-submit
        #[arg(long, default_value_t = false)]
        save_n_submit: bool,
    },
    /// Restore a saved session snapshot and print its ledger view
    Restore {
        /// Snapshot JSON file produced by `plot --snapshot-out`
        #[arg(value_name = "SNAPSHOT_FILE")]
        snapshot: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/marks_grader.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("marks_grader.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plot {
            scores,
            max_score,
            title,
            courses,
            edits,
            output,
            snapshot_out,
        } => {
            let raw = read_scores(&scores)?;
            let ledger = build_ledger(&raw, max_score, courses.as_deref(), &edits)?;
            let view = ledger.view();
            print_json(&view)?;
            if let Some(path) = output {
                write_view(&path, &view)?;
            }
            if let Some(path) = snapshot_out {
                SavedSheet::capture(&title, &raw, &ledger).save(&path)?;
                info!(path = %path.display(), "Session snapshot saved");
            }
        }
        Commands::Finalize {
            scores,
            max_score,
            courses,
            edits,
            output,
            submit_url,
            save_n_submit,
        } => {
            let raw = read_scores(&scores)?;
            let ledger = build_ledger(&raw, max_score, courses.as_deref(), &edits)?;
            let submission = build_submission(&ledger, save_n_submit)?;
            write_grades_csv(&output, &submission.csv)?;
            if let Some(url) = submit_url {
                let client = BasicClient::new();
                let redirect = post_submission(&client, &url, &submission).await?;
                info!(redirect = %redirect, "Submission accepted");
                println!("{redirect}");
            }
        }
        Commands::Restore { snapshot } => {
            let sheet = SavedSheet::load(&snapshot)
                .with_context(|| format!("failed to read snapshot {}", snapshot.display()))?;
            let ledger = sheet.restore()?;
            info!(course_title = %sheet.course_title, "Snapshot restored");
            print_json(&ledger.view())?;
        }
    }

    Ok(())
}

/// Reads raw score text from a file path or stdin (`-`).
fn read_scores(source: &str) -> Result<String> {
    if source == "-" {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        Ok(raw)
    } else {
        std::fs::read_to_string(source).with_context(|| format!("failed to read {source}"))
    }
}

/// Builds a ledger from raw text, applies course totals and cut-off edits.
fn build_ledger(
    raw: &str,
    max_score: u32,
    courses: Option<&Path>,
    edits: &[CutOffEdit],
) -> Result<Ledger> {
    let mut ledger = Ledger::from_text(raw, max_score)?;

    if let Some(path) = courses {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let totals: Vec<(String, f64)> = serde_json::from_str(&content)?;
        ledger.set_courses(totals);
    }

    for edit in edits {
        if edit.index >= NUM_BANDS {
            bail!("band index {} out of range (0..{})", edit.index, NUM_BANDS);
        }
        if edit.cut_off > max_score {
            bail!("cut-off {} exceeds max score {}", edit.cut_off, max_score);
        }
        ledger.set_cut_off(edit.index, edit.enabled, edit.cut_off);
    }

    Ok(ledger)
}
