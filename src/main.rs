// Docket Ledger: reads saved docket pages for one subject and writes a JSON
// report of what was assessed, what was paid, and for how many months in a
// row.
//
// Configuration comes from DOCKET_LEDGER_* variables (see config.rs).

use std::fs;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use docket_ledger_engine::config::{Config, LogFormat};
use docket_ledger_engine::metrics::MetricsCollector;
use docket_ledger_engine::{BatchReport, DirectorySource, LedgerBatch};

fn print_banner() {
    let banner = r#"
    ╔══════════════════════════════════════════════════════════╗
    ║                                                          ║
    ║        ⚖  DOCKET LEDGER: FEES, PAYMENTS, STREAKS  ⚖       ║
    ║                                                          ║
    ║   Input:    saved docket pages, one per case             ║
    ║   Output:   issued / paid ledgers + monthly streaks      ║
    ║   Workers:  rayon, one docket per core                   ║
    ║                                                          ║
    ║   "The clerk wrote it down. We just add it up."          ║
    ║                                                          ║
    ╚══════════════════════════════════════════════════════════╝
    "#;
    // stdout may be carrying the report.
    eprintln!("{}", banner);
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Pretty => fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(true)
            .with_writer(std::io::stderr)
            .init(),
    }
}

fn main() -> Result<()> {
    let config = Config::from_env();
    init_tracing(config.log_format);
    print_banner();

    info!(
        input_dir = %config.input_dir.display(),
        threads = config.threads,
        pretty = config.pretty,
        "Configuration loaded"
    );

    let Some(subject) = config.subject() else {
        bail!("DOCKET_LEDGER_FIRST_NAME and DOCKET_LEDGER_LAST_NAME must both be set");
    };

    if config.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build_global()
            .context("failed to size the rayon worker pool")?;
    }

    let source = DirectorySource::new(&config.input_dir);
    let mut cases = config.case_list();
    if cases.is_empty() {
        cases = source
            .discover()
            .with_context(|| format!("failed to list docket pages in {}", config.input_dir.display()))?;
    }
    if cases.is_empty() {
        warn!(input_dir = %config.input_dir.display(), "No cases to process");
    }

    let metrics = MetricsCollector::new();
    let outcomes = LedgerBatch::new(&subject, &metrics).run_source(&source, &cases);
    let snapshot = metrics.snapshot();
    let report = BatchReport::from_outcomes(&subject, &outcomes, &cases).with_metrics(snapshot.clone());

    let json = if config.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("failed to serialize the report")?;

    match &config.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write report to {}", path.display()))?;
            info!(path = %path.display(), "Report written");
        }
        None => println!("{}", json),
    }

    info!("═══════════════════════════════════════════════════════");
    info!(
        subject = %subject,
        cases = snapshot.cases_attempted,
        succeeded = snapshot.cases_succeeded,
        without_data = snapshot.cases_without_data,
        unavailable = snapshot.cases_unavailable,
        elapsed_ms = snapshot.elapsed_ms,
        "Batch complete"
    );
    info!(
        owed = %report.summary.total_fees_issued,
        paid = %report.summary.total_fees_paid,
        best_streak = report.summary.max_consecutive_months_individual,
        combined_streak = report.summary.max_consecutive_months_all_cases,
        "Totals"
    );
    info!("═══════════════════════════════════════════════════════");
    Ok(())
}
