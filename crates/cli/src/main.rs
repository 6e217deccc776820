mod inputs;

use anyhow::{anyhow, bail, Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::PathBuf,
    sync::Mutex,
};

use clap::{Parser, Subcommand};
use escale_core::{
    batch::DocumentFailure,
    build_plan,
    config::{self, AppConfig, LoggingSettings},
    discharge::manifest_container_ids,
    models::filter_rows_by_size,
    BatchOutcome, BlGroup, Flattener, Pipeline, ReconciliationReport, SharedDischargeLog,
    SizeClass,
};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "escale")]
#[command(about = "Cargo manifest analysis and discharge planning")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse manifest documents and print one record per vessel call as JSON
    Analyze {
        /// Manifest files or directories searched for *.json
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Include the flattened container rows in the output
        #[arg(long)]
        rows: bool,

        /// Keep only rows of this size (20, 40, 45 or unknown)
        #[arg(long, value_parser = parse_size)]
        size: Option<SizeClass>,
    },

    /// Group a manifest per waybill and check it against discharge reports
    Plan {
        /// Manifest document
        manifest: PathBuf,

        /// Operator discharge report (plain text). Repeatable.
        #[arg(long, short = 'd')]
        discharge: Vec<PathBuf>,
    },
}

#[derive(Serialize)]
struct PlanOutput {
    vessel: String,
    groups: Vec<BlGroup>,
    reconciliation: ReconciliationReport,
}

fn parse_size(raw: &str) -> Result<SizeClass, String> {
    raw.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    let classifier = config
        .analysis
        .classifier()
        .context("invalid hazard keyword list")?;
    let pipeline = Pipeline::with_flattener(Flattener::with_classifier(classifier));

    match cli.command {
        Commands::Analyze { paths, rows, size } => analyze(pipeline, &paths, rows, size).await,
        Commands::Plan {
            manifest,
            discharge,
        } => plan(pipeline, manifest, &discharge).await,
    }
}

async fn analyze<C>(
    pipeline: Pipeline<C>,
    inputs: &[PathBuf],
    include_rows: bool,
    size: Option<SizeClass>,
) -> Result<()>
where
    C: escale_core::HazardClassifier + Clone + 'static,
{
    let paths = inputs::collect_manifest_paths(inputs)?;
    if paths.is_empty() {
        bail!("no manifest document found in the given paths");
    }

    let mut tasks = Vec::with_capacity(paths.len());
    for path in paths {
        let name = inputs::source_name(&path);
        let text = inputs::read_text(&path).await;
        let pipeline = pipeline.clone();
        let task = tokio::task::spawn_blocking(move || {
            let outcome = text.map(|text| pipeline.process_text(&name, &text));
            (name, outcome)
        });
        tasks.push(task);
    }

    let mut outcome = BatchOutcome::default();
    for task in tasks {
        let (name, result) = task.await?;
        match result {
            Ok(processed) => outcome.push(&name, processed),
            Err(err) => {
                warn!(document = %name, "Unreadable manifest document: {err:#}");
                outcome.failures.push(DocumentFailure {
                    source_name: name,
                    reason: format!("{err:#}"),
                });
            }
        }
    }

    for record in &mut outcome.records {
        record.rows = if include_rows {
            filter_rows_by_size(&record.rows, size)
        } else {
            Vec::new()
        };
    }

    info!(
        processed = outcome.records.len(),
        failed = outcome.failures.len(),
        "Batch finished"
    );
    if let Some(summary) = outcome.failure_summary() {
        eprintln!("{summary}");
    }
    print_json(&outcome)?;

    if outcome.records.is_empty() {
        bail!("no manifest document could be processed");
    }
    Ok(())
}

async fn plan<C>(pipeline: Pipeline<C>, manifest: PathBuf, reports: &[PathBuf]) -> Result<()>
where
    C: escale_core::HazardClassifier,
{
    let name = inputs::source_name(&manifest);
    let text = inputs::read_text(&manifest).await?;
    let record = pipeline
        .process_text(&name, &text)
        .map_err(|err| anyhow!("{name}: {err}"))?;

    let discharges = SharedDischargeLog::default();
    for (path, report) in reports.iter().zip(inputs::read_reports(reports).await?) {
        let summary = discharges.ingest(&report);
        info!(
            report = ?path,
            lines = summary.lines,
            recognised = summary.recognised,
            "Loaded discharge report"
        );
    }

    let reconciliation = discharges.reconcile(&manifest_container_ids(&record.rows));
    let output = PlanOutput {
        vessel: record.id,
        groups: build_plan(&record.rows, &discharges.snapshot()),
        reconciliation,
    };
    print_json(&output)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)?;
    Ok(())
}

fn init_logging(settings: &LoggingSettings) -> Result<()> {
    fs::create_dir_all(&settings.directory)
        .with_context(|| format!("failed to create log directory {:?}", settings.directory))?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(settings.file_path())
        .with_context(|| format!("failed to open log file {:?}", settings.file_path()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the JSON output.
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(io::stderr);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}
