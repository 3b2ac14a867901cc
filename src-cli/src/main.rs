mod prompt;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dcmigrate::pipeline::LogProgress;
use dcmigrate::{
    load_config, MigrateError, MigrationConfig, MigrationReport, MigrationRequest,
    MigrationWorker, ProgressReporter,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// Migrate a DisplayCluster state file and its media into a self-contained
/// output directory.
#[derive(Parser, Debug)]
#[command(name = "dcmigrate", version, about)]
struct Args {
    /// State file (.dcx) to migrate
    #[arg(long)]
    old_state: Option<String>,

    /// File name of the migrated state file inside the output directory
    #[arg(long = "new-state")]
    new_state: Option<String>,

    /// Existing directory that receives the new state file and Content/
    #[arg(long)]
    output_dir: Option<String>,

    /// JSON config file
    #[arg(long, env = "DCMIGRATE_CONFIG")]
    config: Option<PathBuf>,

    /// Prompt for missing fields and re-prompt after a validation failure
    #[arg(long)]
    interactive: bool,

    /// Write the migration report as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,
}

fn init_logging(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dcmigrate=info"));

    // The worker logs through `log`; route it into tracing.
    let bridge = tracing_log::LogTracer::init();

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }

    if let Some(warning) = bridge_warning(bridge) {
        tracing::warn!("{}", warning);
    }
}

fn bridge_warning<E: std::fmt::Display>(result: std::result::Result<(), E>) -> Option<String> {
    result
        .err()
        .map(|e| format!("Worker log output will be missing: {}", e))
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.log_format);

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => MigrationConfig::default(),
    };
    let config = Arc::new(config);

    let mut request = initial_request(&args, &config);
    if args.interactive {
        request = prompt::fill_missing(request)?;
    }

    info!("Starting dcmigrate v{}", env!("CARGO_PKG_VERSION"));
    let worker = MigrationWorker::new(Arc::clone(&config));

    loop {
        let handle = worker.submit(request.clone())?;
        for event in handle.events().iter() {
            LogProgress.report(event);
        }

        match handle.join() {
            Ok(report) => {
                if let Some(path) = &args.report {
                    write_report(path, &report)?;
                }
                println!("State Migration Complete");
                return Ok(ExitCode::SUCCESS);
            }
            Err(MigrateError::Validation(e)) => {
                eprintln!("invalid {}: {}", e.field, e.message);
                if !args.interactive {
                    return Ok(ExitCode::from(2));
                }
                request = prompt::reprompt(request, e.field)?;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Command-line values win over config defaults.
fn initial_request(args: &Args, config: &MigrationConfig) -> MigrationRequest {
    let defaults = MigrationRequest::from_defaults(config);
    MigrationRequest {
        old_state: args.old_state.clone().unwrap_or(defaults.old_state),
        new_state_name: args.new_state.clone().unwrap_or(defaults.new_state_name),
        output_dir: args.output_dir.clone().unwrap_or(defaults.output_dir),
    }
}

fn write_report(path: &std::path::Path, report: &MigrationReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report {}", path.display()))?;
    info!("Report written to {}", path.display());
    Ok(())
}
