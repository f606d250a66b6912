mod cli;

use bucketlog::config::Config;
use bucketlog::export::{self, LogExporter, LogRecord};
use chrono::Utc;
use clap::Parser;
use cli::{Cli, Commands, ExportArgs};
use std::io::{self, BufRead, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(Config::default_path);
    let config = Config::load_unvalidated(config_path)?;

    match cli.command {
        Commands::Check => check(&config)?,
        Commands::Export(args) => run_export(&config, args).await?,
        Commands::Sweep => run_sweep(&config).await?,
    }

    Ok(())
}

fn check(config: &Config) -> Result<(), AnyError> {
    match config.validate() {
        Ok(()) => {
            info!(
                bucket = %config.storage.bucket,
                directory = %config.export.directory,
                enabled = config.export.enabled,
                "Configuration is valid"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Configuration is invalid");
            Err(e.into())
        }
    }
}

fn exporter_for(config: &Config) -> Result<LogExporter, AnyError> {
    export::activate(config).ok_or_else(|| "log export is disabled or misconfigured".into())
}

async fn run_export(config: &Config, args: ExportArgs) -> Result<(), AnyError> {
    let exporter = exporter_for(config)?;

    let reader: Box<dyn BufRead> = match &args.file {
        Some(path) => Box::new(BufReader::new(std::fs::File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if !line.is_empty() {
            records.push(LogRecord::new(args.level, line));
        }
    }

    let batch = export::LogBatch::from_records(records, &config.export.levels);
    let lines = batch.len();
    let outcome = exporter.export_at(batch, Utc::now()).await?;
    exporter.metrics().record_outcome(&outcome);

    info!(lines, ?outcome, "Export finished");
    Ok(())
}

async fn run_sweep(config: &Config) -> Result<(), AnyError> {
    let exporter = exporter_for(config)?;
    let report = exporter.sweeper().run(Utc::now()).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
