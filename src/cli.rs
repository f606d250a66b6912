use bucketlog::export::Level;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bucketlog")]
#[command(about = "Rolling log export into object storage", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $BUCKETLOG_CONFIG or config/bucketlog.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export lines (stdin by default) as one batch
    Export(ExportArgs),
    /// Run one retention sweep
    Sweep,
    /// Validate the configuration
    Check,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Severity attached to every line read
    #[arg(long, default_value = "error")]
    pub level: Level,

    /// Read lines from this file instead of stdin
    #[arg(long)]
    pub file: Option<PathBuf>,
}
