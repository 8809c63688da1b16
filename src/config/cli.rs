use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "column-shuffle")]
#[command(about = "Select and reorder columns of a CSV or XLSX file into a new CSV file")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "column-shuffle.toml")]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Validate the configuration and print it without reading data
    #[arg(long)]
    pub dry_run: bool,
}
