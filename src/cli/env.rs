use clap::Parser;
use std::path::PathBuf;

use super::commands::Commands;
use super::output::OutputFormat;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("UITREE_GIT_HASH"),
    " ",
    env!("UITREE_BUILD_DATE"),
    ")"
);

/// Locate and relocate elements in UI hierarchy dumps
#[derive(Parser)]
#[command(author, version, about, long_about = None, long_version = LONG_VERSION)]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    pub log_level: String,

    /// Enable debug mode
    #[arg(short, long)]
    pub debug: bool,

    /// Output format (defaults to the configured one)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}
