use super::criteria::cmd_criteria;
use super::env::CliArgs;
use super::fingerprint::cmd_fingerprint;
use super::relocate::{cmd_capture, cmd_relocate};
use super::snapshot::{cmd_health, cmd_resolve};
use super::tree::{cmd_inspect, cmd_path, cmd_query};
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Inspect(args) => cmd_inspect(args, ctx).await,
        Commands::Query(args) => cmd_query(args, ctx).await,
        Commands::Path(args) => cmd_path(args, ctx).await,
        Commands::Criteria(args) => cmd_criteria(args, ctx).await,
        Commands::Fingerprint(args) => cmd_fingerprint(args, ctx).await,
        Commands::Capture(args) => cmd_capture(args, ctx).await,
        Commands::Relocate(args) => cmd_relocate(args, ctx).await,
        Commands::Resolve(args) => cmd_resolve(args, ctx).await,
        Commands::Health(args) => cmd_health(args, ctx).await,
    }
}
