use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use element_locator::{ElementContext, RelocationResult, RelocationStrategy};
use tracing::info;
use ui_tree::UiTree;

use super::context::{node_arg, read_text, read_tree, CliContext};

#[derive(Args, Clone)]
pub struct CaptureArgs {
    /// Hierarchy dump (XML)
    pub file: PathBuf,

    /// Node index in document order
    #[arg(long)]
    pub node: usize,

    /// Write the context here instead of stdout
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Clone)]
pub struct RelocateArgs {
    /// Saved element context (JSON, as written by `capture`)
    pub context: PathBuf,

    /// Current hierarchy dump (XML)
    pub file: PathBuf,

    /// Run only this strategy
    #[arg(long)]
    pub strategy: Option<RelocationStrategy>,

    /// Print every candidate of every strategy, ranked
    #[arg(long, conflicts_with = "strategy")]
    pub plan: bool,
}

pub async fn cmd_capture(args: CaptureArgs, ctx: &CliContext) -> Result<()> {
    let tree = read_tree(&args.file).await?;
    let node = node_arg(&tree, args.node)?;
    let context = ElementContext::capture_with(&tree, node, &ctx.fingerprint_generator())?;
    let json = context.to_json_pretty()?;

    match args.out {
        Some(path) => {
            tokio::fs::write(&path, json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(node = %node, path = %path.display(), "element context saved");
        }
        None => println!("{}", json),
    }
    Ok(())
}

pub async fn cmd_relocate(args: RelocateArgs, ctx: &CliContext) -> Result<()> {
    let saved = read_text(&args.context).await?;
    let context = ElementContext::from_json(&saved)
        .with_context(|| format!("Failed to parse context {}", args.context.display()))?;
    let tree = read_tree(&args.file).await?;
    let relocator = ctx.relocator()?;

    if args.plan {
        let plan = relocator.generate_fallback_plan(&context, &tree);
        return ctx.output().emit(&plan, || {
            let mut lines = Vec::new();
            for candidate in &plan.fallbacks {
                lines.push(format!(
                    "{:<18} {:>4}  {:.2}  {}",
                    candidate.strategy.name(),
                    candidate.node,
                    candidate.confidence,
                    tree.node_label(candidate.node)
                ));
            }
            if lines.is_empty() {
                lines.push("no candidates".to_string());
            }
            lines.join("\n")
        });
    }

    let result = match args.strategy {
        Some(strategy) => relocator.relocate_with_strategy(&context, &tree, strategy),
        None => relocator.relocate(&context, &tree),
    };
    ctx.output().emit(&result, || render_result(&result, &tree))
}

fn render_result(result: &RelocationResult, tree: &UiTree) -> String {
    let mut lines = vec![match result.node {
        Some(node) => format!(
            "found {} ({}) via {} at {:.2}",
            node,
            tree.node_label(node),
            result.strategy_name(),
            result.confidence
        ),
        None => "not found".to_string(),
    }];
    lines.extend(result.reasons.iter().map(|reason| format!("  {}", reason)));
    lines.join("\n")
}
