use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use element_locator::Locator;
use serde::Serialize;
use snapshot_resolver::{check_health, HealthSeverity, Snapshot};
use ui_tree::{build_absolute_path, NodeId};

use super::context::{read_text, CliContext};

#[derive(Args, Clone)]
pub struct ResolveArgs {
    /// Stored snapshot (JSON)
    pub snapshot: PathBuf,

    /// Saved locator, or a full element context (JSON)
    pub locator: PathBuf,
}

#[derive(Args, Clone)]
pub struct HealthArgs {
    /// Stored snapshot (JSON)
    pub snapshot: PathBuf,

    /// Exit with an error unless the snapshot passes
    #[arg(long)]
    pub strict: bool,
}

async fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let text = read_text(path).await?;
    Snapshot::from_json(&text).with_context(|| format!("Failed to parse snapshot {}", path.display()))
}

/// A bare locator, or the `locator` member of a saved element context.
pub fn parse_locator(text: &str) -> Result<Locator> {
    let mut value: serde_json::Value = serde_json::from_str(text)?;
    if let Some(inner) = value.get_mut("locator").map(serde_json::Value::take) {
        value = inner;
    }
    Ok(serde_json::from_value(value)?)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolveReport {
    found: bool,
    node: Option<NodeId>,
    path: Option<String>,
    label: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

pub async fn cmd_resolve(args: ResolveArgs, ctx: &CliContext) -> Result<()> {
    let snapshot = read_snapshot(&args.snapshot).await?;
    let locator_text = read_text(&args.locator).await?;
    let locator = parse_locator(&locator_text)
        .with_context(|| format!("Failed to parse locator {}", args.locator.display()))?;

    let resolution = ctx
        .snapshot_resolver()
        .resolve_cached(ctx.cache(), &snapshot, &locator);
    let Some(tree) = resolution.tree.as_deref() else {
        anyhow::bail!("snapshot document could not be parsed");
    };

    let report = ResolveReport {
        found: resolution.is_found(),
        node: resolution.node,
        path: resolution.node.and_then(|id| build_absolute_path(tree, id)),
        label: resolution.node.map(|id| tree.node_label(id)),
        parent: resolution.parent,
        children: resolution.children.clone(),
    };
    ctx.output().emit(&report, || match (&report.node, &report.path) {
        (Some(node), Some(path)) => format!(
            "found {} ({})  {}\n  parent {}  children {}",
            node,
            report.label.as_deref().unwrap_or_default(),
            path,
            report
                .parent
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
            report.children.len()
        ),
        _ => "not found".to_string(),
    })
}

pub async fn cmd_health(args: HealthArgs, ctx: &CliContext) -> Result<()> {
    let snapshot = read_snapshot(&args.snapshot).await?;
    let health = check_health(&snapshot);

    ctx.output().emit(&health, || {
        let mut lines = vec![format!("{:?}  score {}", health.severity, health.score)];
        for issue in &health.issues {
            lines.push(format!(
                "  [{:?}] {}: {} ({})",
                issue.level, issue.code, issue.message, issue.suggestion
            ));
        }
        lines.join("\n")
    })?;

    if args.strict && health.severity != HealthSeverity::Passed {
        anyhow::bail!("snapshot health is {:?}", health.severity);
    }
    Ok(())
}
