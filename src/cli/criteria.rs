use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use match_criteria::{CriteriaMatcher, MatchCriteria, MatchReport, MatchStrategy};
use serde::Serialize;

use super::context::{node_arg, read_text, read_tree, CliContext};

#[derive(Args, Clone)]
pub struct CriteriaArgs {
    /// Hierarchy dump (XML)
    pub file: PathBuf,

    /// Build criteria for this node (index in document order)
    #[arg(long, conflicts_with = "criteria")]
    pub node: Option<usize>,

    /// Evaluate saved criteria (JSON) instead of building them
    #[arg(long, value_name = "FILE", required_unless_present = "node")]
    pub criteria: Option<PathBuf>,

    /// Field preset used with --node
    #[arg(long, default_value = "standard")]
    pub strategy: MatchStrategy,
}

#[derive(Debug, Serialize)]
struct CriteriaReport {
    criteria: MatchCriteria,
    warnings: Vec<String>,
    #[serde(flatten)]
    matches: MatchReport,
}

pub async fn cmd_criteria(args: CriteriaArgs, ctx: &CliContext) -> Result<()> {
    let tree = read_tree(&args.file).await?;

    let criteria = match (&args.criteria, args.node) {
        (Some(path), _) => {
            let text = read_text(path).await?;
            let criteria: MatchCriteria = serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse criteria {}", path.display()))?;
            criteria.normalized()
        }
        (None, Some(index)) => {
            let node = node_arg(&tree, index)?;
            MatchCriteria::from_node(&tree, node, args.strategy)?
        }
        (None, None) => anyhow::bail!("either --node or --criteria is required"),
    };

    let matches = CriteriaMatcher::new(&criteria).report(&tree);
    let report = CriteriaReport {
        warnings: criteria.validate().iter().map(ToString::to_string).collect(),
        criteria,
        matches,
    };

    ctx.output().emit(&report, || {
        let mut lines = vec![format!(
            "strategy {}  fields {}",
            report.criteria.strategy,
            report.criteria.fields.join(", ")
        )];
        for (field, value) in &report.criteria.values {
            lines.push(format!("  {:<24} {}", field, value));
        }
        for warning in &report.warnings {
            lines.push(format!("warning: {}", warning));
        }
        let best = report.matches.best;
        for id in &report.matches.matched {
            let marker = if Some(*id) == best { '*' } else { ' ' };
            lines.push(format!("{} {:>4}  {}", marker, id, tree.node_label(*id)));
        }
        lines.push(format!("{} match(es)", report.matches.total()));
        lines.join("\n")
    })
}
