use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use element_fingerprint::{Fingerprint, FingerprintComponents, FingerprintGenerator};
use serde::Serialize;
use ui_tree::NodeId;

use super::context::{node_arg, read_text, CliContext};

#[derive(Args, Clone)]
pub struct FingerprintArgs {
    /// Hierarchy dump (XML)
    pub file: PathBuf,

    /// Node index in document order
    #[arg(long)]
    pub node: usize,

    /// Mix a hash of the document head into the fingerprint
    #[arg(long)]
    pub with_document: bool,
}

#[derive(Debug, Serialize)]
struct FingerprintReport {
    node: NodeId,
    fingerprint: Fingerprint,
    components: FingerprintComponents,
}

pub async fn cmd_fingerprint(args: FingerprintArgs, ctx: &CliContext) -> Result<()> {
    let text = read_text(&args.file).await?;
    let tree = ui_tree::UiTree::parse(&text)
        .with_context(|| format!("Failed to parse {}", args.file.display()))?;
    let node = node_arg(&tree, args.node)?;
    let mut config = ctx.config().fingerprint.clone();
    config.include_document_hash |= args.with_document;
    let generator = FingerprintGenerator::new(config);

    let components = generator
        .components_with_document(&tree, node, Some(text.as_str()))
        .context("Node has no fingerprint components")?;

    let report = FingerprintReport {
        node,
        fingerprint: generator.fingerprint_of(&components),
        components,
    };
    ctx.output().emit(&report, || {
        let mut lines = vec![report.fingerprint.to_string()];
        for (key, value) in report.components.entries() {
            lines.push(format!("  {:<16} {}", key, value));
        }
        lines.join("\n")
    })
}
