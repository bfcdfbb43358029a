use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use element_locator::Locator;
use serde::Serialize;
use ui_tree::{build_absolute_path, evaluate_absolute_path, NodeId, PredicatePath, UiTree};

use super::context::{node_arg, read_tree, CliContext};

#[derive(Args, Clone)]
pub struct InspectArgs {
    /// Hierarchy dump (XML)
    pub file: PathBuf,
}

#[derive(Args, Clone)]
pub struct QueryArgs {
    /// Hierarchy dump (XML)
    pub file: PathBuf,

    /// Absolute path (`/hierarchy/node[1]`) or predicate path (`//*[@text='OK']`)
    pub expr: String,

    /// Print every match instead of the first
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Clone)]
pub struct PathArgs {
    /// Hierarchy dump (XML)
    pub file: PathBuf,

    /// Node index in document order
    #[arg(long)]
    pub node: usize,
}

/// One node as printed by `inspect` and `query`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRow {
    pub id: NodeId,
    pub depth: usize,
    pub tag: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<String>,
    pub path: String,
}

impl NodeRow {
    fn new(tree: &UiTree, id: NodeId) -> Option<Self> {
        let node = tree.node(id)?;
        Some(Self {
            id,
            depth: tree.depth(id),
            tag: node.tag().to_string(),
            label: tree.node_label(id),
            class_name: node.class_name().map(str::to_string),
            resource_id: node.resource_id().map(str::to_string),
            bounds: node.bounds_raw().map(str::to_string),
            path: build_absolute_path(tree, id)?,
        })
    }

    fn render(&self) -> String {
        format!(
            "{:>4}  {}{}  {}",
            self.id,
            "  ".repeat(self.depth),
            self.label,
            self.path
        )
    }
}

fn rows(tree: &UiTree, ids: impl IntoIterator<Item = NodeId>) -> Vec<NodeRow> {
    ids.into_iter()
        .filter_map(|id| NodeRow::new(tree, id))
        .collect()
}

fn render_rows(rows: &[NodeRow]) -> String {
    if rows.is_empty() {
        return "no match".to_string();
    }
    rows.iter()
        .map(NodeRow::render)
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn cmd_inspect(args: InspectArgs, ctx: &CliContext) -> Result<()> {
    let tree = read_tree(&args.file).await?;
    let rows = rows(&tree, tree.node_ids());
    ctx.output().emit(&rows, || render_rows(&rows))
}

pub async fn cmd_query(args: QueryArgs, ctx: &CliContext) -> Result<()> {
    let tree = read_tree(&args.file).await?;
    let expr = args.expr.trim();

    let matches = if expr.starts_with("//") {
        let path = PredicatePath::parse(expr)
            .with_context(|| format!("Unsupported predicate path '{}'", expr))?;
        if args.all {
            path.evaluate_all(&tree)
        } else {
            path.evaluate_first(&tree).into_iter().collect()
        }
    } else {
        evaluate_absolute_path(&tree, expr).into_iter().collect()
    };

    let rows = rows(&tree, matches);
    ctx.output().emit(&rows, || render_rows(&rows))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PathReport {
    node: NodeId,
    absolute_path: Option<String>,
    predicate_path: Option<String>,
}

pub async fn cmd_path(args: PathArgs, ctx: &CliContext) -> Result<()> {
    let tree = read_tree(&args.file).await?;
    let node = node_arg(&tree, args.node)?;
    let locator = Locator::capture(&tree, node).unwrap_or_default();

    let report = PathReport {
        node,
        absolute_path: locator.absolute_path,
        predicate_path: locator.predicate_path,
    };
    ctx.output().emit(&report, || {
        let mut lines = Vec::new();
        if let Some(path) = &report.absolute_path {
            lines.push(path.clone());
        }
        if let Some(path) = &report.predicate_path {
            lines.push(path.clone());
        }
        lines.join("\n")
    })
}
