use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use element_fingerprint::FingerprintGenerator;
use element_locator::Relocator;
use snapshot_resolver::{SnapshotResolver, TreeCache};
use tokio::fs;
use ui_tree::{NodeId, UiTree};

use super::output::OutputFormat;
use crate::config::UitreeConfig;

pub struct CliContext {
    config: UitreeConfig,
    config_path: PathBuf,
    output: OutputFormat,
    cache: TreeCache,
}

impl CliContext {
    pub fn new(config: UitreeConfig, config_path: PathBuf, output: Option<OutputFormat>) -> Self {
        let output = output.unwrap_or(config.output);
        let cache = TreeCache::new(config.cache_ttl());
        Self {
            config,
            config_path,
            output,
            cache,
        }
    }

    pub fn config(&self) -> &UitreeConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn output(&self) -> OutputFormat {
        self.output
    }

    pub fn cache(&self) -> &TreeCache {
        &self.cache
    }

    pub fn relocator(&self) -> Result<Relocator> {
        self.config.relocator()
    }

    pub fn fingerprint_generator(&self) -> FingerprintGenerator {
        FingerprintGenerator::new(self.config.fingerprint.clone())
    }

    pub fn snapshot_resolver(&self) -> SnapshotResolver {
        SnapshotResolver::from_config(&self.config.relocator)
    }
}

pub async fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

pub async fn read_tree(path: &Path) -> Result<UiTree> {
    let text = read_text(path).await?;
    UiTree::parse(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Node by preorder index, checked against the tree.
pub fn node_arg(tree: &UiTree, index: usize) -> Result<NodeId> {
    let id = NodeId::from_index(index);
    if !tree.contains(id) {
        anyhow::bail!("node {} not found; the tree has {} nodes", index, tree.len());
    }
    Ok(id)
}
