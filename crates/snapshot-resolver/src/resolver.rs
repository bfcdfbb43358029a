//! Snapshot + locator -> node

use std::sync::Arc;

use element_fingerprint::{text_similarity, TextMatchOptions};
use element_locator::{Locator, RelocatorConfig};
use tracing::{debug, warn};
use ui_tree::{evaluate_absolute_path, keys, NodeId, UiTree};

use crate::cache::TreeCache;
use crate::errors::SnapshotError;
use crate::hash::document_hash;
use crate::model::Snapshot;

/// Minimum fallback score for a node to count as found.
const MIN_FALLBACK_SCORE: u32 = 1;

/// A restored tree and the saved node inside it.
///
/// Every field is empty when the document did not parse.
#[derive(Clone, Debug, Default)]
pub struct Resolution {
    pub tree: Option<Arc<UiTree>>,
    pub root: Option<NodeId>,
    pub node: Option<NodeId>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Resolution {
    fn locate(tree: Arc<UiTree>, node: Option<NodeId>) -> Self {
        let parent = node.and_then(|id| tree.parent(id));
        let children = node
            .map(|id| tree.children(id).to_vec())
            .unwrap_or_default();
        Self {
            root: Some(tree.root()),
            node,
            parent,
            children,
            tree: Some(tree),
        }
    }

    pub fn is_found(&self) -> bool {
        self.node.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct SnapshotResolver {
    text_similarity: f64,
    options: TextMatchOptions,
}

impl Default for SnapshotResolver {
    fn default() -> Self {
        Self::from_config(&RelocatorConfig::default())
    }
}

impl SnapshotResolver {
    pub fn new(text_similarity: f64, options: TextMatchOptions) -> Self {
        Self {
            text_similarity,
            options,
        }
    }

    /// Share text tolerance with the relocator.
    pub fn from_config(config: &RelocatorConfig) -> Self {
        Self::new(config.text_similarity, config.text_options())
    }

    /// Parse and locate; a document that does not parse yields an empty
    /// resolution.
    pub fn resolve(&self, snapshot: &Snapshot, locator: &Locator) -> Resolution {
        match self.try_resolve(snapshot, locator) {
            Ok(resolution) => resolution,
            Err(err) => {
                warn!(hash = %snapshot.hash, error = %err, "snapshot not resolvable");
                Resolution::default()
            }
        }
    }

    /// Like [`resolve`](Self::resolve), but tells a parse failure apart
    /// from "parsed, nothing matched".
    pub fn try_resolve(
        &self,
        snapshot: &Snapshot,
        locator: &Locator,
    ) -> Result<Resolution, SnapshotError> {
        let tree = Arc::new(UiTree::parse(&snapshot.document_text)?);
        Ok(self.resolve_in(tree, locator))
    }

    /// Resolve through a caller-owned cache of parsed trees.
    pub fn resolve_cached(
        &self,
        cache: &TreeCache,
        snapshot: &Snapshot,
        locator: &Locator,
    ) -> Resolution {
        // Keyed by the document itself; a stored hash can be stale or edited.
        let key = document_hash(&snapshot.document_text);
        if key != snapshot.hash {
            warn!(
                stored = %snapshot.hash,
                computed = %key,
                "snapshot hash does not match its document"
            );
        }
        match cache.get_or_parse(&key, &snapshot.document_text) {
            Ok(tree) => self.resolve_in(tree, locator),
            Err(err) => {
                warn!(hash = %key, error = %err, "snapshot not resolvable");
                Resolution::default()
            }
        }
    }

    /// Locate in an already parsed tree.
    pub fn resolve_in(&self, tree: Arc<UiTree>, locator: &Locator) -> Resolution {
        let by_path = locator
            .absolute_path
            .as_deref()
            .and_then(|path| evaluate_absolute_path(&tree, path));
        let node = by_path.or_else(|| {
            debug!("absolute path missed; searching by attributes");
            self.best_by_attributes(&tree, locator)
        });
        Resolution::locate(tree, node)
    }

    /// Small-scale attribute score: id 3, text 2, description 2, class 1.
    pub fn score(&self, tree: &UiTree, node: NodeId, locator: &Locator) -> u32 {
        let Some(candidate) = tree.node(node) else {
            return 0;
        };
        let saved = &locator.attributes;
        let mut score = 0;

        if let Some(id) = saved.get(keys::RESOURCE_ID) {
            if candidate.resource_id() == Some(id) {
                score += 3;
            }
        }
        for key in [keys::TEXT, keys::CONTENT_DESC] {
            if let (Some(want), Some(have)) = (saved.get(key), candidate.attr(key)) {
                if text_similarity(want, have, &self.options) >= self.text_similarity {
                    score += 2;
                }
            }
        }
        if let Some(class) = saved.get(keys::CLASS) {
            if candidate.class_name() == Some(class) {
                score += 1;
            }
        }
        score
    }

    fn best_by_attributes(&self, tree: &UiTree, locator: &Locator) -> Option<NodeId> {
        let mut best: Option<(NodeId, u32)> = None;
        for id in tree.node_ids() {
            let score = self.score(tree, id, locator);
            if score >= MIN_FALLBACK_SCORE && best.map_or(true, |(_, top)| score > top) {
                best = Some((id, score));
            }
        }
        best.map(|(id, _)| id)
    }
}
