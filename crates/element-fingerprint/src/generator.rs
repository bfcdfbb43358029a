//! Weighted fingerprint hashing

use std::fmt;

use blake3::Hasher;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ui_tree::{NodeId, UiTree};

use crate::components::FingerprintComponents;
use crate::config::FingerprintConfig;

/// Characters of document text folded into the optional document component.
const DOCUMENT_HEAD_CHARS: usize = 1000;

/// Hex characters kept from the digest.
const FINGERPRINT_LEN: usize = 16;

/// Opaque fixed-width fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FingerprintGenerator {
    config: FingerprintConfig,
}

impl FingerprintGenerator {
    pub fn new(config: FingerprintConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    pub fn components(&self, tree: &UiTree, node: NodeId) -> Option<FingerprintComponents> {
        self.components_with_document(tree, node, None)
    }

    /// Components of `node`, plus a document-head hash when enabled and
    /// `document` is supplied.
    pub fn components_with_document(
        &self,
        tree: &UiTree,
        node: NodeId,
        document: Option<&str>,
    ) -> Option<FingerprintComponents> {
        let mut components = FingerprintComponents::extract(tree, node, self.config.include_bounds)?;
        if self.config.include_document_hash {
            components.document = document.map(|text| {
                let head: String = text.chars().take(DOCUMENT_HEAD_CHARS).collect();
                truncated_digest(&head)
            });
        }
        Some(components)
    }

    pub fn generate(&self, tree: &UiTree, node: NodeId) -> Option<Fingerprint> {
        self.generate_with_document(tree, node, None)
    }

    pub fn generate_with_document(
        &self,
        tree: &UiTree,
        node: NodeId,
        document: Option<&str>,
    ) -> Option<Fingerprint> {
        let components = self.components_with_document(tree, node, document)?;
        Some(self.fingerprint_of(&components))
    }

    /// Repeat each `key:value` token by its weight, sort, join and hash.
    pub fn fingerprint_of(&self, components: &FingerprintComponents) -> Fingerprint {
        let weights = &self.config.weights;
        let mut tokens: Vec<String> = Vec::new();
        for (key, value) in components.entries() {
            let token = format!("{}:{}", key, value);
            for _ in 0..weights.weight_of(key) {
                tokens.push(token.clone());
            }
        }
        tokens.sort();
        Fingerprint(truncated_digest(&tokens.join("|")))
    }

    /// Equal fingerprints, or component agreement at or above `threshold`.
    pub fn is_same_components(
        &self,
        a: &FingerprintComponents,
        b: &FingerprintComponents,
        threshold: f64,
    ) -> bool {
        if self.fingerprint_of(a) == self.fingerprint_of(b) {
            return true;
        }
        let agreement = a.agreement(b);
        debug!(agreement, threshold, "component agreement");
        agreement >= threshold
    }

    /// Compare two nodes, possibly from different trees.
    pub fn is_same_element(
        &self,
        tree_a: &UiTree,
        a: NodeId,
        tree_b: &UiTree,
        b: NodeId,
        threshold: f64,
    ) -> bool {
        match (self.components(tree_a, a), self.components(tree_b, b)) {
            (Some(a), Some(b)) => self.is_same_components(&a, &b, threshold),
            _ => false,
        }
    }
}

/// Fingerprint with the default configuration.
pub fn generate_fingerprint(tree: &UiTree, node: NodeId) -> Option<Fingerprint> {
    FingerprintGenerator::default().generate(tree, node)
}

/// Same-element check with the default configuration.
pub fn is_same_element(
    tree_a: &UiTree,
    a: NodeId,
    tree_b: &UiTree,
    b: NodeId,
    threshold: f64,
) -> bool {
    FingerprintGenerator::default().is_same_element(tree_a, a, tree_b, b, threshold)
}

fn truncated_digest(content: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(content.as_bytes());
    let hex = hasher.finalize().to_hex();
    hex.as_str()[..FINGERPRINT_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FingerprintConfig;

    const DUMP: &str = r#"<hierarchy>
  <node class="android.widget.FrameLayout">
    <node class="android.widget.Button" text="Follow" resource-id="com.app:id/follow" bounds="[0,0][100,40]"/>
    <node class="android.widget.Button" text="Share" resource-id="com.app:id/share" bounds="[0,40][100,80]"/>
  </node>
</hierarchy>"#;

    #[test]
    fn test_fixed_width_hex() {
        let tree = UiTree::parse(DUMP).unwrap();
        let fp = generate_fingerprint(&tree, NodeId::from_index(2)).unwrap();
        assert_eq!(fp.as_str().len(), 16);
        assert!(fp.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_distinct_nodes_distinct_fingerprints() {
        let tree = UiTree::parse(DUMP).unwrap();
        let follow = generate_fingerprint(&tree, NodeId::from_index(2)).unwrap();
        let share = generate_fingerprint(&tree, NodeId::from_index(3)).unwrap();
        assert_ne!(follow, share);
    }

    #[test]
    fn test_weights_change_the_hash() {
        let tree = UiTree::parse(DUMP).unwrap();
        let mut config = FingerprintConfig::default();
        let plain = FingerprintGenerator::new(config.clone())
            .generate(&tree, NodeId::from_index(2))
            .unwrap();
        config.weights.text = 1;
        let reweighted = FingerprintGenerator::new(config)
            .generate(&tree, NodeId::from_index(2))
            .unwrap();
        assert_ne!(plain, reweighted);
    }

    #[test]
    fn test_bounds_ignored_unless_enabled() {
        let moved = DUMP.replace("[0,0][100,40]", "[3,3][103,43]");
        let a = UiTree::parse(DUMP).unwrap();
        let b = UiTree::parse(&moved).unwrap();
        let id = NodeId::from_index(2);
        assert_eq!(generate_fingerprint(&a, id), generate_fingerprint(&b, id));

        let generator = FingerprintGenerator::new(FingerprintConfig {
            include_bounds: true,
            ..Default::default()
        });
        assert_ne!(generator.generate(&a, id), generator.generate(&b, id));
    }

    #[test]
    fn test_document_component() {
        let tree = UiTree::parse(DUMP).unwrap();
        let id = NodeId::from_index(2);
        let generator = FingerprintGenerator::new(FingerprintConfig {
            include_document_hash: true,
            ..Default::default()
        });
        let with_doc = generator.generate_with_document(&tree, id, Some(DUMP));
        let without = generator.generate(&tree, id);
        assert_ne!(with_doc, without);
        assert_eq!(without, generate_fingerprint(&tree, id));
    }

    #[test]
    fn test_is_same_element() {
        let tree = UiTree::parse(DUMP).unwrap();
        let follow = NodeId::from_index(2);
        let share = NodeId::from_index(3);
        assert!(is_same_element(&tree, follow, &tree, follow, 0.8));
        assert!(!is_same_element(&tree, follow, &tree, share, 0.8));

        let renamed = DUMP.replace("text=\"Follow\"", "text=\"Following\"");
        let other = UiTree::parse(&renamed).unwrap();
        // 5 of 6 components agree
        assert!(is_same_element(&tree, follow, &other, follow, 0.8));
        assert!(!is_same_element(&tree, follow, &other, follow, 0.9));
        assert!(!is_same_element(&tree, follow, &other, NodeId::from_index(42), 0.0));
    }
}
