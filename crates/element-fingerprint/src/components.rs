//! Identity components extracted from a node

use serde::{Deserialize, Serialize};
use ui_tree::{build_absolute_path, keys, NodeId, UiTree};

/// Components that feed a fingerprint.
///
/// Absent components are `None`; comparison only looks at components present
/// on at least one side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FingerprintComponents {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sibling_index: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

impl FingerprintComponents {
    /// Read the identity components of `node`; `None` for a foreign id.
    pub fn extract(tree: &UiTree, node: NodeId, include_bounds: bool) -> Option<Self> {
        let target = tree.node(node)?;
        let non_empty = |value: Option<&str>| value.filter(|v| !v.is_empty()).map(str::to_string);

        let parent_context = tree.parent(node).and_then(|parent| {
            let parent = tree.node(parent)?;
            let mut parts = Vec::new();
            if let Some(id) = parent.resource_id().filter(|v| !v.is_empty()) {
                parts.push(format!("id:{}", id));
            }
            if let Some(class) = parent.class_name().filter(|v| !v.is_empty()) {
                parts.push(format!("class:{}", class));
            }
            (!parts.is_empty()).then(|| parts.join(","))
        });

        Some(Self {
            resource_id: non_empty(target.resource_id()),
            text: non_empty(target.text().map(str::trim)),
            content_desc: non_empty(target.content_desc().map(str::trim)),
            class_name: non_empty(target.class_name()),
            path: build_absolute_path(tree, node),
            parent_context,
            sibling_index: Some(tree.sibling_index(node).to_string()),
            bounds: if include_bounds {
                non_empty(target.attr(keys::BOUNDS))
            } else {
                None
            },
            document: None,
        })
    }

    /// Present components as `(key, value)` pairs in a fixed key order.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("resourceId", &self.resource_id),
            ("text", &self.text),
            ("contentDesc", &self.content_desc),
            ("className", &self.class_name),
            ("path", &self.path),
            ("parentContext", &self.parent_context),
            ("siblingIndex", &self.sibling_index),
            ("bounds", &self.bounds),
            ("document", &self.document),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
        .collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Unweighted fraction of components (present on either side) that agree.
    pub fn agreement(&self, other: &FingerprintComponents) -> f64 {
        let mut keys: Vec<&str> = self.entries().into_iter().map(|(k, _)| k).collect();
        for (key, _) in other.entries() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        if keys.is_empty() {
            return 0.0;
        }
        let agreeing = keys
            .iter()
            .filter(|key| self.get(key) == other.get(key))
            .count();
        agreeing as f64 / keys.len() as f64
    }
}
