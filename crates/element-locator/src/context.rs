//! Portable node descriptions
//!
//! A [`Locator`] is pure data: no reference into any tree, safe to persist.
//! Field names are part of the saved-step format and stay stable.

use element_fingerprint::{AttributeProfile, FingerprintComponents, FingerprintGenerator};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ui_tree::{build_absolute_path, keys, NodeId, Predicate, PredicatePath, UiTree};

use crate::errors::LocatorError;

/// Identity attributes captured from a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocatorAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
}

impl LocatorAttributes {
    /// Value by dump attribute key (`resource-id`, `class`, ...).
    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            keys::RESOURCE_ID => &self.resource_id,
            keys::TEXT => &self.text,
            keys::CONTENT_DESC => &self.content_desc,
            keys::CLASS => &self.class_name,
            keys::PACKAGE => &self.package_name,
            _ => return None,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        [keys::RESOURCE_ID, keys::TEXT, keys::CONTENT_DESC, keys::CLASS, keys::PACKAGE]
            .iter()
            .all(|key| self.get(key).is_none())
    }
}

/// Where a node was.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Locator {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub absolute_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicate_path: Option<String>,
    pub attributes: LocatorAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<String>,
}

impl Locator {
    /// Describe `node`; `None` when the id is not in `tree`.
    pub fn capture(tree: &UiTree, node: NodeId) -> Option<Self> {
        let target = tree.node(node)?;
        let owned = |key: &str| {
            target
                .attr(key)
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string)
        };

        let attributes = LocatorAttributes {
            resource_id: owned(keys::RESOURCE_ID),
            text: owned(keys::TEXT),
            content_desc: owned(keys::CONTENT_DESC),
            class_name: owned(keys::CLASS),
            package_name: owned(keys::PACKAGE),
        };

        // Single-predicate form so the string stays inside the text grammar.
        let predicate_path = [keys::RESOURCE_ID, keys::TEXT, keys::CONTENT_DESC]
            .iter()
            .find_map(|key| {
                attributes
                    .get(key)
                    .map(|value| PredicatePath::any().and(Predicate::attr_equals(*key, value)))
            })
            .map(|path| path.to_string());

        Some(Self {
            absolute_path: build_absolute_path(tree, node),
            predicate_path,
            attributes,
            bounds: owned(keys::BOUNDS),
        })
    }

    /// Attribute subset used by weighted similarity.
    pub fn profile(&self) -> AttributeProfile {
        let owned = |key: &str| self.attributes.get(key).map(str::to_string);
        AttributeProfile {
            resource_id: owned(keys::RESOURCE_ID),
            text: owned(keys::TEXT),
            content_desc: owned(keys::CONTENT_DESC),
            class_name: owned(keys::CLASS),
            bounds: self.bounds.clone().filter(|b| !b.is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.absolute_path.is_none()
            && self.predicate_path.is_none()
            && self.bounds.is_none()
            && self.attributes.is_empty()
    }
}

/// Everything saved at selection time to find a node again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementContext {
    pub locator: Locator,

    /// Fingerprint components at capture; older saves lack them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<FingerprintComponents>,
}

impl ElementContext {
    /// Capture with the default fingerprint configuration.
    pub fn capture(tree: &UiTree, node: NodeId) -> Result<Self, LocatorError> {
        Self::capture_with(tree, node, &FingerprintGenerator::default())
    }

    pub fn capture_with(
        tree: &UiTree,
        node: NodeId,
        generator: &FingerprintGenerator,
    ) -> Result<Self, LocatorError> {
        let locator = Locator::capture(tree, node)
            .ok_or_else(|| LocatorError::ElementNotFound(node.to_string()))?;
        let components = generator.components(tree, node);
        debug!(node = %node, path = ?locator.absolute_path, "captured element context");
        Ok(Self {
            locator,
            components,
        })
    }

    /// Components to compare candidates against.
    ///
    /// Saved components when present, otherwise whatever the locator alone
    /// can supply.
    pub fn saved_components(&self) -> FingerprintComponents {
        if let Some(components) = &self.components {
            return components.clone();
        }
        let owned = |key: &str| self.locator.attributes.get(key).map(str::to_string);
        FingerprintComponents {
            resource_id: owned(keys::RESOURCE_ID),
            text: owned(keys::TEXT).map(|t| t.trim().to_string()),
            content_desc: owned(keys::CONTENT_DESC).map(|d| d.trim().to_string()),
            class_name: owned(keys::CLASS),
            path: self.locator.absolute_path.clone(),
            ..Default::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self, LocatorError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, LocatorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
