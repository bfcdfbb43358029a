//! Registry of matchable fields
//!
//! A field is either a node attribute (`resource-id`, `text`, ...), a
//! positional field (`bounds`, `index`), a boolean flag, or a context field
//! read from the parent, first child or nearest clickable ancestor.

use std::collections::BTreeMap;

use ui_tree::{keys, NodeFlag, NodeId, UiTree};

/// Grouping used for display and for deciding where a value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGroup {
    Basic,
    Position,
    Parent,
    Child,
    ClickableAncestor,
    State,
}

/// One entry of the field registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDefinition {
    pub key: &'static str,
    pub label: &'static str,
    pub group: FieldGroup,
}

pub const FIELD_DEFINITIONS: &[FieldDefinition] = &[
    FieldDefinition { key: "resource-id", label: "Resource id", group: FieldGroup::Basic },
    FieldDefinition { key: "text", label: "Text", group: FieldGroup::Basic },
    FieldDefinition { key: "content-desc", label: "Content description", group: FieldGroup::Basic },
    FieldDefinition { key: "class", label: "Class", group: FieldGroup::Basic },
    FieldDefinition { key: "package", label: "Package", group: FieldGroup::Basic },
    FieldDefinition { key: "bounds", label: "Bounds", group: FieldGroup::Position },
    FieldDefinition { key: "index", label: "Sibling index", group: FieldGroup::Position },
    FieldDefinition { key: "parent_class", label: "Parent class", group: FieldGroup::Parent },
    FieldDefinition { key: "parent_text", label: "Parent text", group: FieldGroup::Parent },
    FieldDefinition { key: "parent_resource_id", label: "Parent resource id", group: FieldGroup::Parent },
    FieldDefinition { key: "parent_content_desc", label: "Parent description", group: FieldGroup::Parent },
    FieldDefinition { key: "first_child_text", label: "First child text", group: FieldGroup::Child },
    FieldDefinition { key: "first_child_content_desc", label: "First child description", group: FieldGroup::Child },
    FieldDefinition { key: "first_child_resource_id", label: "First child resource id", group: FieldGroup::Child },
    FieldDefinition { key: "first_child_class", label: "First child class", group: FieldGroup::Child },
    FieldDefinition { key: "clickable_ancestor_class", label: "Clickable ancestor class", group: FieldGroup::ClickableAncestor },
    FieldDefinition { key: "clickable_ancestor_resource_id", label: "Clickable ancestor resource id", group: FieldGroup::ClickableAncestor },
    FieldDefinition { key: "clickable_ancestor_text", label: "Clickable ancestor text", group: FieldGroup::ClickableAncestor },
    FieldDefinition { key: "clickable", label: "Clickable", group: FieldGroup::State },
    FieldDefinition { key: "enabled", label: "Enabled", group: FieldGroup::State },
    FieldDefinition { key: "scrollable", label: "Scrollable", group: FieldGroup::State },
    FieldDefinition { key: "checkable", label: "Checkable", group: FieldGroup::State },
    FieldDefinition { key: "checked", label: "Checked", group: FieldGroup::State },
    FieldDefinition { key: "selected", label: "Selected", group: FieldGroup::State },
    FieldDefinition { key: "focusable", label: "Focusable", group: FieldGroup::State },
    FieldDefinition { key: "focused", label: "Focused", group: FieldGroup::State },
    FieldDefinition { key: "long-clickable", label: "Long clickable", group: FieldGroup::State },
    FieldDefinition { key: "password", label: "Password", group: FieldGroup::State },
    FieldDefinition { key: "visible-to-user", label: "Visible to user", group: FieldGroup::State },
];

pub fn field_definition(key: &str) -> Option<&'static FieldDefinition> {
    FIELD_DEFINITIONS.iter().find(|def| def.key == key)
}

/// Bounds and sibling index
pub fn is_positional(key: &str) -> bool {
    key == keys::BOUNDS || key == keys::INDEX
}

/// Read one field of `node`; `None` when the node or the context is absent.
///
/// `index` is the 0-based sibling index. Context fields that are not in the
/// registry fall through to a plain attribute lookup.
pub fn field_value(tree: &UiTree, node: NodeId, key: &str) -> Option<String> {
    let target = tree.node(node)?;

    if key == keys::INDEX {
        return Some(tree.sibling_index(node).to_string());
    }
    if let Some(attr) = key.strip_prefix("parent_") {
        let parent = tree.parent(node)?;
        return context_value(tree, parent, attr);
    }
    if let Some(attr) = key.strip_prefix("first_child_") {
        let child = tree.first_child(node)?;
        return context_value(tree, child, attr);
    }
    if let Some(attr) = key.strip_prefix("clickable_ancestor_") {
        let ancestor = tree
            .ancestors(node)
            .find(|id| tree.node(*id).map(|n| n.is(NodeFlag::Clickable)).unwrap_or(false))?;
        return context_value(tree, ancestor, attr);
    }
    target.attr(key).map(str::to_string)
}

/// Context keys use underscores (`resource_id`); attributes use dashes.
fn context_value(tree: &UiTree, node: NodeId, attr: &str) -> Option<String> {
    let attr = attr.replace('_', "-");
    tree.node(node)?.attr(&attr).map(str::to_string)
}

/// Values of `fields` read from `node`; absent fields are left out.
pub fn build_values_from_node<S: AsRef<str>>(
    tree: &UiTree,
    node: NodeId,
    fields: &[S],
) -> BTreeMap<String, String> {
    fields
        .iter()
        .filter_map(|field| {
            let field = field.as_ref();
            field_value(tree, node, field).map(|value| (field.to_string(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"<hierarchy>
  <node class="android.widget.FrameLayout" resource-id="com.app:id/card" clickable="true" text="Card">
    <node class="android.widget.LinearLayout">
      <node class="android.widget.TextView" text="Alice" resource-id="com.app:id/name"/>
      <node class="android.widget.Button" text="" content-desc="More" checked="false"/>
    </node>
  </node>
</hierarchy>"#;

    #[test]
    fn test_registry_covers_flags() {
        for flag in NodeFlag::ALL {
            let def = field_definition(flag.key()).unwrap();
            assert_eq!(def.group, FieldGroup::State);
        }
        assert!(field_definition("nonsense").is_none());
    }

    #[test]
    fn test_field_values_from_context() {
        let tree = UiTree::parse(DUMP).unwrap();
        let row = NodeId::from_index(2);
        let more = NodeId::from_index(4);

        assert_eq!(field_value(&tree, row, "first_child_text").as_deref(), Some("Alice"));
        assert_eq!(
            field_value(&tree, row, "first_child_resource_id").as_deref(),
            Some("com.app:id/name")
        );
        assert_eq!(
            field_value(&tree, more, "parent_class").as_deref(),
            Some("android.widget.LinearLayout")
        );
        assert_eq!(
            field_value(&tree, more, "clickable_ancestor_resource_id").as_deref(),
            Some("com.app:id/card")
        );
        assert_eq!(field_value(&tree, more, "index").as_deref(), Some("1"));
        assert_eq!(field_value(&tree, more, "checked").as_deref(), Some("false"));
        assert_eq!(field_value(&tree, more, "first_child_text"), None);
        assert_eq!(field_value(&tree, tree.root(), "parent_class"), None);
    }

    #[test]
    fn test_build_values_skips_missing() {
        let tree = UiTree::parse(DUMP).unwrap();
        let name = NodeId::from_index(3);
        let values = build_values_from_node(
            &tree,
            name,
            &["text", "content-desc", "resource-id", "bounds"],
        );
        assert_eq!(values.len(), 2);
        assert_eq!(values["text"], "Alice");
        assert!(!values.contains_key("content-desc"));
    }
}
