//! Arena tree of UI nodes
//!
//! Nodes live in one `Vec` owned by [`UiTree`]; children and parents refer to
//! each other through [`NodeId`] handles. The parser assigns ids in document
//! preorder, so comparing ids compares document order.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::errors::ParseError;

/// Well-known attribute keys of a UiAutomator dump.
pub mod keys {
    pub const RESOURCE_ID: &str = "resource-id";
    pub const TEXT: &str = "text";
    pub const CONTENT_DESC: &str = "content-desc";
    pub const CLASS: &str = "class";
    pub const PACKAGE: &str = "package";
    pub const BOUNDS: &str = "bounds";
    pub const INDEX: &str = "index";
}

/// Handle into a [`UiTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Boolean attributes carried by every dump node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeFlag {
    Clickable,
    Enabled,
    Scrollable,
    Checkable,
    Checked,
    Selected,
    Focusable,
    Focused,
    LongClickable,
    Password,
    VisibleToUser,
}

impl NodeFlag {
    pub const ALL: [NodeFlag; 11] = [
        NodeFlag::Clickable,
        NodeFlag::Enabled,
        NodeFlag::Scrollable,
        NodeFlag::Checkable,
        NodeFlag::Checked,
        NodeFlag::Selected,
        NodeFlag::Focusable,
        NodeFlag::Focused,
        NodeFlag::LongClickable,
        NodeFlag::Password,
        NodeFlag::VisibleToUser,
    ];

    /// Attribute key as it appears in the dump
    pub fn key(&self) -> &'static str {
        match self {
            NodeFlag::Clickable => "clickable",
            NodeFlag::Enabled => "enabled",
            NodeFlag::Scrollable => "scrollable",
            NodeFlag::Checkable => "checkable",
            NodeFlag::Checked => "checked",
            NodeFlag::Selected => "selected",
            NodeFlag::Focusable => "focusable",
            NodeFlag::Focused => "focused",
            NodeFlag::LongClickable => "long-clickable",
            NodeFlag::Password => "password",
            NodeFlag::VisibleToUser => "visible-to-user",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.key() == key)
    }
}

/// One element of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiNode {
    pub(crate) tag: String,
    pub(crate) attributes: HashMap<String, String>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
}

impl UiNode {
    pub(crate) fn new(tag: String, attributes: HashMap<String, String>) -> Self {
        Self {
            tag,
            attributes,
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Raw attribute value
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Attribute value, or `""` when absent
    pub fn attr_or_empty(&self, key: &str) -> &str {
        self.attr(key).unwrap_or("")
    }

    pub fn resource_id(&self) -> Option<&str> {
        self.attr(keys::RESOURCE_ID)
    }

    pub fn text(&self) -> Option<&str> {
        self.attr(keys::TEXT)
    }

    pub fn content_desc(&self) -> Option<&str> {
        self.attr(keys::CONTENT_DESC)
    }

    pub fn class_name(&self) -> Option<&str> {
        self.attr(keys::CLASS)
    }

    pub fn package(&self) -> Option<&str> {
        self.attr(keys::PACKAGE)
    }

    pub fn bounds_raw(&self) -> Option<&str> {
        self.attr(keys::BOUNDS)
    }

    /// Parsed bounds; `None` when absent or unparseable
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds_raw().and_then(|raw| raw.parse().ok())
    }

    /// Flag value; `None` when absent or not a literal `"true"`/`"false"`
    pub fn flag(&self, flag: NodeFlag) -> Option<bool> {
        match self.attr(flag.key()) {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }

    /// True only for a literal `"true"`
    pub fn is(&self, flag: NodeFlag) -> bool {
        self.flag(flag) == Some(true)
    }

    /// Attribute value with surrounding whitespace removed, `None` when blank
    pub fn non_blank(&self, key: &str) -> Option<&str> {
        self.attr(key).map(str::trim).filter(|value| !value.is_empty())
    }
}

/// Parsed UI hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiTree {
    nodes: Vec<UiNode>,
}

impl UiTree {
    /// Parse dump text into a tree.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        crate::parser::parse(text)
    }

    /// Nodes must be in document preorder with parent links attached.
    pub(crate) fn from_nodes(nodes: Vec<UiNode>) -> Self {
        Self { nodes }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&UiNode> {
        self.nodes.get(id.index())
    }

    /// All node ids in document order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::from_index)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(UiNode::parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(UiNode::children).unwrap_or(&[])
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    /// Preorder walk of `from` and everything below it.
    pub fn descendants(&self, from: NodeId) -> Descendants<'_> {
        let stack = if self.contains(from) {
            vec![from]
        } else {
            Vec::new()
        };
        Descendants { tree: self, stack }
    }

    /// Walk from the parent of `id` up to the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Number of ancestors; the root has depth 0.
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// 0-based position among all children of the parent; the root is 0.
    pub fn sibling_index(&self, id: NodeId) -> usize {
        match self.parent(id) {
            Some(parent) => self
                .children(parent)
                .iter()
                .position(|child| *child == id)
                .unwrap_or(0),
            None => 0,
        }
    }

    /// 1-based rank among siblings sharing the node's tag; the root is 1.
    pub fn same_tag_rank(&self, id: NodeId) -> usize {
        let (Some(node), Some(parent)) = (self.node(id), self.parent(id)) else {
            return 1;
        };
        let mut rank = 0;
        for child in self.children(parent) {
            if self.nodes[child.index()].tag == node.tag {
                rank += 1;
            }
            if *child == id {
                break;
            }
        }
        rank.max(1)
    }

    /// The node itself if clickable, else its closest clickable ancestor.
    pub fn nearest_clickable_ancestor(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id)?;
        if node.is(NodeFlag::Clickable) {
            return Some(id);
        }
        self.ancestors(id)
            .find(|ancestor| self.nodes[ancestor.index()].is(NodeFlag::Clickable))
    }

    /// Short human label: text, else id suffix, else description, else class.
    pub fn node_label(&self, id: NodeId) -> String {
        let Some(node) = self.node(id) else {
            return String::new();
        };
        if let Some(text) = node.non_blank(keys::TEXT) {
            return text.to_string();
        }
        if let Some(resource_id) = node.non_blank(keys::RESOURCE_ID) {
            let suffix = resource_id.rsplit('/').next().unwrap_or(resource_id);
            return format!("#{}", suffix);
        }
        if let Some(desc) = node.non_blank(keys::CONTENT_DESC) {
            return format!("desc:{}", desc);
        }
        if let Some(class) = node.non_blank(keys::CLASS) {
            return class.rsplit('.').next().unwrap_or(class).to_string();
        }
        node.tag.clone()
    }
}

/// Iterator returned by [`UiTree::descendants`]; uses an explicit stack.
pub struct Descendants<'a> {
    tree: &'a UiTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Iterator returned by [`UiTree::ancestors`].
pub struct Ancestors<'a> {
    tree: &'a UiTree,
    next: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.tree.parent(id);
        Some(id)
    }
}
