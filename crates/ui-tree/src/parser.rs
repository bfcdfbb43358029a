//! Dump text to arena tree
//!
//! Two passes: the reader builds nodes and child lists in preorder, then
//! [`attach_parent_links`] fills in the back-references.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::errors::ParseError;
use crate::model::{NodeId, UiNode, UiTree};

/// Parse a UiAutomator-style hierarchy dump.
///
/// Declarations, comments, processing instructions and text content are
/// ignored. Exactly one root element is accepted.
pub fn parse(text: &str) -> Result<UiTree, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::EmptyDocument);
    }

    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut nodes: Vec<UiNode> = Vec::new();
    let mut open: Vec<NodeId> = Vec::new();

    loop {
        let position = reader.buffer_position() as u64;
        match reader.read_event() {
            Ok(Event::Start(element)) => {
                let id = push_element(&mut nodes, &open, &element, position)?;
                open.push(id);
            }
            Ok(Event::Empty(element)) => {
                push_element(&mut nodes, &open, &element, position)?;
            }
            Ok(Event::End(_)) => {
                if open.pop().is_none() {
                    return Err(ParseError::Malformed {
                        position,
                        reason: "closing tag without matching opening tag".to_string(),
                    });
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(ParseError::Malformed {
                    position: reader.buffer_position() as u64,
                    reason: err.to_string(),
                })
            }
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(ParseError::UnclosedTag {
            tag: nodes[unclosed.index()].tag.clone(),
        });
    }
    if nodes.is_empty() {
        return Err(ParseError::NoRootElement);
    }

    attach_parent_links(&mut nodes);
    debug!(nodes = nodes.len(), "parsed ui hierarchy");
    Ok(UiTree::from_nodes(nodes))
}

/// Set every child's parent from the forward child lists.
pub fn attach_parent_links(nodes: &mut [UiNode]) {
    for index in 0..nodes.len() {
        let parent = NodeId::from_index(index);
        let children = nodes[index].children.clone();
        for child in children {
            if let Some(node) = nodes.get_mut(child.index()) {
                node.parent = Some(parent);
            }
        }
    }
}

fn push_element(
    nodes: &mut Vec<UiNode>,
    open: &[NodeId],
    element: &BytesStart<'_>,
    position: u64,
) -> Result<NodeId, ParseError> {
    let parent = open.last().copied();
    if parent.is_none() && !nodes.is_empty() {
        return Err(ParseError::MultipleRoots { position });
    }

    let tag = std::str::from_utf8(element.name().as_ref())
        .map_err(|err| ParseError::Malformed {
            position,
            reason: format!("tag name is not valid UTF-8: {}", err),
        })?
        .to_string();
    let attributes = read_attributes(element, position)?;

    let id = NodeId::from_index(nodes.len());
    nodes.push(UiNode::new(tag, attributes));
    if let Some(parent) = parent {
        nodes[parent.index()].children.push(id);
    }
    Ok(id)
}

fn read_attributes(
    element: &BytesStart<'_>,
    position: u64,
) -> Result<HashMap<String, String>, ParseError> {
    let invalid = |reason: String| ParseError::InvalidAttribute { position, reason };

    let mut attributes = HashMap::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|err| invalid(err.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|err| invalid(err.to_string()))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| invalid(err.to_string()))?
            .into_owned();
        attributes.insert(key, value);
    }
    Ok(attributes)
}
