//! Absolute structural paths
//!
//! A path names every step from the root: `/hierarchy/node[1]/node[2]`.
//! Each non-root step is `tag[rank]` where rank is the 1-based position
//! among siblings with the same tag. Evaluation walks the same steps and
//! fails closed on any mismatch.

use crate::model::{NodeId, UiTree};

/// Build the absolute path of `node`; `None` if the id is not in the tree.
pub fn build_absolute_path(tree: &UiTree, node: NodeId) -> Option<String> {
    tree.node(node)?;

    let mut chain: Vec<NodeId> = tree.ancestors(node).collect();
    chain.reverse();
    chain.push(node);

    let mut path = String::new();
    for (depth, id) in chain.iter().enumerate() {
        let tag = tree.node(*id)?.tag();
        path.push('/');
        path.push_str(tag);
        if depth > 0 {
            path.push_str(&format!("[{}]", tree.same_tag_rank(*id)));
        }
    }
    Some(path)
}

/// Walk an absolute path from the root.
///
/// The first step must name the root tag (an explicit `[1]` is accepted).
/// A step without a rank means rank 1.
pub fn evaluate_absolute_path(tree: &UiTree, path: &str) -> Option<NodeId> {
    let rest = path.trim().strip_prefix('/')?;
    let mut steps = rest.split('/');

    let (root_tag, root_rank) = parse_step(steps.next()?)?;
    let root = tree.root();
    if tree.node(root)?.tag() != root_tag || root_rank != 1 {
        return None;
    }

    let mut current = root;
    for step in steps {
        let (tag, rank) = parse_step(step)?;
        current = tree
            .children(current)
            .iter()
            .copied()
            .filter(|child| tree.node(*child).map(|n| n.tag() == tag).unwrap_or(false))
            .nth(rank - 1)?;
    }
    Some(current)
}

/// `tag` or `tag[n]` with n >= 1
fn parse_step(step: &str) -> Option<(&str, usize)> {
    let (tag, rank) = match step.split_once('[') {
        Some((tag, rest)) => {
            let digits = rest.strip_suffix(']')?;
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            (tag, digits.parse::<usize>().ok()?)
        }
        None => (step, 1),
    };
    if tag.is_empty() || rank == 0 || tag.contains(']') {
        return None;
    }
    Some((tag, rank))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"<hierarchy>
  <node class="root">
    <node class="a"/>
    <button class="b"/>
    <node class="c">
      <node class="c1"/>
    </node>
  </node>
</hierarchy>"#;

    #[test]
    fn test_build_paths() {
        let tree = UiTree::parse(DUMP).unwrap();
        assert_eq!(
            build_absolute_path(&tree, tree.root()).as_deref(),
            Some("/hierarchy")
        );
        assert_eq!(
            build_absolute_path(&tree, NodeId::from_index(3)).as_deref(),
            Some("/hierarchy/node[1]/button[1]")
        );
        assert_eq!(
            build_absolute_path(&tree, NodeId::from_index(5)).as_deref(),
            Some("/hierarchy/node[1]/node[2]/node[1]")
        );
        assert_eq!(build_absolute_path(&tree, NodeId::from_index(42)), None);
    }

    #[test]
    fn test_every_node_walks_back_to_itself() {
        let tree = UiTree::parse(DUMP).unwrap();
        for id in tree.node_ids() {
            let path = build_absolute_path(&tree, id).unwrap();
            assert_eq!(evaluate_absolute_path(&tree, &path), Some(id), "{}", path);
        }
    }

    #[test]
    fn test_evaluate_fails_closed() {
        let tree = UiTree::parse(DUMP).unwrap();
        assert_eq!(evaluate_absolute_path(&tree, ""), None);
        assert_eq!(evaluate_absolute_path(&tree, "hierarchy/node[1]"), None);
        assert_eq!(evaluate_absolute_path(&tree, "/screen/node[1]"), None);
        assert_eq!(evaluate_absolute_path(&tree, "/hierarchy/node[3]"), None);
        assert_eq!(evaluate_absolute_path(&tree, "/hierarchy/node[0]"), None);
        assert_eq!(evaluate_absolute_path(&tree, "/hierarchy//node[1]"), None);
        assert_eq!(evaluate_absolute_path(&tree, "/hierarchy/node[x]"), None);
    }

    #[test]
    fn test_evaluate_accepts_implicit_rank_and_ranked_root() {
        let tree = UiTree::parse(DUMP).unwrap();
        assert_eq!(
            evaluate_absolute_path(&tree, "/hierarchy/node/button"),
            Some(NodeId::from_index(3))
        );
        assert_eq!(
            evaluate_absolute_path(&tree, "/hierarchy[1]/node[1]/node[2]"),
            Some(NodeId::from_index(4))
        );
    }
}
