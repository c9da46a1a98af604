//! Pure recursive operations over roadmap trees
//!
//! Nothing here mutates its input: every operation takes `&[RoadmapNode]`
//! and returns a freshly built tree. All of them are specializations of
//! [`rewrite`], which walks the forest once and lets a visitor decide what
//! happens to each node.
//!
//! Lookup misses are silent. Updating, deleting or adding under an id that
//! matches nothing returns a tree equal to the input.

use crate::node::{NodePatch, RoadmapNode};
use std::collections::{HashMap, HashSet};

/// What [`rewrite`] does with the node the visitor was shown
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Emit the node unchanged, subtree included
    Keep,
    /// Emit this node instead and do not look inside it
    Replace(RoadmapNode),
    /// Emit the node with its children rewritten by the same visitor
    Descend,
    /// Like `Descend`, but drop the node when no child survives
    Prune,
    /// Omit the node and its whole subtree
    Drop,
}

/// Rebuild a forest, asking `visit` what to do at every node
pub fn rewrite<F>(nodes: &[RoadmapNode], visit: &mut F) -> Vec<RoadmapNode>
where
    F: FnMut(&RoadmapNode) -> Step,
{
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match visit(node) {
            Step::Keep => out.push(node.clone()),
            Step::Replace(replacement) => out.push(replacement),
            Step::Descend => {
                let children = rewrite(&node.children, visit);
                out.push(with_children(node, children));
            }
            Step::Prune => {
                let children = rewrite(&node.children, visit);
                if !children.is_empty() {
                    out.push(with_children(node, children));
                }
            }
            Step::Drop => {}
        }
    }
    out
}

fn with_children(node: &RoadmapNode, children: Vec<RoadmapNode>) -> RoadmapNode {
    RoadmapNode {
        children,
        ..node_without_children(node)
    }
}

fn node_without_children(node: &RoadmapNode) -> RoadmapNode {
    RoadmapNode {
        id: node.id.clone(),
        title: node.title.clone(),
        description: node.description.clone(),
        start_date: node.start_date.clone(),
        end_date: node.end_date.clone(),
        status: node.status,
        category: node.category.clone(),
        children: Vec::new(),
        details: node.details.clone(),
    }
}

// =============================================================================
// Mutators
// =============================================================================

/// Shallow-merge `patch` into every node whose id is `id`
pub fn update(nodes: &[RoadmapNode], id: &str, patch: &NodePatch) -> Vec<RoadmapNode> {
    rewrite(nodes, &mut |node| {
        if node.id == id {
            Step::Replace(node.merged(patch))
        } else {
            Step::Descend
        }
    })
}

/// Remove every node whose id is `id`, together with its subtree
pub fn delete(nodes: &[RoadmapNode], id: &str) -> Vec<RoadmapNode> {
    rewrite(nodes, &mut |node| {
        if node.id == id {
            Step::Drop
        } else {
            Step::Descend
        }
    })
}

/// Append `child` as the last child of the node whose id is `parent_id`
pub fn add_child(nodes: &[RoadmapNode], parent_id: &str, child: &RoadmapNode) -> Vec<RoadmapNode> {
    rewrite(nodes, &mut |node| {
        if node.id == parent_id {
            let mut parent = node.clone();
            parent.children.push(child.clone());
            Step::Replace(parent)
        } else {
            Step::Descend
        }
    })
}

/// Append a new top-level node
pub fn add_root(nodes: &[RoadmapNode], node: RoadmapNode) -> Vec<RoadmapNode> {
    let mut out = nodes.to_vec();
    out.push(node);
    out
}

// =============================================================================
// Queries
// =============================================================================

/// Visit every node in pre-order with its depth (roots are depth 0)
pub fn walk<'a, F>(nodes: &'a [RoadmapNode], f: &mut F)
where
    F: FnMut(&'a RoadmapNode, usize),
{
    fn go<'a, F>(nodes: &'a [RoadmapNode], depth: usize, f: &mut F)
    where
        F: FnMut(&'a RoadmapNode, usize),
    {
        for node in nodes {
            f(node, depth);
            go(&node.children, depth + 1, f);
        }
    }
    go(nodes, 0, f)
}

/// First node with the given id, depth-first
pub fn find<'a>(nodes: &'a [RoadmapNode], id: &str) -> Option<&'a RoadmapNode> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find(&node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Ids from the root down to the node with `id` (inclusive)
pub fn path_to(nodes: &[RoadmapNode], id: &str) -> Option<Vec<String>> {
    for node in nodes {
        if node.id == id {
            return Some(vec![node.id.clone()]);
        }
        if let Some(mut rest) = path_to(&node.children, id) {
            rest.insert(0, node.id.clone());
            return Some(rest);
        }
    }
    None
}

/// Total number of nodes
pub fn count(nodes: &[RoadmapNode]) -> usize {
    let mut n = 0;
    walk(nodes, &mut |_, _| n += 1);
    n
}

/// All ids in pre-order
pub fn ids(nodes: &[RoadmapNode]) -> Vec<String> {
    let mut out = Vec::new();
    walk(nodes, &mut |node, _| out.push(node.id.clone()));
    out
}

/// Ids of every node strictly below the node with `id`
pub fn descendant_ids(nodes: &[RoadmapNode], id: &str) -> HashSet<String> {
    find(nodes, id)
        .map(|node| ids(&node.children).into_iter().collect())
        .unwrap_or_default()
}

/// Ids that occur more than once, in first-seen order
pub fn duplicate_ids(nodes: &[RoadmapNode]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut order = Vec::new();
    walk(nodes, &mut |node, _| {
        let n = seen.entry(node.id.as_str()).or_insert(0);
        *n += 1;
        if *n == 2 {
            order.push(node.id.clone());
        }
    });
    order
}

/// Distinct categories in pre-order of first appearance
pub fn categories(nodes: &[RoadmapNode]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    walk(nodes, &mut |node, _| {
        if seen.insert(node.category.as_str()) {
            out.push(node.category.clone());
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Status;

    fn leaf(id: &str) -> RoadmapNode {
        RoadmapNode::new(id, id.to_uppercase(), "2025-01-01", "2025-01-31", "Product")
    }

    fn sample() -> Vec<RoadmapNode> {
        vec![
            leaf("a").with_children(vec![
                leaf("a1"),
                leaf("a2").with_children(vec![leaf("a2x")]),
            ]),
            leaf("b"),
        ]
    }

    #[test]
    fn test_update_replaces_only_target() {
        let tree = sample();
        let out = update(&tree, "a2x", &NodePatch::title("Deep"));
        assert_eq!(find(&out, "a2x").unwrap().title, "Deep");
        assert_eq!(find(&out, "a2").unwrap().title, "A2");
        assert_eq!(find(&out, "b").unwrap(), find(&tree, "b").unwrap());
    }

    #[test]
    fn test_update_miss_is_structurally_equal() {
        let tree = sample();
        assert_eq!(update(&tree, "nope", &NodePatch::title("x")), tree);
    }

    #[test]
    fn test_update_hits_every_duplicate() {
        let tree = vec![leaf("dup"), leaf("x").with_children(vec![leaf("dup")])];
        let patch = NodePatch {
            status: Some(Status::Completed),
            ..Default::default()
        };
        let out = update(&tree, "dup", &patch);
        assert_eq!(out[0].status, Status::Completed);
        assert_eq!(out[1].children[0].status, Status::Completed);
    }

    #[test]
    fn test_delete_removes_subtree() {
        let out = delete(&sample(), "a2");
        assert!(find(&out, "a2").is_none());
        assert!(find(&out, "a2x").is_none());
        assert_eq!(count(&out), 3);
    }

    #[test]
    fn test_delete_root() {
        let out = delete(&sample(), "a");
        assert_eq!(ids(&out), vec!["b".to_string()]);
    }

    #[test]
    fn test_add_child_appends_last() {
        let out = add_child(&sample(), "a", &leaf("a3"));
        let kids: Vec<&str> = find(&out, "a")
            .unwrap()
            .children
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(kids, vec!["a1", "a2", "a3"]);
    }

    #[test]
    fn test_add_child_creates_children_on_leaf() {
        let out = add_child(&sample(), "b", &leaf("b1"));
        assert_eq!(find(&out, "b").unwrap().children.len(), 1);
    }

    #[test]
    fn test_add_child_unknown_parent_drops_child() {
        let tree = sample();
        let out = add_child(&tree, "ghost", &leaf("orphan"));
        assert_eq!(out, tree);
        assert!(find(&out, "orphan").is_none());
    }

    #[test]
    fn test_add_root_on_empty() {
        let out = add_root(&[], leaf("r"));
        assert_eq!(out.len(), 1);
        assert!(update(&[], "r", &NodePatch::title("x")).is_empty());
        assert!(delete(&[], "r").is_empty());
    }

    #[test]
    fn test_walk_depths_and_paths() {
        let mut depths = Vec::new();
        walk(&sample(), &mut |n, d| depths.push((n.id.clone(), d)));
        assert_eq!(depths[3], ("a2x".to_string(), 2));
        assert_eq!(
            path_to(&sample(), "a2x").unwrap(),
            vec!["a".to_string(), "a2".to_string(), "a2x".to_string()]
        );
        assert!(path_to(&sample(), "zzz").is_none());
    }

    #[test]
    fn test_descendants_and_duplicates() {
        let d = descendant_ids(&sample(), "a");
        assert_eq!(d.len(), 3);
        assert!(d.contains("a2x"));
        let tree = vec![leaf("x"), leaf("y").with_children(vec![leaf("x"), leaf("x")])];
        assert_eq!(duplicate_ids(&tree), vec!["x".to_string()]);
        assert!(duplicate_ids(&sample()).is_empty());
    }

    #[test]
    fn test_rewrite_prune() {
        let tree = sample();
        let out = rewrite(&tree, &mut |n| {
            if n.id == "a2x" {
                Step::Keep
            } else {
                Step::Prune
            }
        });
        assert_eq!(ids(&out), vec!["a", "a2", "a2x"]);
    }
}
