//! Bound flattener: linearizes a nested forest into nested-set tuples.

use crate::node::Node;
use nestsync_store::{AttrMap, RecordKey};

/// One flattened node with computed nested-set fields.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRecord {
    /// Identity of the input node, if it carried one.
    pub key: Option<RecordKey>,
    /// Identity of the parent input node, `None` for roots.
    pub parent: Option<RecordKey>,
    /// Distance from the root, root = 0.
    pub depth: u32,
    /// Left bound.
    pub left: u64,
    /// Right bound.
    pub right: u64,
    /// Attribute payload of the input node.
    pub attributes: AttrMap,
}

/// Flattens a forest into preorder nested-set tuples.
///
/// A single counter is threaded through the whole walk, so bounds are
/// unique across the entire forest and a preorder traversal visits
/// ascending left bounds. Each node's left bound is taken before its
/// children are walked and its right bound after, which makes a leaf
/// satisfy `right == left + 1`.
///
/// Pure: no I/O, deterministic for a given input order.
///
/// ```rust
/// use nestsync_core::{flatten, Node};
///
/// let forest = [Node::with_key(1).child(Node::with_key(2))];
/// let flat = flatten(&forest);
/// assert_eq!((flat[0].left, flat[0].right), (1, 4));
/// assert_eq!((flat[1].left, flat[1].right), (2, 3));
/// ```
#[must_use]
pub fn flatten(nodes: &[Node]) -> Vec<FlatRecord> {
    let mut out = Vec::new();
    let mut bound = 0;
    walk(nodes, None, 0, &mut bound, &mut out);
    out
}

fn walk(
    nodes: &[Node],
    parent: Option<RecordKey>,
    depth: u32,
    bound: &mut u64,
    out: &mut Vec<FlatRecord>,
) {
    for node in nodes {
        *bound += 1;
        let index = out.len();
        out.push(FlatRecord {
            key: node.key(),
            parent,
            depth,
            left: *bound,
            right: 0,
            attributes: node.attributes().clone(),
        });
        if !node.children().is_empty() {
            walk(node.children(), node.key(), depth + 1, bound, out);
        }
        *bound += 1;
        out[index].right = *bound;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    #[test]
    fn empty_forest() {
        assert!(flatten(&[]).is_empty());
    }

    #[test]
    fn single_leaf() {
        let flat = flatten(&[Node::with_key(1)]);
        assert_eq!(flat.len(), 1);
        assert_eq!((flat[0].left, flat[0].right), (1, 2));
        assert_eq!(flat[0].depth, 0);
        assert!(flat[0].parent.is_none());
    }

    #[test]
    fn root_with_child() {
        let forest = [Node::with_key(1)
            .attr("name", "root")
            .child(Node::with_key(2).attr("name", "child"))];
        let flat = flatten(&forest);

        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].key, Some(RecordKey::new(1)));
        assert_eq!((flat[0].left, flat[0].right, flat[0].depth), (1, 4, 0));
        assert_eq!(flat[1].key, Some(RecordKey::new(2)));
        assert_eq!((flat[1].left, flat[1].right, flat[1].depth), (2, 3, 1));
        assert_eq!(flat[1].parent, Some(RecordKey::new(1)));
        assert_eq!(flat[1].attributes["name"], "child");
    }

    #[test]
    fn siblings_share_one_counter() {
        let forest = [
            Node::with_key(1).child(Node::with_key(2)),
            Node::with_key(3),
        ];
        let flat = flatten(&forest);

        assert_eq!((flat[0].left, flat[0].right), (1, 4));
        assert_eq!((flat[1].left, flat[1].right), (2, 3));
        assert_eq!((flat[2].left, flat[2].right), (5, 6));
    }

    #[test]
    fn preorder_output() {
        let forest = [Node::with_key(1)
            .child(Node::with_key(2).child(Node::with_key(4)))
            .child(Node::with_key(3))];
        let keys: Vec<_> = flatten(&forest)
            .into_iter()
            .map(|r| r.key.unwrap().as_u64())
            .collect();
        assert_eq!(keys, vec![1, 2, 4, 3]);
    }

    #[test]
    fn anonymous_parent_yields_no_parent_key() {
        let forest = [Node::new().child(Node::with_key(5))];
        let flat = flatten(&forest);
        assert!(flat[0].key.is_none());
        assert!(flat[1].parent.is_none());
    }

    fn tree_strategy() -> impl Strategy<Value = Node> {
        Just(Node::new()).prop_recursive(4, 32, 4, |inner| {
            proptest::collection::vec(inner, 0..4)
                .prop_map(|children| Node::new().children_from(children))
        })
    }

    proptest! {
        #[test]
        fn bounds_are_a_permutation_of_one_to_two_n(
            forest in proptest::collection::vec(tree_strategy(), 0..4)
        ) {
            let flat = flatten(&forest);
            let n = flat.len() as u64;
            let mut seen = BTreeSet::new();
            for record in &flat {
                prop_assert!(record.left < record.right);
                prop_assert!(seen.insert(record.left));
                prop_assert!(seen.insert(record.right));
            }
            // 2N unique values in 1..=2N means no gaps and no overlap.
            prop_assert_eq!(seen.len() as u64, 2 * n);
            if n > 0 {
                prop_assert_eq!(*seen.iter().next().unwrap(), 1);
                prop_assert_eq!(*seen.iter().next_back().unwrap(), 2 * n);
            }
        }

        #[test]
        fn descendants_nest_strictly_inside_ancestors(
            forest in proptest::collection::vec(tree_strategy(), 0..4)
        ) {
            let flat = flatten(&forest);
            let mut open: Vec<(u64, u64, u32)> = Vec::new();
            let mut last_left = 0;
            for record in &flat {
                prop_assert!(record.left > last_left);
                last_left = record.left;
                while let Some(&(_, right, _)) = open.last() {
                    if record.left > right {
                        open.pop();
                    } else {
                        break;
                    }
                }
                if let Some(&(left, right, depth)) = open.last() {
                    prop_assert!(left < record.left && record.right < right);
                    prop_assert_eq!(record.depth, depth + 1);
                } else {
                    prop_assert_eq!(record.depth, 0);
                }
                open.push((record.left, record.right, record.depth));
            }
        }

        #[test]
        fn span_width_counts_descendants(
            forest in proptest::collection::vec(tree_strategy(), 0..4)
        ) {
            let flat = flatten(&forest);
            for record in &flat {
                let inside = flat
                    .iter()
                    .filter(|other| record.left < other.left && other.right < record.right)
                    .count() as u64;
                prop_assert_eq!(record.right - record.left - 1, 2 * inside);
            }
        }
    }
}
