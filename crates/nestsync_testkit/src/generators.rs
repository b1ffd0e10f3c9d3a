//! Property-based test generators using proptest.
//!
//! Strategies produce input forests whose node keys are unique, so the
//! mapper's idempotence and pruning properties can be checked directly.

use nestsync_core::Node;
use proptest::prelude::*;

/// Strategy for a single tree of up to the given depth and fanout.
///
/// Nodes carry no keys; pass the result through [`with_unique_keys`] or
/// use [`forest_strategy`] which already does.
pub fn tree_shape_strategy(depth: u32, fanout: usize) -> impl Strategy<Value = Node> {
    let leaf = Just(Node::new());
    leaf.prop_recursive(depth, 64, fanout as u32, move |inner| {
        proptest::collection::vec(inner, 0..=fanout)
            .prop_map(|children| Node::new().children_from(children))
    })
}

/// Strategy for a forest with unique keys and per-node name attributes.
pub fn forest_strategy() -> impl Strategy<Value = Vec<Node>> {
    proptest::collection::vec(tree_shape_strategy(3, 3), 0..4).prop_map(|forest| {
        let mut next = 1;
        with_unique_keys(&forest, &mut next)
    })
}

/// Rebuilds a forest assigning sequential keys in preorder.
///
/// Every node also receives a `name` attribute derived from its key so
/// attribute propagation is visible in tests.
#[must_use]
pub fn with_unique_keys(nodes: &[Node], next: &mut u64) -> Vec<Node> {
    nodes
        .iter()
        .map(|node| {
            let key = *next;
            *next += 1;
            let mut rebuilt = Node::with_key(key).attr("name", format!("node-{key}"));
            for (name, value) in node.attributes() {
                rebuilt = rebuilt.attr(name.clone(), value.clone());
            }
            rebuilt.children_from(with_unique_keys(node.children(), next))
        })
        .collect()
}
