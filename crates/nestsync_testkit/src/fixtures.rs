//! Test fixtures and mapper helpers.
//!
//! Provides canned forests, pre-populated stores and invariant checks
//! for common test scenarios.

use nestsync_core::{Node, TreeMapper};
use nestsync_store::{MemoryStore, StoredRecord};

/// The smallest interesting forest: one root with one child.
#[must_use]
pub fn two_level_forest() -> Vec<Node> {
    vec![Node::with_key(1)
        .attr("name", "root")
        .child(Node::with_key(2).attr("name", "child"))]
}

/// A three-tree forest with mixed depths and attributes.
#[must_use]
pub fn department_forest() -> Vec<Node> {
    vec![
        Node::with_key(1)
            .attr("name", "engineering")
            .child(
                Node::with_key(2)
                    .attr("name", "platform")
                    .child(Node::with_key(3).attr("name", "storage"))
                    .child(Node::with_key(4).attr("name", "runtime")),
            )
            .child(Node::with_key(5).attr("name", "product")),
        Node::with_key(6).attr("name", "design"),
        Node::with_key(7)
            .attr("name", "operations")
            .child(Node::with_key(8).attr("name", "support")),
    ]
}

/// Returns a store already materialized from `nodes`.
#[must_use]
pub fn mapped_store(nodes: &[Node]) -> MemoryStore {
    let mut mapper = TreeMapper::new(MemoryStore::new());
    mapper.map(nodes).expect("fixture mapping failed");
    mapper.into_store()
}

/// Runs a test body with a fresh mapper over an empty in-memory store.
///
/// ```rust
/// use nestsync_testkit::{two_level_forest, with_mapper};
///
/// with_mapper(|mapper| {
///     mapper.map(&two_level_forest()).unwrap();
///     assert_eq!(mapper.store().len(), 2);
/// });
/// ```
pub fn with_mapper<F, R>(f: F) -> R
where
    F: FnOnce(&mut TreeMapper<MemoryStore>) -> R,
{
    let mut mapper = TreeMapper::new(MemoryStore::new());
    f(&mut mapper)
}

/// Asserts the full nested-set invariant over a stored forest.
///
/// Checks that bounds are unique and well-ordered, that every child's
/// bounds lie strictly inside its parent's and that depth increases by
/// one per level.
///
/// # Panics
///
/// Panics with a description of the first violated invariant.
pub fn assert_valid_forest(records: &[StoredRecord]) {
    let mut bounds = std::collections::BTreeSet::new();
    for record in records {
        assert!(
            record.left < record.right,
            "record {:?}: left {} not below right {}",
            record.key,
            record.left,
            record.right
        );
        assert!(
            bounds.insert(record.left) && bounds.insert(record.right),
            "record {:?}: duplicate bound",
            record.key
        );
    }

    for record in records {
        match record.parent {
            None => assert_eq!(record.depth, 0, "root {:?} has nonzero depth", record.key),
            Some(parent_key) => {
                let parent = records
                    .iter()
                    .find(|r| r.key == Some(parent_key))
                    .unwrap_or_else(|| panic!("record {:?}: parent missing", record.key));
                assert!(
                    parent.contains(record),
                    "record {:?} not inside parent {:?}",
                    record.key,
                    parent.key
                );
                assert_eq!(
                    record.depth,
                    parent.depth + 1,
                    "record {:?}: depth not parent + 1",
                    record.key
                );
            }
        }
    }
}
