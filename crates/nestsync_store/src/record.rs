//! Record identity and the persisted record shape.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute payload of a record: arbitrary names mapped to JSON values.
pub type AttrMap = BTreeMap<String, serde_json::Value>;

/// Unique identifier for a stored record.
///
/// Keys are:
/// - Unique within a store
/// - Assigned by the store on first save when the caller supplies none
/// - Immutable once assigned
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordKey(u64);

impl RecordKey {
    /// Creates a record key from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw key value.
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns the key that follows this one.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Debug for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordKey({})", self.0)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecordKey {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<RecordKey> for u64 {
    fn from(key: RecordKey) -> Self {
        key.0
    }
}

/// A persisted tree record in nested-set form.
///
/// Ancestry is encoded by bound containment: every descendant of a record
/// has `left`/`right` strictly inside the record's own bounds. A record
/// with `right == left + 1` is a leaf. Bounds are assigned by a single
/// monotone counter per rebuild, so a preorder walk of the tree visits
/// ascending left bounds.
///
/// `parent` is a weak reference: deleting the parent does not cascade
/// through this struct, reconciliation is the synchronizer's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Identity, `None` until the first save assigns one.
    pub key: Option<RecordKey>,
    /// Parent record key, `None` for roots.
    pub parent: Option<RecordKey>,
    /// Distance from the root, root = 0.
    pub depth: u32,
    /// Left bound, positive once assigned.
    pub left: u64,
    /// Right bound, `left < right` once assigned.
    pub right: u64,
    /// Domain attributes, passed through verbatim.
    pub attributes: AttrMap,
}

impl StoredRecord {
    /// Creates an unsaved record with the given identity.
    #[must_use]
    pub fn new(key: Option<RecordKey>) -> Self {
        Self {
            key,
            parent: None,
            depth: 0,
            left: 0,
            right: 0,
            attributes: AttrMap::new(),
        }
    }

    /// Returns true if this record was never saved.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.key.is_none()
    }

    /// Returns true if this record has no descendants.
    ///
    /// Only meaningful after bounds were assigned.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.right == self.left + 1
    }

    /// Returns true if `other`'s bounds lie strictly inside this record's.
    #[must_use]
    pub fn contains(&self, other: &StoredRecord) -> bool {
        self.left < other.left && other.right < self.right
    }

    /// Returns an attribute value by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&serde_json::Value> {
        self.attributes.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_roundtrip() {
        let key = RecordKey::new(42);
        assert_eq!(key.as_u64(), 42);
        assert_eq!(u64::from(key), 42);
        assert_eq!(RecordKey::from(42), key);
    }

    #[test]
    fn key_next() {
        assert_eq!(RecordKey::new(1).next(), RecordKey::new(2));
    }

    #[test]
    fn key_ordering() {
        assert!(RecordKey::new(1) < RecordKey::new(2));
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", RecordKey::new(7)), "7");
    }

    #[test]
    fn new_record_is_new() {
        assert!(StoredRecord::new(None).is_new());
        assert!(!StoredRecord::new(Some(RecordKey::new(1))).is_new());
    }

    #[test]
    fn leaf_and_containment() {
        let mut root = StoredRecord::new(Some(RecordKey::new(1)));
        root.left = 1;
        root.right = 4;

        let mut child = StoredRecord::new(Some(RecordKey::new(2)));
        child.left = 2;
        child.right = 3;

        assert!(!root.is_leaf());
        assert!(child.is_leaf());
        assert!(root.contains(&child));
        assert!(!child.contains(&root));
    }
}
