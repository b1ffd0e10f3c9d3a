//! Record store trait definition.

use crate::error::StoreResult;
use crate::record::{RecordKey, StoredRecord};
use std::collections::BTreeSet;

/// Selects the portion of a store eligible for a scoped operation.
///
/// Produced by [`RecordStore::descendants_of`] and
/// [`RecordStore::entire_forest`], consumed by [`RecordStore::delete_where`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeQuery {
    /// Records whose bounds lie strictly inside the given interval.
    Descendants {
        /// Left bound of the enclosing record.
        left: u64,
        /// Right bound of the enclosing record.
        right: u64,
    },
    /// Every record in the store.
    Forest,
}

impl ScopeQuery {
    /// Returns true if `record` falls inside this scope.
    #[must_use]
    pub fn matches(&self, record: &StoredRecord) -> bool {
        match self {
            Self::Descendants { left, right } => {
                *left < record.left && record.right < *right
            }
            Self::Forest => true,
        }
    }
}

/// A record store for nested-set trees.
///
/// Stores hold flat [`StoredRecord`]s; tree shape lives entirely in the
/// `parent`/`left`/`right` fields. The synchronizers in `nestsync_core`
/// drive stores exclusively through this trait.
///
/// # Invariants
///
/// - `save` assigns a fresh key to a keyless record and returns the key
///   under which the record is now stored
/// - `locate_or_instantiate` never persists by itself
/// - `scan_all` returns records in ascending key order
/// - While write protection is enabled, `save` rejects any change to a
///   record's structural fields (`parent`, `depth`, `left`, `right`)
/// - `begin`/`commit`/`rollback` nest like savepoints: `rollback` undoes
///   every write since the matching `begin`
///
/// # Implementors
///
/// - [`super::MemoryStore`] - reference backend for tests and embedding
pub trait RecordStore {
    /// Looks up a record by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails; an absent key is `Ok(None)`.
    fn find(&self, key: RecordKey) -> StoreResult<Option<StoredRecord>>;

    /// Resolves an identity to a record with find-or-new semantics.
    ///
    /// With `Some(key)` and a stored record under that key, returns the
    /// stored record. Otherwise returns a fresh unsaved record carrying
    /// the supplied identity (if any). Nothing is written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn locate_or_instantiate(&self, key: Option<RecordKey>) -> StoreResult<StoredRecord>;

    /// Persists a record, assigning a key if it has none.
    ///
    /// Returns the key under which the record is stored; the record's own
    /// `key` field is updated to match.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Write protection is enabled and a structural field changed
    /// - The backend fails
    fn save(&mut self, record: &mut StoredRecord) -> StoreResult<RecordKey>;

    /// Deletes every record inside `scope` whose key is not in `except`.
    ///
    /// Returns the number of deleted records.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails; no partial count is reported.
    fn delete_where(
        &mut self,
        scope: &ScopeQuery,
        except: &BTreeSet<RecordKey>,
    ) -> StoreResult<usize>;

    /// Returns every record in ascending key order.
    ///
    /// **Warning**: full scan. Used by the rebalancer and by tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn scan_all(&self) -> StoreResult<Vec<StoredRecord>>;

    /// Returns the scope covering the strict descendants of `record`.
    fn descendants_of(&self, record: &StoredRecord) -> ScopeQuery {
        ScopeQuery::Descendants {
            left: record.left,
            right: record.right,
        }
    }

    /// Returns the scope covering the whole store.
    fn entire_forest(&self) -> ScopeQuery {
        ScopeQuery::Forest
    }

    /// Opens a savepoint; writes after this call can be rolled back.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot start a transaction.
    fn begin(&mut self) -> StoreResult<()>;

    /// Releases the innermost savepoint, keeping its writes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::NoActiveTransaction`] without a
    /// matching `begin`.
    fn commit(&mut self) -> StoreResult<()>;

    /// Undoes every write since the innermost `begin`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::NoActiveTransaction`] without a
    /// matching `begin`.
    fn rollback(&mut self) -> StoreResult<()>;

    /// Suspends structural-field write protection.
    fn disable_protection(&mut self);

    /// Re-enables structural-field write protection.
    fn enable_protection(&mut self);
}
