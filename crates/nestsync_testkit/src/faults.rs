//! Fault-injecting store wrapper.
//!
//! Wraps any [`RecordStore`] and fails chosen operations on demand, for
//! exercising abort and rollback paths.
//!
//! ```rust
//! use nestsync_core::{Node, TreeMapper};
//! use nestsync_store::MemoryStore;
//! use nestsync_testkit::FlakyStore;
//!
//! let store = FlakyStore::new(MemoryStore::new()).fail_save_at(2);
//! let mut mapper = TreeMapper::new(store);
//! let err = mapper
//!     .map(&[Node::with_key(1), Node::with_key(2)])
//!     .unwrap_err();
//! assert!(err.to_string().contains("injected"));
//! ```

use nestsync_store::{
    RecordKey, RecordStore, ScopeQuery, StoreError, StoreResult, StoredRecord,
};
use std::collections::BTreeSet;

/// A store wrapper that injects failures at configured points.
#[derive(Debug)]
pub struct FlakyStore<S> {
    inner: S,
    saves_seen: usize,
    deletes_seen: usize,
    fail_save_at: Option<usize>,
    fail_deletes: bool,
}

impl<S: RecordStore> FlakyStore<S> {
    /// Wraps a store with no failures configured.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            saves_seen: 0,
            deletes_seen: 0,
            fail_save_at: None,
            fail_deletes: false,
        }
    }

    /// Makes the `n`-th save call fail (1-based).
    #[must_use]
    pub fn fail_save_at(mut self, n: usize) -> Self {
        self.fail_save_at = Some(n);
        self
    }

    /// Makes every `delete_where` call fail.
    #[must_use]
    pub fn fail_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    /// Number of save calls observed so far.
    #[must_use]
    pub fn saves_seen(&self) -> usize {
        self.saves_seen
    }

    /// Number of delete calls observed so far.
    #[must_use]
    pub fn deletes_seen(&self) -> usize {
        self.deletes_seen
    }

    /// Returns the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Consumes the wrapper, returning the wrapped store.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: RecordStore> RecordStore for FlakyStore<S> {
    fn find(&self, key: RecordKey) -> StoreResult<Option<StoredRecord>> {
        self.inner.find(key)
    }

    fn locate_or_instantiate(&self, key: Option<RecordKey>) -> StoreResult<StoredRecord> {
        self.inner.locate_or_instantiate(key)
    }

    fn save(&mut self, record: &mut StoredRecord) -> StoreResult<RecordKey> {
        self.saves_seen += 1;
        if self.fail_save_at == Some(self.saves_seen) {
            return Err(StoreError::backend("injected save failure"));
        }
        self.inner.save(record)
    }

    fn delete_where(
        &mut self,
        scope: &ScopeQuery,
        except: &BTreeSet<RecordKey>,
    ) -> StoreResult<usize> {
        self.deletes_seen += 1;
        if self.fail_deletes {
            return Err(StoreError::backend("injected delete failure"));
        }
        self.inner.delete_where(scope, except)
    }

    fn scan_all(&self) -> StoreResult<Vec<StoredRecord>> {
        self.inner.scan_all()
    }

    fn begin(&mut self) -> StoreResult<()> {
        self.inner.begin()
    }

    fn commit(&mut self) -> StoreResult<()> {
        self.inner.commit()
    }

    fn rollback(&mut self) -> StoreResult<()> {
        self.inner.rollback()
    }

    fn disable_protection(&mut self) {
        self.inner.disable_protection();
    }

    fn enable_protection(&mut self) {
        self.inner.enable_protection();
    }
}
