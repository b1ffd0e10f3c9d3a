//! In-memory record store.

use crate::backend::{RecordStore, ScopeQuery};
use crate::error::{StoreError, StoreResult};
use crate::record::{RecordKey, StoredRecord};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

/// An in-memory record store.
///
/// This store keeps all records in memory and is suitable for:
/// - Unit and integration tests
/// - Ephemeral trees that don't need persistence
///
/// Transactions are implemented as a snapshot stack, so savepoints nest
/// to arbitrary depth. Structural-field write protection is **enabled**
/// on a fresh store; the synchronizers suspend it for the duration of a
/// pass.
///
/// # Thread Safety
///
/// The store is internally locked and can be held in `Send + Sync`
/// containers. The lock does not arbitrate concurrent synchronization
/// passes; callers serialize those themselves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Clone)]
struct Inner {
    records: BTreeMap<RecordKey, StoredRecord>,
    next_key: RecordKey,
    protection: bool,
    savepoints: Vec<Snapshot>,
}

#[derive(Debug, Clone)]
struct Snapshot {
    records: BTreeMap<RecordKey, StoredRecord>,
    next_key: RecordKey,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            next_key: RecordKey::new(1),
            protection: true,
            savepoints: Vec::new(),
        }
    }
}

impl MemoryStore {
    /// Creates a new empty store with protection enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given records.
    ///
    /// Records without keys are assigned fresh ones. Useful for setting
    /// up test scenarios.
    #[must_use]
    pub fn with_records(records: Vec<StoredRecord>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.write();
            for mut record in records {
                let key = inner.allocate(record.key);
                record.key = Some(key);
                inner.records.insert(key, record);
            }
        }
        store
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    /// Returns true if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }

    /// Returns true if structural-field write protection is enabled.
    #[must_use]
    pub fn protection_enabled(&self) -> bool {
        self.inner.read().protection
    }

    /// Removes all records.
    pub fn clear(&mut self) {
        self.inner.write().records.clear();
    }
}

impl Inner {
    /// Resolves a key for a save, bumping the counter past explicit keys.
    fn allocate(&mut self, key: Option<RecordKey>) -> RecordKey {
        match key {
            Some(key) => {
                if key >= self.next_key {
                    self.next_key = key.next();
                }
                key
            }
            None => {
                let key = self.next_key;
                self.next_key = key.next();
                key
            }
        }
    }

    /// Rejects structural writes while protection is enabled.
    fn check_protection(&self, key: RecordKey, record: &StoredRecord) -> StoreResult<()> {
        if !self.protection {
            return Ok(());
        }
        let (parent, depth, left, right) = match self.records.get(&key) {
            Some(existing) => (existing.parent, existing.depth, existing.left, existing.right),
            // A record never saved before may only carry default structure.
            None => (None, 0, 0, 0),
        };
        if record.parent != parent {
            return Err(StoreError::Protected { field: "parent" });
        }
        if record.depth != depth {
            return Err(StoreError::Protected { field: "depth" });
        }
        if record.left != left {
            return Err(StoreError::Protected { field: "left" });
        }
        if record.right != right {
            return Err(StoreError::Protected { field: "right" });
        }
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    fn find(&self, key: RecordKey) -> StoreResult<Option<StoredRecord>> {
        Ok(self.inner.read().records.get(&key).cloned())
    }

    fn locate_or_instantiate(&self, key: Option<RecordKey>) -> StoreResult<StoredRecord> {
        let inner = self.inner.read();
        match key.and_then(|k| inner.records.get(&k)) {
            Some(existing) => Ok(existing.clone()),
            None => Ok(StoredRecord::new(key)),
        }
    }

    fn save(&mut self, record: &mut StoredRecord) -> StoreResult<RecordKey> {
        let mut inner = self.inner.write();
        let key = inner.allocate(record.key);
        inner.check_protection(key, record)?;
        record.key = Some(key);
        inner.records.insert(key, record.clone());
        Ok(key)
    }

    fn delete_where(
        &mut self,
        scope: &ScopeQuery,
        except: &BTreeSet<RecordKey>,
    ) -> StoreResult<usize> {
        let mut inner = self.inner.write();
        let before = inner.records.len();
        inner
            .records
            .retain(|key, record| except.contains(key) || !scope.matches(record));
        Ok(before - inner.records.len())
    }

    fn scan_all(&self) -> StoreResult<Vec<StoredRecord>> {
        Ok(self.inner.read().records.values().cloned().collect())
    }

    fn begin(&mut self) -> StoreResult<()> {
        let mut inner = self.inner.write();
        let snapshot = Snapshot {
            records: inner.records.clone(),
            next_key: inner.next_key,
        };
        inner.savepoints.push(snapshot);
        Ok(())
    }

    fn commit(&mut self) -> StoreResult<()> {
        self.inner
            .write()
            .savepoints
            .pop()
            .map(|_| ())
            .ok_or(StoreError::NoActiveTransaction)
    }

    fn rollback(&mut self) -> StoreResult<()> {
        let mut inner = self.inner.write();
        let snapshot = inner
            .savepoints
            .pop()
            .ok_or(StoreError::NoActiveTransaction)?;
        inner.records = snapshot.records;
        inner.next_key = snapshot.next_key;
        Ok(())
    }

    fn disable_protection(&mut self) {
        self.inner.write().protection = false;
    }

    fn enable_protection(&mut self) {
        self.inner.write().protection = true;
    }
}
