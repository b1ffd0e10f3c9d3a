//! Scoped suspension of structural-field write protection.

use nestsync_store::RecordStore;
use std::ops::{Deref, DerefMut};

/// Suspends a store's write protection for the guard's lifetime.
///
/// Protection is re-enabled in `Drop`, so it is restored on every exit
/// path, including early returns and panics. When constructed with
/// `suspend = false` the guard is inert and the store's protection state
/// is left alone.
///
/// The guard dereferences to the store, so a suspended pass runs its
/// store operations straight through it:
///
/// ```rust
/// use nestsync_core::ProtectionGuard;
/// use nestsync_store::{MemoryStore, RecordStore, StoredRecord};
///
/// let mut store = MemoryStore::new();
/// {
///     let mut guard = ProtectionGuard::suspend(&mut store, true);
///     let mut rec = StoredRecord::new(None);
///     rec.depth = 1;
///     guard.save(&mut rec).unwrap();
/// }
/// assert!(store.protection_enabled());
/// ```
pub struct ProtectionGuard<'a, S: RecordStore> {
    store: &'a mut S,
    engaged: bool,
}

impl<'a, S: RecordStore> ProtectionGuard<'a, S> {
    /// Wraps `store`, disabling protection when `suspend` is true.
    pub fn suspend(store: &'a mut S, suspend: bool) -> Self {
        if suspend {
            store.disable_protection();
        }
        Self {
            store,
            engaged: suspend,
        }
    }
}

impl<S: RecordStore> Deref for ProtectionGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.store
    }
}

impl<S: RecordStore> DerefMut for ProtectionGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.store
    }
}

impl<S: RecordStore> Drop for ProtectionGuard<'_, S> {
    fn drop(&mut self) {
        if self.engaged {
            self.store.enable_protection();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nestsync_store::MemoryStore;

    #[test]
    fn restores_protection_on_drop() {
        let mut store = MemoryStore::new();
        {
            let guard = ProtectionGuard::suspend(&mut store, true);
            assert!(!guard.protection_enabled());
        }
        assert!(store.protection_enabled());
    }

    #[test]
    fn inert_when_not_suspending() {
        let mut store = MemoryStore::new();
        store.disable_protection();
        {
            let guard = ProtectionGuard::suspend(&mut store, false);
            assert!(!guard.protection_enabled());
        }
        // Guard never touched the flag, so it stays as the caller left it.
        assert!(!store.protection_enabled());
    }

    #[test]
    fn restores_on_early_return() {
        fn failing(store: &mut MemoryStore) -> Result<(), ()> {
            let _guard = ProtectionGuard::suspend(store, true);
            Err(())
        }

        let mut store = MemoryStore::new();
        assert!(failing(&mut store).is_err());
        assert!(store.protection_enabled());
    }
}
