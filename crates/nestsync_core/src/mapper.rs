//! Tree synchronizers: reconcile a record store against an input forest.

use crate::config::MapperConfig;
use crate::error::{CoreError, CoreResult};
use crate::flatten::flatten;
use crate::guard::ProtectionGuard;
use crate::node::Node;
use nestsync_store::{RecordKey, RecordStore, StoredRecord};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Materializes input forests into a record store.
///
/// The mapper owns its store and exposes two synchronization strategies:
///
/// - [`TreeMapper::map`] walks the nested input, creates or updates a
///   record per node, prunes records that disappeared from the input and
///   rebuilds nested-set bounds - all inside one store transaction.
/// - [`TreeMapper::update_map`] flattens the input first and overwrites
///   bounds, depth, parent and attributes of existing records by key. It
///   never creates and never deletes.
///
/// The unwrapped building blocks ([`TreeMapper::map_tree`],
/// [`TreeMapper::rebalance`]) are public for callers that compose their
/// own transaction scope; those callers also manage write protection
/// themselves.
pub struct TreeMapper<S: RecordStore> {
    store: S,
    config: MapperConfig,
}

impl<S: RecordStore> TreeMapper<S> {
    /// Creates a mapper with the default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, MapperConfig::default())
    }

    /// Creates a mapper with an explicit configuration.
    pub fn with_config(store: S, config: MapperConfig) -> Self {
        Self { store, config }
    }

    /// Returns the mapper configuration.
    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the underlying store mutably.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consumes the mapper, returning the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Reconciles the whole store against `nodes`.
    ///
    /// Runs create/update synchronization, prunes records absent from the
    /// input and rebuilds bounds, all inside one transaction with write
    /// protection suspended (per the configuration). On error every write
    /// of the pass is rolled back.
    ///
    /// # Errors
    ///
    /// Any store failure aborts the pass; prune and rebalance failures
    /// propagate as well.
    pub fn map(&mut self, nodes: &[Node]) -> CoreResult<()> {
        self.map_scoped(nodes, None)
    }

    /// Like [`TreeMapper::map`], scoped under an existing record.
    ///
    /// Top-level input nodes become children of `scope`, and pruning is
    /// limited to the descendants of the scope record when it exists in
    /// storage (otherwise the whole store is in scope).
    ///
    /// # Errors
    ///
    /// Same conditions as [`TreeMapper::map`].
    pub fn map_scoped(&mut self, nodes: &[Node], scope: Option<RecordKey>) -> CoreResult<()> {
        self.atomic(|store| {
            map_tree(store, nodes, scope)?;
            rebalance(store)?;
            Ok(())
        })
    }

    /// Overwrites existing records from the flattened input.
    ///
    /// Every input node must carry an identity key that matches a stored
    /// record; nothing is created and nothing is pruned. The pass runs in
    /// one transaction, so a mid-pass failure leaves no partial writes
    /// behind.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingIdentity`] for a keyless node,
    /// [`CoreError::RecordNotFound`] for a key with no stored record, or
    /// the store's own error; processing stops at the first failure.
    pub fn update_map(&mut self, nodes: &[Node]) -> CoreResult<()> {
        self.atomic(|store| update_tree(store, nodes))
    }

    /// Unwrapped create/update synchronization.
    ///
    /// No transaction is opened and write protection is left alone; the
    /// caller composes both. Bounds are not touched - run
    /// [`TreeMapper::rebalance`] afterwards to rebuild them.
    ///
    /// # Errors
    ///
    /// Any store failure aborts the pass immediately.
    pub fn map_tree(&mut self, nodes: &[Node], scope: Option<RecordKey>) -> CoreResult<()> {
        map_tree(&mut self.store, nodes, scope)
    }

    /// Unwrapped bound rebuild over the whole store.
    ///
    /// Returns the number of records whose structural fields changed.
    /// The caller composes transactions and write protection.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails while scanning or saving.
    pub fn rebalance(&mut self) -> CoreResult<usize> {
        rebalance(&mut self.store)
    }

    /// Runs `body` inside a transaction with protection suspended.
    fn atomic<T, F>(&mut self, body: F) -> CoreResult<T>
    where
        F: FnOnce(&mut S) -> CoreResult<T>,
    {
        let mut guard = ProtectionGuard::suspend(&mut self.store, self.config.suspend_protection);
        guard.begin()?;
        match body(&mut *guard) {
            Ok(value) => {
                guard.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = guard.rollback() {
                    warn!(error = %rollback_err, "rollback failed after aborted pass");
                }
                Err(err)
            }
        }
    }
}

/// Create/update synchronization over the nested input.
fn map_tree<S: RecordStore>(
    store: &mut S,
    nodes: &[Node],
    scope: Option<RecordKey>,
) -> CoreResult<()> {
    debug!(roots = nodes.len(), "materializing forest");
    let mut affected = BTreeSet::new();
    sync_level(store, nodes, scope, &mut affected)?;

    if affected.is_empty() {
        return Ok(());
    }

    let scope_query = match scope.map(|key| store.find(key)).transpose()?.flatten() {
        Some(record) => store.descendants_of(&record),
        None => store.entire_forest(),
    };
    let pruned = store.delete_where(&scope_query, &affected)?;
    if pruned > 0 {
        debug!(pruned, "pruned records absent from the input");
    }
    Ok(())
}

/// One level of the nested walk; recurses into children.
fn sync_level<S: RecordStore>(
    store: &mut S,
    nodes: &[Node],
    parent: Option<RecordKey>,
    affected: &mut BTreeSet<RecordKey>,
) -> CoreResult<()> {
    for node in nodes {
        let mut record = store.locate_or_instantiate(node.key())?;
        for (name, value) in node.attributes() {
            record.attributes.insert(name.clone(), value.clone());
        }
        record.parent = parent;
        let key = store.save(&mut record)?;
        affected.insert(key);

        if !node.children().is_empty() {
            sync_level(store, node.children(), Some(key), affected)?;
        }
    }
    Ok(())
}

/// Update-only synchronization over the flattened input.
fn update_tree<S: RecordStore>(store: &mut S, nodes: &[Node]) -> CoreResult<()> {
    let flat = flatten(nodes);
    debug!(count = flat.len(), "overwriting flattened records");
    for (position, tuple) in flat.into_iter().enumerate() {
        let key = tuple.key.ok_or(CoreError::MissingIdentity { position })?;
        let mut record = store
            .find(key)?
            .ok_or(CoreError::RecordNotFound { key })?;
        record.parent = tuple.parent;
        record.depth = tuple.depth;
        record.left = tuple.left;
        record.right = tuple.right;
        for (name, value) in tuple.attributes {
            record.attributes.insert(name, value);
        }
        store.save(&mut record)?;
    }
    Ok(())
}

/// Rebuilds depth and bounds for every record reachable from a root.
///
/// Roots and siblings are ordered by ascending key. Records whose parent
/// key is not present in the store are treated as roots; records caught
/// in a parent cycle are unreachable and left untouched.
fn rebalance<S: RecordStore>(store: &mut S) -> CoreResult<usize> {
    let records = store.scan_all()?;
    let total = records.len();
    let keys: BTreeSet<RecordKey> = records.iter().filter_map(|r| r.key).collect();

    let mut children: BTreeMap<Option<RecordKey>, Vec<StoredRecord>> = BTreeMap::new();
    for record in records {
        let slot = record.parent.filter(|parent| keys.contains(parent));
        children.entry(slot).or_default().push(record);
    }

    let mut bound = 0;
    let mut rewritten = 0;
    let mut visited = 0;
    assign_level(
        store,
        &mut children,
        None,
        0,
        &mut bound,
        &mut rewritten,
        &mut visited,
    )?;

    if visited < total {
        warn!(
            skipped = total - visited,
            "records unreachable from any root were left untouched"
        );
    }
    if rewritten > 0 {
        debug!(rewritten, "rebalanced nested-set bounds");
    }
    Ok(rewritten)
}

fn assign_level<S: RecordStore>(
    store: &mut S,
    children: &mut BTreeMap<Option<RecordKey>, Vec<StoredRecord>>,
    parent: Option<RecordKey>,
    depth: u32,
    bound: &mut u64,
    rewritten: &mut usize,
    visited: &mut usize,
) -> CoreResult<()> {
    let Some(level) = children.remove(&parent) else {
        return Ok(());
    };
    for mut record in level {
        *visited += 1;
        *bound += 1;
        let left = *bound;
        assign_level(
            store,
            children,
            record.key,
            depth + 1,
            bound,
            rewritten,
            visited,
        )?;
        *bound += 1;
        let right = *bound;

        if record.depth != depth || record.left != left || record.right != right {
            record.depth = depth;
            record.left = left;
            record.right = right;
            store.save(&mut record)?;
            *rewritten += 1;
        }
    }
    Ok(())
}
