//! # nestsync store
//!
//! Record store trait and reference backend for nestsync.
//!
//! This crate defines the persistence contract the synchronizers in
//! `nestsync_core` are written against. Stores hold flat nested-set
//! records - the tree shape lives in each record's `parent`, `left`,
//! `right` and `depth` fields, never in the store's own structure.
//!
//! ## Design Principles
//!
//! - Stores are dumb containers: find, save, scoped delete, scan
//! - All tree arithmetic happens in `nestsync_core`
//! - Transactions nest like savepoints and are the only atomicity primitive
//! - Structural fields are write-protected by default; synchronizers
//!   suspend protection for the duration of a pass
//!
//! ## Available Backends
//!
//! - [`MemoryStore`] - for tests and ephemeral trees
//!
//! ## Example
//!
//! ```rust
//! use nestsync_store::{MemoryStore, RecordStore, StoredRecord};
//!
//! let mut store = MemoryStore::new();
//! let mut record = StoredRecord::new(None);
//! record.attributes.insert("name".into(), "root".into());
//! let key = store.save(&mut record).unwrap();
//! assert_eq!(store.find(key).unwrap(), Some(record));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod memory;
mod record;

pub use backend::{RecordStore, ScopeQuery};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use record::{AttrMap, RecordKey, StoredRecord};
