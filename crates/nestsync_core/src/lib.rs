//! # nestsync core
//!
//! Nested-set tree flattening and store reconciliation.
//!
//! This crate provides:
//! - A pure bound flattener that linearizes a nested forest into
//!   preorder nested-set tuples
//! - A create/update synchronizer that reconciles a record store
//!   against an input forest, pruning records that disappeared
//! - An update-only synchronizer that overwrites existing records from
//!   the flattened form without creating or deleting
//! - A transaction scope that suspends structural write protection and
//!   delegates atomicity to the store
//!
//! ## Key Invariants
//!
//! - One bound counter per pass: bounds are unique across the whole
//!   forest and preorder visits ascending left bounds
//! - A leaf satisfies `right == left + 1`
//! - A wrapped pass either commits completely or leaves the store as it
//!   found it
//! - Re-running a pass with the same input converges to the same state
//!
//! ## Example
//!
//! ```rust
//! use nestsync_core::{Node, TreeMapper};
//! use nestsync_store::{MemoryStore, RecordKey, RecordStore};
//!
//! let mut mapper = TreeMapper::new(MemoryStore::new());
//! mapper
//!     .map(&[Node::with_key(1)
//!         .attr("name", "root")
//!         .child(Node::with_key(2).attr("name", "child"))])
//!     .unwrap();
//!
//! let child = mapper.store().find(RecordKey::new(2)).unwrap().unwrap();
//! assert_eq!(child.parent, Some(RecordKey::new(1)));
//! assert_eq!((child.left, child.right), (2, 3));
//! ```
//!
//! ## Caller Contract
//!
//! Input is a rooted forest: one parent per node, no cycles, shape
//! defined entirely by the nesting. Synchronization passes against
//! overlapping scopes must be serialized by the caller; the mapper
//! performs no locking of its own and does not support cancellation
//! mid-pass.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod flatten;
mod guard;
mod mapper;
mod node;

pub use config::MapperConfig;
pub use error::{CoreError, CoreResult};
pub use flatten::{flatten, FlatRecord};
pub use guard::ProtectionGuard;
pub use mapper::TreeMapper;
pub use node::Node;
