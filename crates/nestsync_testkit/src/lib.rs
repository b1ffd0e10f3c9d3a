//! # nestsync testkit
//!
//! Test utilities for nestsync.
//!
//! This crate provides:
//! - Canned forests and pre-populated stores
//! - Property-based generators for random input forests
//! - A fault-injecting store wrapper for abort-path tests
//! - Nested-set invariant assertions
//!
//! ## Usage
//!
//! ```rust
//! use nestsync_testkit::prelude::*;
//!
//! with_mapper(|mapper| {
//!     mapper.map(&department_forest()).unwrap();
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod faults;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::faults::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use faults::*;
pub use fixtures::*;
pub use generators::*;
