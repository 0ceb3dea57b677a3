//! Core filehub types and traits.
//!
//! This crate defines the storage contract shared by all filehub crates:
//! the [`ObjectStore`] trait (a flat key-value blob store consumed through
//! list-by-prefix, put, get and delete, plus an optional server-side move)
//! and the [`StoreError`] type that backends map their failures into.
//!
//! The store is deliberately minimal. It has no notion of directories; the
//! folder semantics live entirely in `filehub_vfs`, which builds them out
//! of key prefixes and marker objects on top of this trait.

pub mod store;

// Test utilities (behind feature flag)
#[cfg(feature = "testutil")]
pub mod testutil;

pub use store::{ObjectEntry, ObjectStore, StoreError, StoreFeatures, StoreResult};
