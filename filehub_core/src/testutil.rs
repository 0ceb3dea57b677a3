//! Test utilities for `ObjectStore` implementations.
//!
//! This module provides a conformance suite that can be run against any
//! `ObjectStore` implementation to verify the trait contract, in particular
//! the prefix-listing semantics the virtual folder layer depends on.
//!
//! # Usage
//!
//! In your store crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! filehub_core = { workspace = true, features = ["testutil"] }
//! ```
//!
//! In your test file:
//!
//! ```ignore
//! use filehub_core::testutil::StoreTests;
//!
//! #[tokio::test]
//! async fn test_my_store() {
//!     let store = MyStore::new(...);
//!     StoreTests::new(&store).run_all().await.unwrap();
//! }
//! ```

use crate::store::{ObjectStore, StoreError, StoreResult};
use bytes::Bytes;
use rand::Rng;

/// Conformance suite for `ObjectStore` implementations.
pub struct StoreTests<'a, S> {
    store: &'a S,
    /// Prefix for test objects to avoid conflicts
    prefix: String,
}

impl<'a, S: ObjectStore> StoreTests<'a, S> {
    /// Create a new test suite for the given store.
    pub fn new(store: &'a S) -> Self {
        let prefix = format!("_test_{}", rand::rng().random::<u32>());
        Self { store, prefix }
    }

    /// Create a new test suite with a custom prefix.
    pub fn with_prefix(store: &'a S, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    fn key(&self, name: &str) -> String {
        format!("{}/{}", self.prefix, name)
    }

    /// Run all tests. Each test cleans up the objects it created.
    pub async fn run_all(&self) -> StoreResult<()> {
        self.test_put_get().await?;
        self.test_overwrite().await?;
        self.test_delete().await?;
        self.test_not_found().await?;
        self.test_list_children().await?;
        self.test_list_limit().await?;

        if self.store.features().supports_move {
            self.test_move().await?;
        }

        Ok(())
    }

    /// Basic put and get round-trip.
    pub async fn test_put_get(&self) -> StoreResult<()> {
        let key = self.key("roundtrip.bin");
        let data = Bytes::from_static(b"hello, world!");

        self.store.put(&key, data.clone()).await?;

        let retrieved = self.store.get(&key).await?;
        assert_eq!(retrieved, data, "retrieved data should match original");

        self.store.delete(&key).await?;
        Ok(())
    }

    /// Putting twice at the same key replaces the object.
    pub async fn test_overwrite(&self) -> StoreResult<()> {
        let key = self.key("overwrite.bin");

        self.store
            .put(&key, Bytes::from_static(b"original content"))
            .await?;
        self.store
            .put(&key, Bytes::from_static(b"new content"))
            .await?;

        let retrieved = self.store.get(&key).await?;
        assert_eq!(
            retrieved.as_ref(),
            b"new content",
            "overwritten content should be new"
        );

        self.store.delete(&key).await?;
        Ok(())
    }

    /// Deleted objects are gone from both get and list.
    pub async fn test_delete(&self) -> StoreResult<()> {
        let key = self.key("delete.bin");

        self.store
            .put(&key, Bytes::from_static(b"to be deleted"))
            .await?;
        self.store.delete(&key).await?;

        let err = self.store.get(&key).await.unwrap_err();
        assert!(err.is_not_found(), "get after delete should be NotFound");

        let entries = self.store.list(&self.prefix, 100).await?;
        assert!(
            !entries.iter().any(|e| e.name == "delete.bin"),
            "list should not contain a deleted object"
        );
        Ok(())
    }

    /// Absent keys are NotFound for get and delete alike.
    pub async fn test_not_found(&self) -> StoreResult<()> {
        let key = self.key("never_written.bin");

        let err = self.store.get(&key).await.unwrap_err();
        assert!(err.is_not_found(), "get of absent key should be NotFound");

        let err = self.store.delete(&key).await.unwrap_err();
        assert!(err.is_not_found(), "delete of absent key should be NotFound");
        Ok(())
    }

    /// Listing returns direct objects as file entries and deeper keys as
    /// one prefix entry per distinct next segment.
    pub async fn test_list_children(&self) -> StoreResult<()> {
        let keys = [
            self.key("list/a.bin"),
            self.key("list/b.bin"),
            self.key("list/sub/c.bin"),
            self.key("list/sub/d.bin"),
        ];
        for key in &keys {
            self.store.put(key, Bytes::from_static(b"list test")).await?;
        }

        let prefix = self.key("list");
        let entries = self.store.list(&prefix, 100).await?;

        let a = entries
            .iter()
            .find(|e| e.name == "a.bin")
            .expect("list should contain a.bin");
        assert_eq!(a.size, Some(9), "file entry should carry its size");

        let sub = entries
            .iter()
            .find(|e| e.name == "sub")
            .expect("list should collapse deeper keys into a prefix entry");
        assert!(sub.is_prefix(), "sub should be a prefix entry");
        assert_eq!(
            entries.iter().filter(|e| e.name == "sub").count(),
            1,
            "prefix entries should be deduplicated"
        );
        assert!(
            entries.iter().all(|e| !e.name.contains('/')),
            "entry names should be single segments"
        );

        for key in &keys {
            self.store.delete(key).await?;
        }
        Ok(())
    }

    /// The limit caps the number of returned entries.
    pub async fn test_list_limit(&self) -> StoreResult<()> {
        let keys: Vec<String> = (0..5).map(|i| self.key(&format!("limit/f{i}.bin"))).collect();
        for key in &keys {
            self.store.put(key, Bytes::from_static(b"x")).await?;
        }

        let prefix = self.key("limit");
        let entries = self.store.list(&prefix, 3).await?;
        assert_eq!(entries.len(), 3, "list should honor the limit");

        for key in &keys {
            self.store.delete(key).await?;
        }
        Ok(())
    }

    /// Move relocates content and removes the source (only run if supported).
    pub async fn test_move(&self) -> StoreResult<()> {
        let old_key = self.key("move_old.bin");
        let new_key = self.key("move_new.bin");

        self.store
            .put(&old_key, Bytes::from_static(b"move me"))
            .await?;
        self.store.move_object(&old_key, &new_key).await?;

        match self.store.get(&old_key).await {
            Err(StoreError::NotFound) => {}
            other => panic!("old key should be NotFound after move, got {other:?}"),
        }
        let content = self.store.get(&new_key).await?;
        assert_eq!(
            content.as_ref(),
            b"move me",
            "content should be preserved after move"
        );

        self.store.delete(&new_key).await?;
        Ok(())
    }
}

/// Generate random bytes for testing.
pub fn random_bytes(len: usize) -> Bytes {
    let mut data = vec![0u8; len];
    rand::rng().fill(&mut data[..]);
    Bytes::from(data)
}
