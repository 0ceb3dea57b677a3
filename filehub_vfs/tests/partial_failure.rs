//! Partial-failure and non-atomic-move behavior.
//!
//! Uses a wrapping store that injects one-shot failures on chosen keys, so
//! a retry of the same operation sees a healthy backend and must converge.

use std::collections::HashSet;
use std::sync::Mutex;

use anyhow::anyhow;
use bytes::Bytes;
use filehub_core::store::{ObjectEntry, ObjectStore, StoreError, StoreFeatures, StoreResult};
use filehub_store_memory::MemoryStore;
use filehub_vfs::{FolderEngine, SelectedFile, VfsError};

/// Memory store wrapper that fails a primitive once per registered key.
#[derive(Debug, Default)]
struct FlakyStore {
    inner: MemoryStore,
    supports_move: bool,
    fail_put: Mutex<HashSet<String>>,
    fail_get: Mutex<HashSet<String>>,
    fail_delete: Mutex<HashSet<String>>,
}

impl FlakyStore {
    fn new() -> Self {
        Self::default()
    }

    fn fail_put_once(&self, key: &str) {
        self.fail_put.lock().unwrap().insert(key.to_string());
    }

    fn fail_get_once(&self, key: &str) {
        self.fail_get.lock().unwrap().insert(key.to_string());
    }

    fn fail_delete_once(&self, key: &str) {
        self.fail_delete.lock().unwrap().insert(key.to_string());
    }

    fn take(set: &Mutex<HashSet<String>>, key: &str) -> bool {
        set.lock().unwrap().remove(key)
    }
}

#[async_trait::async_trait]
impl ObjectStore for FlakyStore {
    fn features(&self) -> StoreFeatures {
        StoreFeatures {
            supports_move: self.supports_move,
        }
    }

    async fn list(&self, prefix: &str, limit: usize) -> StoreResult<Vec<ObjectEntry>> {
        self.inner.list(prefix, limit).await
    }

    async fn put(&self, key: &str, bytes: Bytes) -> StoreResult<()> {
        if Self::take(&self.fail_put, key) {
            return Err(StoreError::Other(anyhow!("injected put failure for {key}")));
        }
        self.inner.put(key, bytes).await
    }

    async fn get(&self, key: &str) -> StoreResult<Bytes> {
        if Self::take(&self.fail_get, key) {
            return Err(StoreError::Other(anyhow!("injected get failure for {key}")));
        }
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        if Self::take(&self.fail_delete, key) {
            return Err(StoreError::Other(anyhow!(
                "injected delete failure for {key}"
            )));
        }
        self.inner.delete(key).await
    }
}

async fn folder_with_files(engine: &FolderEngine, folder: &str, names: &[&str]) {
    engine.create_folder(folder).await.unwrap();
    let files = names
        .iter()
        .map(|n| SelectedFile::new(*n, &b"content"[..]))
        .collect();
    engine.upload_files(files, Some(folder)).await.unwrap();
}

#[tokio::test]
async fn delete_folder_reports_partial_failure_and_retry_converges() {
    let store = FlakyStore::new();
    store.fail_delete_once("folders/x/f2.txt");
    let engine = FolderEngine::new(store);

    folder_with_files(&engine, "x", &["f1.txt", "f2.txt", "f3.txt"]).await;

    let err = engine.delete_folder("x").await.unwrap_err();
    match err {
        VfsError::PartialFailure {
            operation,
            completed,
            failed_key,
            remaining,
            ..
        } => {
            assert_eq!(operation, "delete_folder");
            assert_eq!(completed, vec!["folders/x/f1.txt".to_string()]);
            assert_eq!(failed_key, "folders/x/f2.txt");
            // Everything after the failing key, marker last.
            assert_eq!(
                remaining,
                vec![
                    "folders/x/f3.txt".to_string(),
                    "folders/x/placeholder.txt".to_string(),
                ]
            );
        }
        other => panic!("expected PartialFailure, got {other:?}"),
    }

    // The folder still exists (marker intact), so the failure is recoverable.
    let root = engine.list_root().await.unwrap();
    assert_eq!(root.folders, vec!["x".to_string()]);

    // Retry completes with the remaining members and the marker.
    let deleted = engine.delete_folder("x").await.unwrap();
    assert_eq!(deleted.last().unwrap(), "folders/x/placeholder.txt");

    let root = engine.list_root().await.unwrap();
    assert!(root.folders.is_empty());
    assert!(engine.list_folder("x").await.unwrap().is_empty());
}

#[tokio::test]
async fn batch_upload_aborts_on_first_failure() {
    let store = FlakyStore::new();
    store.fail_put_once("files/b.txt");
    let engine = FolderEngine::new(store);

    let batch = vec![
        SelectedFile::new("a.txt", &b"a"[..]),
        SelectedFile::new("b.txt", &b"b"[..]),
        SelectedFile::new("c.txt", &b"c"[..]),
    ];
    let err = engine.upload_files(batch, None).await.unwrap_err();
    match err {
        VfsError::PartialFailure {
            operation,
            completed,
            failed_key,
            remaining,
            ..
        } => {
            assert_eq!(operation, "upload_files");
            assert_eq!(completed, vec!["files/a.txt".to_string()]);
            assert_eq!(failed_key, "files/b.txt");
            assert_eq!(remaining, vec!["files/c.txt".to_string()]);
        }
        other => panic!("expected PartialFailure, got {other:?}"),
    }

    // No rollback of a.txt, and c.txt was never attempted.
    let root = engine.list_root().await.unwrap();
    let names: Vec<&str> = root.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.txt"]);
}

#[tokio::test]
async fn fallback_move_works_without_backend_support() {
    // supports_move is false, so the engine must copy then delete.
    let engine = FolderEngine::new(FlakyStore::new());

    engine.create_folder("docs").await.unwrap();
    engine
        .upload_files(vec![SelectedFile::new("report.txt", &b"r"[..])], None)
        .await
        .unwrap();

    let moved = engine
        .move_file_into_folder("report.txt", "docs")
        .await
        .unwrap();
    assert_eq!(moved.dest_key, "folders/docs/report.txt");

    let root = engine.list_root().await.unwrap();
    assert!(root.files.is_empty());
    let files = engine.list_folder("docs").await.unwrap();
    assert!(files.iter().any(|f| f.name == "report.txt"));
}

#[tokio::test]
async fn fallback_move_with_failed_delete_reports_duplicate() {
    let store = FlakyStore::new();
    store.fail_delete_once("files/report.txt");
    let engine = FolderEngine::new(store);

    engine.create_folder("docs").await.unwrap();
    engine
        .upload_files(vec![SelectedFile::new("report.txt", &b"r"[..])], None)
        .await
        .unwrap();

    let err = engine
        .move_file_into_folder("report.txt", "docs")
        .await
        .unwrap_err();
    match err {
        VfsError::DuplicateAfterMove {
            source_key,
            dest_key,
            ..
        } => {
            assert_eq!(source_key, "files/report.txt");
            assert_eq!(dest_key, "folders/docs/report.txt");
        }
        other => panic!("expected DuplicateAfterMove, got {other:?}"),
    }

    // The duplicate state is visible, not hidden: both listings carry the file.
    let root = engine.list_root().await.unwrap();
    assert!(root.files.iter().any(|f| f.name == "report.txt"));
    let files = engine.list_folder("docs").await.unwrap();
    assert!(files.iter().any(|f| f.name == "report.txt"));
}

#[tokio::test]
async fn archive_skips_unreadable_entries_and_reports_them() {
    let store = FlakyStore::new();
    store.fail_get_once("folders/x/broken.txt");
    let engine = FolderEngine::new(store);

    folder_with_files(&engine, "x", &["a.txt", "broken.txt", "z.txt"]).await;

    let archive = engine.download_folder_archive("x").await.unwrap();
    assert!(!archive.is_complete());
    assert_eq!(archive.entries, vec!["a.txt".to_string(), "z.txt".to_string()]);
    assert_eq!(archive.skipped, vec!["broken.txt".to_string()]);

    // Listing minus marker minus skipped equals the archive's entry set.
    let listed = engine.list_folder("x").await.unwrap();
    assert_eq!(listed.len() - archive.skipped.len(), archive.entries.len());
}
