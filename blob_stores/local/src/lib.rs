use anyhow::anyhow;
use bytes::Bytes;
use filehub_core::store::{ObjectEntry, StoreError, StoreFeatures, StoreResult};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct LocalStoreConfig {
    pub base_path: String,
}

/// Object store backed by a directory tree.
///
/// Keys map directly to relative paths below `base_path`. Directories are
/// purely an artifact of key segments; empty ones are pruned on delete so
/// they never show up as phantom prefix entries in listings.
#[derive(Debug, Clone)]
pub struct LocalStore {
    base_path: PathBuf,
}

impl LocalStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        LocalStore {
            base_path: base_path.into(),
        }
    }

    pub fn create(config: LocalStoreConfig) -> Self {
        LocalStore {
            base_path: config.base_path.into(),
        }
    }

    fn resolve_key(&self, key: &str) -> StoreResult<PathBuf> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') {
            return Err(StoreError::Other(anyhow!(
                "invalid key: '{}'. Must be a relative path without '..'.",
                key
            )));
        }
        Ok(self.base_path.join(key))
    }

    /// Removes now-empty ancestor directories after a delete or move, up to
    /// (but not including) the base path. `remove_dir` refuses non-empty
    /// directories, which is where the walk stops.
    async fn prune_empty_dirs(&self, start: &Path) {
        let mut dir = start.to_path_buf();
        while dir.starts_with(&self.base_path) && dir != self.base_path {
            if tokio::fs::remove_dir(&dir).await.is_err() {
                break;
            }
            if !dir.pop() {
                break;
            }
        }
    }
}

#[async_trait::async_trait]
impl filehub_core::store::ObjectStore for LocalStore {
    fn features(&self) -> StoreFeatures {
        StoreFeatures {
            supports_move: true,
        }
    }

    /// Lists one directory level below `prefix`: files become file entries
    /// with their size, subdirectories become prefix entries.
    async fn list(&self, prefix: &str, limit: usize) -> StoreResult<Vec<ObjectEntry>> {
        let dir = match prefix.trim_end_matches('/') {
            "" => self.base_path.clone(),
            p => self.resolve_key(p)?,
        };

        let mut read_dir = match tokio::fs::read_dir(&dir).await {
            Ok(rd) => rd,
            // A prefix with no objects below it is an empty listing, not an error.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        while let Some(dir_entry) = read_dir.next_entry().await? {
            let name = dir_entry.file_name().to_string_lossy().into_owned();
            let meta = dir_entry.metadata().await?;
            let size = if meta.is_dir() {
                None
            } else {
                Some(meta.len())
            };
            entries.push(ObjectEntry { name, size });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries.truncate(limit);
        Ok(entries)
    }

    async fn put(&self, key: &str, bytes: Bytes) -> StoreResult<()> {
        let full_path = self.resolve_key(key)?;
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full_path, &bytes).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Bytes> {
        let full_path = self.resolve_key(key)?;
        let data = tokio::fs::read(&full_path).await?;
        Ok(Bytes::from(data))
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let full_path = self.resolve_key(key)?;
        tokio::fs::remove_file(&full_path).await?;
        if let Some(parent) = full_path.parent() {
            self.prune_empty_dirs(parent).await;
        }
        Ok(())
    }

    async fn move_object(&self, src_key: &str, dst_key: &str) -> StoreResult<()> {
        let src_path = self.resolve_key(src_key)?;
        let dst_path = self.resolve_key(dst_key)?;

        if let Some(parent) = dst_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::rename(&src_path, &dst_path).await?;
        if let Some(parent) = src_path.parent() {
            self.prune_empty_dirs(parent).await;
        }
        Ok(())
    }
}
