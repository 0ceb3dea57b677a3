use bytes::Bytes;
use dashmap::DashMap;
use filehub_core::store::{ObjectEntry, StoreError, StoreFeatures, StoreResult};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: DashMap<String, Bytes>,
}

impl MemoryStore {
    /// Creates a new, empty `MemoryStore`.
    pub fn new() -> Self {
        Self {
            objects: DashMap::new(),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait::async_trait]
impl filehub_core::store::ObjectStore for MemoryStore {
    fn features(&self) -> StoreFeatures {
        StoreFeatures {
            supports_move: true,
        }
    }

    /// Lists the immediate children of `prefix`.
    ///
    /// Keys directly under the prefix become file entries; deeper keys are
    /// collapsed into one prefix entry per next segment. A segment that is
    /// both an object and a prefix lists as a prefix entry.
    async fn list(&self, prefix: &str, limit: usize) -> StoreResult<Vec<ObjectEntry>> {
        let scope = match prefix.trim_end_matches('/') {
            "" => String::new(),
            p => format!("{p}/"),
        };

        // BTreeMap keeps listings sorted and deterministic.
        let mut children: BTreeMap<String, Option<u64>> = BTreeMap::new();
        for entry in self.objects.iter() {
            let Some(rest) = entry.key().strip_prefix(&scope) else {
                continue;
            };
            match rest.split_once('/') {
                Some((segment, _)) => {
                    children.insert(segment.to_string(), None);
                }
                None => {
                    children
                        .entry(rest.to_string())
                        .or_insert(Some(entry.value().len() as u64));
                }
            }
        }

        Ok(children
            .into_iter()
            .take(limit)
            .map(|(name, size)| ObjectEntry { name, size })
            .collect())
    }

    /// Stores a `Bytes` object at the given key.
    async fn put(&self, key: &str, bytes: Bytes) -> StoreResult<()> {
        self.objects.insert(key.to_string(), bytes);
        Ok(())
    }

    /// Returns the bytes of the object at the given key.
    async fn get(&self, key: &str) -> StoreResult<Bytes> {
        let object = self.objects.get(key).ok_or(StoreError::NotFound)?;
        Ok(object.clone())
    }

    /// Deletes the object at the given key.
    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.objects.remove(key).ok_or(StoreError::NotFound)?;
        Ok(())
    }

    /// Renames an object from an old key to a new key.
    async fn move_object(&self, src_key: &str, dst_key: &str) -> StoreResult<()> {
        if src_key == dst_key {
            return Ok(());
        }
        let (_key, value) = self.objects.remove(src_key).ok_or(StoreError::NotFound)?;
        self.objects.insert(dst_key.to_string(), value);
        Ok(())
    }
}
