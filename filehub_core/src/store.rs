use async_trait::async_trait;
use bytes::Bytes;

pub type StoreResult<T, E = StoreError> = std::result::Result<T, E>;

/// Errors surfaced by [`ObjectStore`] implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("object not found")]
    NotFound,
    #[error("store does not support server-side move")]
    MoveUnsupported,
    /// Transport or storage failure. Retryable from the caller's point of
    /// view; the store itself never retries.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            StoreError::NotFound
        } else {
            StoreError::Other(e.into())
        }
    }
}

/// One entry of a prefix listing.
///
/// `size == None` marks a sub-prefix (a "folder-like" entry): there is at
/// least one object below `name` but `name` itself carries no content.
/// `size == Some(_)` marks a stored object directly under the listed prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub name: String,
    pub size: Option<u64>,
}

impl ObjectEntry {
    pub fn is_prefix(&self) -> bool {
        self.size.is_none()
    }
}

pub struct StoreFeatures {
    /// Whether the backend can rename an object across prefixes in a single
    /// call. When false, callers needing a move must fall back to
    /// get + put + delete and handle the non-atomic failure modes themselves.
    pub supports_move: bool,
}

/// A flat key-value blob store.
///
/// Keys are `/`-separated strings with no leading slash. The store has no
/// real directories: `list` groups keys by their next path segment purely
/// as a presentation of the flat namespace.
#[async_trait]
pub trait ObjectStore: std::fmt::Debug + Send + Sync + 'static {
    fn features(&self) -> StoreFeatures;

    /// Lists the immediate children of `prefix`, at most `limit` entries.
    ///
    /// Objects directly under the prefix become file-like entries (with
    /// their size); deeper keys are collapsed into one prefix entry per
    /// distinct next segment. Entry names are single segments, never paths.
    /// Listing a prefix with no objects below it returns an empty vec.
    async fn list(&self, prefix: &str, limit: usize) -> StoreResult<Vec<ObjectEntry>>;

    /// Stores `bytes` at `key`, replacing any existing object.
    async fn put(&self, key: &str, bytes: Bytes) -> StoreResult<()>;

    /// Returns the bytes of the object at `key`.
    async fn get(&self, key: &str) -> StoreResult<Bytes>;

    /// Deletes the object at `key`. Deleting an absent key is
    /// [`StoreError::NotFound`].
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Renames an object in a single backend call.
    ///
    /// Only available when [`StoreFeatures::supports_move`] is true; the
    /// default implementation rejects the call so backends without a native
    /// rename don't silently pretend to have one.
    async fn move_object(&self, src_key: &str, dst_key: &str) -> StoreResult<()> {
        let _ = (src_key, dst_key);
        Err(StoreError::MoveUnsupported)
    }
}
