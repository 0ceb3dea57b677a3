use filehub_core::StoreError;

pub type VfsResult<T> = std::result::Result<T, VfsError>;

/// Failure taxonomy for folder operations.
///
/// Every variant names the specific key(s) involved; several operations
/// routinely succeed for a subset of their items, so a bare generic error
/// would hide exactly the information a caller needs to retry.
#[derive(Debug, thiserror::Error)]
pub enum VfsError {
    #[error("invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("not found: {key}")]
    NotFound { key: String },

    #[error("folder {name:?} already exists")]
    AlreadyExists { name: String },

    /// A single primitive call failed. Retryable by the caller; the engine
    /// never retries on its own.
    #[error("{operation} failed for {key}")]
    Backend {
        operation: &'static str,
        key: String,
        #[source]
        source: StoreError,
    },

    /// A multi-step operation stopped partway. `completed` holds the keys
    /// whose sub-step succeeded, `failed_key` the one that stopped the
    /// operation, `remaining` the keys never attempted (in the order they
    /// would have run). Re-issuing the operation resumes cleanly.
    #[error(
        "{operation} stopped at {failed_key}: {} done, {} not attempted",
        .completed.len(),
        .remaining.len()
    )]
    PartialFailure {
        operation: &'static str,
        completed: Vec<String>,
        failed_key: String,
        remaining: Vec<String>,
        #[source]
        source: StoreError,
    },

    /// A non-atomic move copied the object but failed to delete the source,
    /// so it now exists at both keys. Non-fatal: the destination write
    /// succeeded and the caller decides how to reconcile.
    #[error("move wrote {dest_key} but failed to delete {source_key}; object exists at both")]
    DuplicateAfterMove {
        source_key: String,
        dest_key: String,
        #[source]
        source: StoreError,
    },
}

impl VfsError {
    pub(crate) fn backend(operation: &'static str, key: &str, source: StoreError) -> Self {
        VfsError::Backend {
            operation,
            key: key.to_string(),
            source,
        }
    }
}
