//! Folder operations built on the four store primitives.
//!
//! Every multi-step operation here runs its sub-steps sequentially in a
//! defined order and stops at the first failure. There is no underlying
//! transaction: the engine documents partial states instead of preventing
//! them. The two ordering rules that make partial states recoverable:
//!
//! - folder creation writes the marker first (a folder exists as soon as
//!   its marker does);
//! - folder deletion removes the marker last (a crash mid-delete leaves the
//!   folder still visible, and re-running the delete converges).

use std::sync::Arc;

use bytes::Bytes;
use filehub_core::{ObjectStore, StoreError};
use tracing::debug;

use crate::{
    VfsConfig, VfsError, VfsResult,
    archive::{self, FolderArchive},
    paths::{
        self, FILES_PREFIX, FOLDER_MARKER, FOLDERS_PREFIX, folder_file_key, folder_prefix,
        loose_file_key, marker_key,
    },
    session::SelectedFile,
};

/// One file-like entry of a listing, marker already filtered out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub size: Option<u64>,
}

/// The root view: folder names from the `folders` prefix and loose files
/// from the `files` prefix. The two namespaces are never merged.
#[derive(Debug, Clone, Default)]
pub struct RootListing {
    pub folders: Vec<String>,
    pub files: Vec<FileEntry>,
}

/// Payload of a successful single-file download.
#[derive(Debug, Clone)]
pub struct FileDownload {
    /// Suggested file name: the basename of the downloaded key.
    pub file_name: String,
    pub bytes: Bytes,
}

/// Payload of a successful move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovedFile {
    pub source_key: String,
    pub dest_key: String,
}

/// The folder operations engine.
///
/// Cheap to clone; all clones share the same store handle. Operations are
/// meant to be issued one at a time per session (multi-step operations are
/// not safe to interleave against the same folder prefix).
#[derive(Debug, Clone)]
pub struct FolderEngine {
    store: Arc<dyn ObjectStore>,
    config: VfsConfig,
}

impl FolderEngine {
    pub fn new<S: ObjectStore>(store: S) -> Self {
        Self::with_config(store, VfsConfig::default())
    }

    pub fn with_config<S: ObjectStore>(store: S, config: VfsConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
        }
    }

    pub fn from_arc(store: Arc<dyn ObjectStore>, config: VfsConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &VfsConfig {
        &self.config
    }

    /// Lists the root view: one page of folders and one page of loose files.
    pub async fn list_root(&self) -> VfsResult<RootListing> {
        let limit = self.config.list_page_size;

        let folder_entries = self
            .store
            .list(FOLDERS_PREFIX, limit)
            .await
            .map_err(|e| VfsError::backend("list_root", FOLDERS_PREFIX, e))?;
        let file_entries = self
            .store
            .list(FILES_PREFIX, limit)
            .await
            .map_err(|e| VfsError::backend("list_root", FILES_PREFIX, e))?;

        Ok(RootListing {
            // Under `folders`, only sub-prefixes represent folders; a stray
            // object directly under the prefix is not a folder.
            folders: folder_entries
                .into_iter()
                .filter(|e| e.is_prefix())
                .map(|e| e.name)
                .collect(),
            files: file_entries
                .into_iter()
                .filter(|e| !e.is_prefix())
                .map(|e| FileEntry {
                    name: e.name,
                    size: e.size,
                })
                .collect(),
        })
    }

    /// Lists the files inside one folder. The marker object is internal
    /// bookkeeping and never appears in the result.
    pub async fn list_folder(&self, folder: &str) -> VfsResult<Vec<FileEntry>> {
        paths::validate_name(folder, &self.config)?;
        let prefix = folder_prefix(folder);

        let entries = self
            .store
            .list(&prefix, self.config.list_page_size)
            .await
            .map_err(|e| VfsError::backend("list_folder", &prefix, e))?;

        Ok(entries
            .into_iter()
            .filter(|e| !e.is_prefix() && e.name != FOLDER_MARKER)
            .map(|e| FileEntry {
                name: e.name,
                size: e.size,
            })
            .collect())
    }

    /// Creates a folder by writing its marker object. Returns the marker key.
    ///
    /// With the default `overwrite_markers` policy this is idempotent:
    /// creating an existing folder rewrites the marker and changes nothing
    /// else. With the policy off, an existing marker is a conflict.
    pub async fn create_folder(&self, name: &str) -> VfsResult<String> {
        paths::validate_name(name, &self.config)?;
        let key = marker_key(name);

        if !self.config.overwrite_markers {
            // The marker key is known exactly, so probe it directly rather
            // than scanning a listing (which is capped at one page).
            match self.store.get(&key).await {
                Ok(_) => {
                    return Err(VfsError::AlreadyExists {
                        name: name.to_string(),
                    });
                }
                Err(StoreError::NotFound) => {}
                Err(e) => return Err(VfsError::backend("create_folder", &key, e)),
            }
        }

        self.store
            .put(&key, Bytes::from_static(paths::MARKER_CONTENT))
            .await
            .map_err(|e| VfsError::backend("create_folder", &key, e))?;
        debug!(folder = name, "created folder marker");
        Ok(key)
    }

    /// Deletes one file by key.
    pub async fn delete_file(&self, key: &str) -> VfsResult<()> {
        match self.store.delete(key).await {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound) => Err(VfsError::NotFound {
                key: key.to_string(),
            }),
            Err(e) => Err(VfsError::backend("delete_file", key, e)),
        }
    }

    /// Deletes a folder: every member file first, the marker last.
    ///
    /// Returns the deleted keys. On the first failing delete the operation
    /// stops and reports [`VfsError::PartialFailure`]; nothing already
    /// deleted comes back, but re-running the delete picks up where it
    /// stopped (a member that is already gone counts as deleted, so retries
    /// converge instead of failing).
    pub async fn delete_folder(&self, name: &str) -> VfsResult<Vec<String>> {
        paths::validate_name(name, &self.config)?;
        let prefix = folder_prefix(name);

        // Listings are one page at a time, so a folder with more members
        // than the page size is drained page by page: delete every member
        // the page shows, re-list, repeat until only the marker is left.
        // The marker is deleted strictly last; if any pass dies partway the
        // folder is still visible and a retry resumes the drain.
        let mut deleted = Vec::new();
        let mut saw_any = false;
        let mut marker_present = false;
        loop {
            let entries = self
                .store
                .list(&prefix, self.config.list_page_size)
                .await
                .map_err(|e| VfsError::backend("delete_folder", &prefix, e))?;
            saw_any |= !entries.is_empty();
            marker_present |= entries.iter().any(|e| e.name == FOLDER_MARKER);

            let batch: Vec<String> = entries
                .iter()
                .filter(|e| !e.is_prefix() && e.name != FOLDER_MARKER)
                .map(|e| folder_file_key(name, &e.name))
                .collect();
            if batch.is_empty() {
                break;
            }

            for (i, key) in batch.iter().enumerate() {
                match self.store.delete(key).await {
                    Ok(()) => deleted.push(key.clone()),
                    Err(StoreError::NotFound) => {
                        // Already gone, most likely from an earlier partial
                        // delete of this same folder.
                        debug!(%key, "member already deleted");
                        deleted.push(key.clone());
                    }
                    Err(source) => {
                        // `remaining` covers what is known not to have run:
                        // the rest of this page, then the marker. Members on
                        // pages never listed are not enumerable here.
                        let mut remaining = batch[i + 1..].to_vec();
                        if marker_present {
                            remaining.push(marker_key(name));
                        }
                        return Err(VfsError::PartialFailure {
                            operation: "delete_folder",
                            completed: deleted,
                            failed_key: key.clone(),
                            remaining,
                            source,
                        });
                    }
                }
            }
        }

        if !saw_any {
            return Err(VfsError::NotFound { key: prefix });
        }

        if marker_present {
            let key = marker_key(name);
            match self.store.delete(&key).await {
                Ok(()) | Err(StoreError::NotFound) => deleted.push(key),
                Err(source) => {
                    return Err(VfsError::PartialFailure {
                        operation: "delete_folder",
                        completed: deleted,
                        failed_key: key,
                        remaining: Vec::new(),
                        source,
                    });
                }
            }
        }

        debug!(folder = name, count = deleted.len(), "deleted folder");
        Ok(deleted)
    }

    /// Uploads a batch of files, sequentially, into `target_folder` (or as
    /// loose files when `None`). Returns the destination keys.
    ///
    /// The batch aborts at the first failing put. Files uploaded before the
    /// failure stay in place (no rollback); the error reports exactly which
    /// keys were written, which one failed and which were never attempted.
    pub async fn upload_files(
        &self,
        files: Vec<SelectedFile>,
        target_folder: Option<&str>,
    ) -> VfsResult<Vec<String>> {
        if let Some(folder) = target_folder {
            paths::validate_name(folder, &self.config)?;
        }
        for file in &files {
            paths::validate_name(&file.name, &self.config)?;
        }

        let dest_key = |file: &SelectedFile| match target_folder {
            Some(folder) => folder_file_key(folder, &file.name),
            None => loose_file_key(&file.name),
        };

        let mut uploaded = Vec::new();
        for (i, file) in files.iter().enumerate() {
            let key = dest_key(file);
            if let Err(source) = self.store.put(&key, file.bytes.clone()).await {
                return Err(VfsError::PartialFailure {
                    operation: "upload_files",
                    completed: uploaded,
                    failed_key: key,
                    remaining: files[i + 1..].iter().map(&dest_key).collect(),
                    source,
                });
            }
            uploaded.push(key);
        }

        debug!(count = uploaded.len(), "uploaded batch");
        Ok(uploaded)
    }

    /// Moves a loose file into a folder.
    ///
    /// Uses the backend's server-side move when available. Otherwise falls
    /// back to get + put + delete-source; see [`VfsError::DuplicateAfterMove`]
    /// for the one partial state that fallback can leave behind.
    pub async fn move_file_into_folder(
        &self,
        file_name: &str,
        dest_folder: &str,
    ) -> VfsResult<MovedFile> {
        paths::validate_name(file_name, &self.config)?;
        paths::validate_name(dest_folder, &self.config)?;

        let source_key = loose_file_key(file_name);
        let dest_key = folder_file_key(dest_folder, file_name);

        if self.store.features().supports_move {
            match self.store.move_object(&source_key, &dest_key).await {
                Ok(()) => return Ok(MovedFile { source_key, dest_key }),
                Err(StoreError::NotFound) => {
                    return Err(VfsError::NotFound { key: source_key });
                }
                // The store advertised move but refused it; fall through to
                // the copy-then-delete protocol.
                Err(StoreError::MoveUnsupported) => {}
                Err(e) => return Err(VfsError::backend("move_file", &source_key, e)),
            }
        }

        self.move_fallback(&source_key, &dest_key).await?;
        Ok(MovedFile { source_key, dest_key })
    }

    /// Non-atomic move: copy first, delete the source last. A failure
    /// between the two steps leaves two copies, never zero.
    async fn move_fallback(&self, source_key: &str, dest_key: &str) -> VfsResult<()> {
        let bytes = match self.store.get(source_key).await {
            Ok(bytes) => bytes,
            Err(StoreError::NotFound) => {
                return Err(VfsError::NotFound {
                    key: source_key.to_string(),
                });
            }
            Err(e) => return Err(VfsError::backend("move_file", source_key, e)),
        };

        self.store
            .put(dest_key, bytes)
            .await
            .map_err(|e| VfsError::backend("move_file", dest_key, e))?;

        match self.store.delete(source_key).await {
            Ok(()) => Ok(()),
            // Someone else removed the source meanwhile; the end state is
            // exactly what the move wanted.
            Err(StoreError::NotFound) => Ok(()),
            Err(source) => Err(VfsError::DuplicateAfterMove {
                source_key: source_key.to_string(),
                dest_key: dest_key.to_string(),
                source,
            }),
        }
    }

    /// Downloads one file by key.
    pub async fn download_file(&self, key: &str) -> VfsResult<FileDownload> {
        match self.store.get(key).await {
            Ok(bytes) => Ok(FileDownload {
                file_name: paths::basename(key).to_string(),
                bytes,
            }),
            Err(StoreError::NotFound) => Err(VfsError::NotFound {
                key: key.to_string(),
            }),
            Err(e) => Err(VfsError::backend("download_file", key, e)),
        }
    }

    /// Builds a zip archive of one folder's contents at this point in time.
    ///
    /// Best effort: entries whose fetch fails are skipped (and reported in
    /// [`FolderArchive::skipped`]), the marker is never included.
    pub async fn download_folder_archive(&self, folder: &str) -> VfsResult<FolderArchive> {
        let files = self.list_folder(folder).await?;
        archive::build_archive(self.store.as_ref(), folder, files).await
    }
}
