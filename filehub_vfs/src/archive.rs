//! Best-effort zip archive of one folder's contents.

use std::io::{Cursor, Write};

use bytes::Bytes;
use filehub_core::{ObjectStore, StoreError};
use tracing::warn;
use zip::{ZipWriter, write::SimpleFileOptions};

use crate::{VfsError, VfsResult, engine::FileEntry, paths};

/// A folder's contents packed into a single zip blob.
#[derive(Debug, Clone)]
pub struct FolderArchive {
    /// Suggested download name, `<folder>.zip`.
    pub file_name: String,
    pub bytes: Bytes,
    /// Basenames actually included, in archive order.
    pub entries: Vec<String>,
    /// Basenames whose fetch failed and were left out. An empty list means
    /// the archive is complete for the listing it was built from.
    pub skipped: Vec<String>,
}

impl FolderArchive {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Fetches each listed file and appends it under its basename.
///
/// A failed fetch only skips that entry: a folder download should deliver
/// whatever can still be read, with the gap reported rather than hidden.
/// Archive-writer failures are fatal (the blob would be corrupt).
pub(crate) async fn build_archive(
    store: &dyn ObjectStore,
    folder: &str,
    files: Vec<FileEntry>,
) -> VfsResult<FolderArchive> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    let mut entries = Vec::new();
    let mut skipped = Vec::new();

    for file in files {
        let key = paths::folder_file_key(folder, &file.name);
        let bytes = match store.get(&key).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(%key, %err, "skipping unreadable archive entry");
                skipped.push(file.name);
                continue;
            }
        };

        // Entry names are basenames only, never nested paths, so the
        // archive cannot escape its extraction directory.
        writer
            .start_file(file.name.as_str(), options)
            .map_err(|e| zip_error(&key, e))?;
        writer
            .write_all(&bytes)
            .map_err(|e| zip_error(&key, e.into()))?;
        entries.push(file.name);
    }

    let cursor = writer.finish().map_err(|e| zip_error(folder, e))?;
    Ok(FolderArchive {
        file_name: format!("{folder}.zip"),
        bytes: Bytes::from(cursor.into_inner()),
        entries,
        skipped,
    })
}

fn zip_error(key: &str, e: zip::result::ZipError) -> VfsError {
    VfsError::Backend {
        operation: "archive_folder",
        key: key.to_string(),
        source: StoreError::Other(e.into()),
    }
}
