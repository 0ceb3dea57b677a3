//! Archive contents: what ends up inside the produced zip blob.

use std::io::{Cursor, Read};

use bytes::Bytes;
use filehub_store_memory::MemoryStore;
use filehub_vfs::{FolderEngine, SelectedFile, VfsError, paths};

fn engine() -> FolderEngine {
    FolderEngine::new(MemoryStore::new())
}

fn zip_names(bytes: &Bytes) -> Vec<String> {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect()
}

#[tokio::test]
async fn archive_contains_files_but_never_the_marker() {
    let engine = engine();

    engine.create_folder("photos").await.unwrap();
    engine
        .upload_files(
            vec![
                SelectedFile::new("a.jpg", &b"aaaa"[..]),
                SelectedFile::new("b.jpg", &b"bbbb"[..]),
            ],
            Some("photos"),
        )
        .await
        .unwrap();

    let archive = engine.download_folder_archive("photos").await.unwrap();
    assert_eq!(archive.file_name, "photos.zip");
    assert!(archive.is_complete());

    let names = zip_names(&archive.bytes);
    assert_eq!(names, vec!["a.jpg".to_string(), "b.jpg".to_string()]);
    assert!(
        !names.iter().any(|n| n == paths::FOLDER_MARKER),
        "the marker is bookkeeping, not user data"
    );
}

#[tokio::test]
async fn archive_entries_preserve_bytes_under_their_basenames() {
    let engine = engine();
    let payload = Bytes::from_static(b"binary \x00\x01\x02 payload");

    engine.create_folder("docs").await.unwrap();
    engine
        .upload_files(
            vec![SelectedFile::new("data.bin", payload.clone())],
            Some("docs"),
        )
        .await
        .unwrap();

    let archive = engine.download_folder_archive("docs").await.unwrap();

    let mut zip = zip::ZipArchive::new(Cursor::new(archive.bytes.to_vec())).unwrap();
    let mut entry = zip.by_name("data.bin").unwrap();
    assert!(
        !entry.name().contains('/'),
        "entry names are basenames, never nested paths"
    );
    let mut contents = Vec::new();
    entry.read_to_end(&mut contents).unwrap();
    assert_eq!(contents, payload.to_vec());
}

#[tokio::test]
async fn empty_folder_archives_to_zero_entries() {
    let engine = engine();
    engine.create_folder("empty").await.unwrap();

    let archive = engine.download_folder_archive("empty").await.unwrap();
    assert!(archive.entries.is_empty());
    assert!(archive.is_complete());
    assert!(zip_names(&archive.bytes).is_empty());
}

#[tokio::test]
async fn archiving_an_invalid_folder_name_fails_fast() {
    let engine = engine();
    let err = engine.download_folder_archive("a/b").await.unwrap_err();
    assert!(matches!(err, VfsError::InvalidName { .. }));
}
