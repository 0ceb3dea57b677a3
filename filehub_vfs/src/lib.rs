//! # filehub virtual folder layer
//!
//! Simulates a two-level folder hierarchy (root "loose files" plus one level
//! of named folders) over a flat key-value object store, using a reserved
//! `placeholder.txt` marker object per folder prefix.
//!
//! ## Layers
//! 1. `paths`   – key construction and name validation for the namespace.
//! 2. `engine`  – folder operations built on the four store primitives
//!    (list-by-prefix, put, get, delete); owns the partial-failure contract.
//! 3. `archive` – best-effort zip download of one folder's contents.
//! 4. `session` – per-session selection buffer and upload-record ledger.
//!
//! Nothing here is transactional. Multi-step operations run their sub-steps
//! sequentially and surface partial completion as
//! [`VfsError::PartialFailure`], which carries enough state for the caller
//! to inspect what happened and retry the remainder.

mod archive;
mod config;
mod engine;
mod error;
pub mod paths;
mod session;

pub use archive::FolderArchive;
pub use config::VfsConfig;
pub use engine::{FileDownload, FileEntry, FolderEngine, MovedFile, RootListing};
pub use error::{VfsError, VfsResult};
pub use session::{MemoryLedger, SelectedFile, Session, UploadLedger, UploadRecord};
