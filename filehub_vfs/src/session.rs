//! Per-session state and the upload record-keeping boundary.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use filehub_core::store::StoreResult;
use uuid::Uuid;

/// A file picked for upload but not yet committed to the store.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// State owned by one user session: the pre-upload selection buffer, the
/// currently open folder and the in-flight drag payload.
///
/// Nothing here is durable or shared; the session is an explicit context
/// object passed into operations, and dropping it discards everything.
#[derive(Debug, Default)]
pub struct Session {
    selected: Vec<SelectedFile>,
    current_folder: Option<String>,
    dragged_file: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_file(&mut self, file: SelectedFile) {
        self.selected.push(file);
    }

    pub fn selected(&self) -> &[SelectedFile] {
        &self.selected
    }

    /// Drains the selection buffer, handing its contents to an upload batch.
    pub fn take_selected(&mut self) -> Vec<SelectedFile> {
        std::mem::take(&mut self.selected)
    }

    pub fn open_folder(&mut self, name: impl Into<String>) {
        self.current_folder = Some(name.into());
    }

    pub fn close_folder(&mut self) {
        self.current_folder = None;
    }

    pub fn current_folder(&self) -> Option<&str> {
        self.current_folder.as_deref()
    }

    pub fn start_drag(&mut self, file_name: impl Into<String>) {
        self.dragged_file = Some(file_name.into());
    }

    /// Takes the dragged file, ending the drag. Returns `None` when no drag
    /// is in flight (a drop with nothing dragged is a no-op for callers).
    pub fn take_dragged(&mut self) -> Option<String> {
        self.dragged_file.take()
    }
}

/// An opaque upload-session record handed back by the record-keeping side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Record-keeping boundary for upload sessions.
///
/// The engine only depends on getting an identifier back on success; where
/// and how records are stored is the implementation's business.
#[async_trait::async_trait]
pub trait UploadLedger: Send + Sync + 'static {
    async fn create_record(&self) -> StoreResult<UploadRecord>;
}

/// In-memory ledger, mainly for tests and single-process use.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    records: std::sync::Mutex<Vec<UploadRecord>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<UploadRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait::async_trait]
impl UploadLedger for MemoryLedger {
    async fn create_record(&self) -> StoreResult<UploadRecord> {
        let record = UploadRecord {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record.clone());
        Ok(record)
    }
}
