//! Patient store
//!
//! Handles the persistence side of intake capture:
//! - The open-shaped patient record
//! - The `{"patients": [...]}` document on disk
//! - Serialized read-modify-write cycles for appends

mod persistence;
mod record;

pub use persistence::{DocumentFile, StoreDocument};
pub use record::{PatientRecord, ID_FIELD, TIMESTAMP_FIELD};

use std::path::Path;
use std::sync::Mutex;

use tracing::{debug, info};

use crate::error::{AgentError, Result};
use crate::time;

/// File-backed patient store.
///
/// Every save loads the full document, appends, and rewrites it. The cycle
/// runs under `cycle_lock`, so concurrent requests within one process can no
/// longer lose each other's records. Separate processes sharing the file are
/// still unsynchronized.
#[derive(Debug)]
pub struct PatientStore {
    file: DocumentFile,
    cycle_lock: Mutex<()>,
}

impl PatientStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        PatientStore {
            file: DocumentFile::new(path),
            cycle_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Current contents of the store as a typed document.
    pub fn load(&self) -> Result<StoreDocument> {
        let _guard = self.cycle_lock.lock().map_err(|_| AgentError::LockPoisoned)?;
        self.file.load()
    }

    /// The store file as raw JSON, untouched by the typed document model.
    pub fn load_raw(&self) -> Result<serde_json::Value> {
        let _guard = self.cycle_lock.lock().map_err(|_| AgentError::LockPoisoned)?;
        self.file.read_raw()
    }

    /// Appends `record` and returns it as stored.
    ///
    /// `id` is `current length + 1`, recomputed on every insert rather than
    /// kept as a counter, so it would repeat if records were ever removed.
    pub fn append(&self, mut record: PatientRecord) -> Result<PatientRecord> {
        let _guard = self.cycle_lock.lock().map_err(|_| AgentError::LockPoisoned)?;

        let mut document = self.file.load()?;
        let id = document.patients.len() as u64 + 1;
        record.assign(id, time::now_iso8601());
        document.patients.push(record.clone());

        self.file.save(&document)?;
        info!(id, total = document.patients.len(), "Saved pharmacy patient record");
        debug!(record = ?record, "Stored record");

        Ok(record)
    }

    pub fn patients(&self) -> Result<Vec<PatientRecord>> {
        Ok(self.load()?.patients)
    }
}
