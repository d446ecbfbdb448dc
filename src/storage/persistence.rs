use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::PatientRecord;
use crate::error::Result;

/// The whole persisted store: `{"patients": [...]}`.
///
/// Unknown top-level keys are carried through untouched so a rewrite never
/// drops data someone else put in the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub patients: Vec<PatientRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reads and rewrites the store document at a fixed path.
#[derive(Debug)]
pub struct DocumentFile {
    path: PathBuf,
}

impl DocumentFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        DocumentFile {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document, or an empty one if nothing has been written yet
    pub fn load(&self) -> Result<StoreDocument> {
        let buffer = match fs::read(&self.path) {
            Ok(buffer) => buffer,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store file missing, starting empty");
                return Ok(StoreDocument::default());
            }
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_slice(&buffer)?)
    }

    /// The document exactly as stored, whatever its shape. A missing file
    /// reads as `{"patients": []}`.
    pub fn read_raw(&self) -> Result<Value> {
        match fs::read(&self.path) {
            Ok(buffer) => Ok(serde_json::from_slice(&buffer)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(serde_json::json!({"patients": []})),
            Err(e) => Err(e.into()),
        }
    }

    /// Sibling path `<file name>.tmp`, distinct from the target for any name.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Overwrite the document with a 2-space indented rendering
    pub fn save(&self, document: &StoreDocument) -> Result<()> {
        let serialized = serde_json::to_vec_pretty(document)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Write to a temporary file first
        let temp_path = self.temp_path();
        let mut file = File::create(&temp_path)?;
        file.write_all(&serialized)?;
        file.sync_all()?;

        // Rename temp file to final name (atomic operation on most filesystems)
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}
