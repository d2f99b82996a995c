//! Per-table row documents.

use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::types::Record;

use super::{read_json, remove_file, write_json};

/// Loads and saves one JSON array of records per table.
///
/// Callers always read-modify-write the whole sequence. An empty sequence is
/// never written: the file is removed instead, so a missing file and an empty
/// table are the same state.
#[derive(Debug, Clone)]
pub struct TableFileStore {
    dir: PathBuf,
}

impl TableFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<table>.json`
    pub fn path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.json"))
    }

    pub fn exists(&self, table: &str) -> bool {
        self.path(table).is_file()
    }

    pub fn load(&self, table: &str) -> Result<Vec<Record>, StorageError> {
        Ok(read_json(&self.path(table))?.unwrap_or_default())
    }

    pub fn save(&self, table: &str, rows: &[Record]) -> Result<(), StorageError> {
        let path = self.path(table);
        if rows.is_empty() {
            remove_file(&path)?;
            return Ok(());
        }
        write_json(&path, rows)
    }
}
