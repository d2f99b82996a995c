//! ID high-water marks.
//!
//! The next ID of a table is `max(max existing ID + 1, high-water mark)`. The
//! high-water mark survives the deletion of the row holding the maximum ID,
//! so an ID is never handed out twice.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

use super::{read_json, remove_file, write_json};

/// Table name to the next ID it may hand out.
pub type Sequences = BTreeMap<String, u64>;

/// Loads and saves the sequence document.
#[derive(Debug, Clone)]
pub struct SequenceStore {
    path: PathBuf,
}

impl SequenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Sequences, StorageError> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    /// The stored high-water mark for `table`, or 0.
    pub fn next_id(&self, table: &str) -> Result<u64, StorageError> {
        Ok(self.load()?.get(table).copied().unwrap_or(0))
    }

    /// Raise the high-water mark of `table` to at least `next`.
    pub fn advance(&self, table: &str, next: u64) -> Result<(), StorageError> {
        let mut sequences = self.load()?;
        let entry = sequences.entry(table.to_string()).or_insert(0);
        if *entry >= next {
            return Ok(());
        }
        *entry = next;
        self.save(&sequences)
    }

    /// Forget `table`'s high-water mark.
    pub fn reset(&self, table: &str) -> Result<(), StorageError> {
        let mut sequences = self.load()?;
        if sequences.remove(table).is_none() {
            return Ok(());
        }
        self.save(&sequences)
    }

    fn save(&self, sequences: &Sequences) -> Result<(), StorageError> {
        if sequences.is_empty() {
            remove_file(&self.path)?;
            return Ok(());
        }
        write_json(&self.path, sequences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_is_zero() {
        let dir = tempdir().unwrap();
        let store = SequenceStore::new(dir.path().join(".sequences.json"));
        assert_eq!(store.next_id("users").unwrap(), 0);
    }

    #[test]
    fn test_advance_is_monotonic() {
        let dir = tempdir().unwrap();
        let store = SequenceStore::new(dir.path().join(".sequences.json"));
        store.advance("users", 3).unwrap();
        store.advance("users", 1).unwrap();
        assert_eq!(store.next_id("users").unwrap(), 3);
        store.advance("users", 5).unwrap();
        assert_eq!(store.next_id("users").unwrap(), 5);
    }

    #[test]
    fn test_reset_removes_entry_and_empty_file() {
        let dir = tempdir().unwrap();
        let store = SequenceStore::new(dir.path().join(".sequences.json"));
        store.advance("a", 2).unwrap();
        store.advance("b", 7).unwrap();

        store.reset("a").unwrap();
        assert_eq!(store.next_id("a").unwrap(), 0);
        assert_eq!(store.next_id("b").unwrap(), 7);

        store.reset("b").unwrap();
        assert!(!store.path().exists());
    }
}
