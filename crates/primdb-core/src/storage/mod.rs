//! Storage layer: the catalog document, per-table row documents and the
//! ID sequence document, all plain JSON files rewritten in full.

pub mod metadata;
pub mod sequence;
pub mod table_file;

use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::StorageError;

/// Read and decode a JSON document. A missing file yields `None`.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StorageError::io(path, e)),
    };
    let value = serde_json::from_slice(&bytes).map_err(|source| StorageError::Corrupted {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "loaded document");
    Ok(Some(value))
}

/// Encode `value` as indented JSON and overwrite `path`, creating the parent
/// directory when needed.
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    let mut text = serde_json::to_string_pretty(value).map_err(|source| StorageError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    text.push('\n');
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }
    fs::write(path, &text).map_err(|e| StorageError::io(path, e))?;
    debug!(path = %path.display(), bytes = text.len(), "wrote document");
    Ok(())
}

/// Remove a file, treating "already gone" as success. Returns whether a file
/// was actually removed.
pub(crate) fn remove_file(path: &Path) -> Result<bool, StorageError> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed document");
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StorageError::io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tempfile::tempdir;

    #[test]
    fn test_read_missing_is_none() {
        let dir = tempdir().unwrap();
        let result: Option<Value> = read_json(&dir.path().join("absent.json")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_write_creates_parent_and_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("doc.json");
        write_json(&path, &json!({"a": ["b"]})).unwrap();

        let back: Option<Value> = read_json(&path).unwrap();
        assert_eq!(back, Some(json!({"a": ["b"]})));

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"a\""), "expected indented output: {text}");
    }

    #[test]
    fn test_corrupted_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();

        let err = read_json::<Value>(&path).unwrap_err();
        assert!(matches!(err, StorageError::Corrupted { .. }));
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn test_remove_file_missing_is_ok() {
        let dir = tempdir().unwrap();
        assert!(!remove_file(&dir.path().join("gone.json")).unwrap());
    }
}
