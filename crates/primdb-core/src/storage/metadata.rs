//! The catalog document.

use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::error::StorageError;

use super::{read_json, write_json};

/// Loads and saves the catalog as a single JSON document.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the catalog. A missing document is an empty catalog.
    pub fn load(&self) -> Result<Catalog, StorageError> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    /// Overwrite the catalog document in full.
    pub fn save(&self, catalog: &Catalog) -> Result<(), StorageError> {
        write_json(&self.path, catalog)
    }
}
