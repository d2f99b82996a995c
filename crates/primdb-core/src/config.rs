//! Database location and engine options.

use std::path::{Path, PathBuf};

/// File name of the catalog document inside the database root.
pub const DEFAULT_METADATA_FILE: &str = "db_meta.json";

/// Directory (inside the database root) holding one document per table.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Where a database lives on disk and how the engine behaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    root: PathBuf,
    metadata_file: String,
    data_dir: String,
    cache_enabled: bool,
}

impl DbConfig {
    /// Default layout rooted at `root`: `db_meta.json` plus `data/<table>.json`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            metadata_file: DEFAULT_METADATA_FILE.to_string(),
            data_dir: DEFAULT_DATA_DIR.to_string(),
            cache_enabled: true,
        }
    }

    pub fn metadata_file(mut self, name: impl Into<String>) -> Self {
        self.metadata_file = name.into();
        self
    }

    pub fn data_dir(mut self, name: impl Into<String>) -> Self {
        self.data_dir = name.into();
        self
    }

    /// Turn read memoization on or off. On by default.
    pub fn cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.root.join(&self.metadata_file)
    }

    pub fn data_path(&self) -> PathBuf {
        self.root.join(&self.data_dir)
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }
}

impl Default for DbConfig {
    /// Rooted at the current working directory.
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let config = DbConfig::new("/tmp/db");
        assert_eq!(config.metadata_path(), PathBuf::from("/tmp/db/db_meta.json"));
        assert_eq!(config.data_path(), PathBuf::from("/tmp/db/data"));
        assert!(config.cache_enabled());
    }

    #[test]
    fn test_overrides() {
        let config = DbConfig::new("/tmp/db")
            .metadata_file("catalog.json")
            .data_dir("tables")
            .cache(false);
        assert_eq!(config.metadata_path(), PathBuf::from("/tmp/db/catalog.json"));
        assert_eq!(config.data_path(), PathBuf::from("/tmp/db/tables"));
        assert!(!config.cache_enabled());
    }
}
