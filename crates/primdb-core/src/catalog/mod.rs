//! Table catalog: the table-name to schema mapping and its operations.

pub mod ops;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::TableSchema;

/// The full table-name to schema mapping.
///
/// Persisted as one JSON object; table names iterate in sorted order so the
/// document is written deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    tables: BTreeMap<String, TableSchema>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, table: &str) -> Option<&TableSchema> {
        self.tables.get(table)
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TableSchema)> {
        self.tables.iter().map(|(name, schema)| (name.as_str(), schema))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub(crate) fn insert(&mut self, table: String, schema: TableSchema) {
        self.tables.insert(table, schema);
    }

    pub(crate) fn remove(&mut self, table: &str) -> Option<TableSchema> {
        self.tables.remove(table)
    }
}
