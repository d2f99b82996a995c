//! The query engine: table lifecycle and row operations.
//!
//! The engine holds no catalog of its own. Schema operations take the
//! caller's catalog by value and hand back the updated one; row operations
//! borrow it. The caller persists the catalog after a successful mutation
//! (see [`QueryEngine::save_catalog`]).
//!
//! Every row operation is a whole-file read-compute-write, and validation
//! always completes before anything is written.

use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::catalog::ops as catalog_ops;
use crate::config::DbConfig;
use crate::error::{NotFoundError, Result, StorageError, ValidationError};
use crate::storage::metadata::MetadataStore;
use crate::storage::sequence::SequenceStore;
use crate::storage::table_file::TableFileStore;
use crate::types::{ID_COLUMN, Record, TableSchema, Value};

use super::cache::{CacheStats, QueryCache};
use super::filter::Clause;
use super::validate::{validate, validate_value};

/// File name of the ID sequence document inside the data directory.
const SEQUENCE_FILE: &str = ".sequences.json";

/// Schema and size of one table, as reported by `describe_table`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub name: String,
    pub schema: TableSchema,
    pub row_count: usize,
}

/// Executes table and row operations against one database directory.
#[derive(Debug)]
pub struct QueryEngine {
    config: DbConfig,
    metadata: MetadataStore,
    tables: TableFileStore,
    sequences: SequenceStore,
    cache: QueryCache,
}

impl QueryEngine {
    /// Build an engine over the layout described by `config`. Nothing is read
    /// or created until the first operation.
    pub fn open(config: DbConfig) -> Self {
        let data_path = config.data_path();
        let cache = if config.cache_enabled() {
            QueryCache::new()
        } else {
            QueryCache::disabled()
        };
        debug!(root = %config.root().display(), cache = config.cache_enabled(), "opened engine");
        Self {
            metadata: MetadataStore::new(config.metadata_path()),
            sequences: SequenceStore::new(data_path.join(SEQUENCE_FILE)),
            tables: TableFileStore::new(data_path),
            cache,
            config,
        }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    pub fn table_files(&self) -> &TableFileStore {
        &self.tables
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Read the persisted catalog (empty if none exists yet).
    pub fn load_catalog(&self) -> Result<Catalog> {
        Ok(self.metadata.load()?)
    }

    /// Persist `catalog` as the new canonical catalog.
    pub fn save_catalog(&self, catalog: &Catalog) -> Result<()> {
        Ok(self.metadata.save(catalog)?)
    }

    /// Add a table. Does not touch any data file.
    pub fn create_table<S: AsRef<str>>(
        &self,
        catalog: Catalog,
        table: &str,
        column_specs: &[S],
    ) -> Result<Catalog> {
        let catalog = catalog_ops::create_table(catalog, table, column_specs)?;
        self.cache.invalidate(table);
        Ok(catalog)
    }

    /// Remove a table together with its rows and its ID sequence.
    pub fn drop_table(&self, catalog: Catalog, table: &str) -> Result<Catalog> {
        let catalog = catalog_ops::drop_table(catalog, table)?;
        self.tables.save(table, &[])?;
        self.sequences.reset(table)?;
        self.cache.invalidate(table);
        Ok(catalog)
    }

    pub fn list_tables(&self, catalog: &Catalog) -> Vec<String> {
        catalog_ops::list_tables(catalog)
    }

    pub fn describe_table(&self, catalog: &Catalog, table: &str) -> Result<TableInfo> {
        let schema = catalog_ops::get_table(catalog, table)?;
        let row_count = self.tables.load(table)?.len();
        Ok(TableInfo {
            name: table.to_string(),
            schema: schema.clone(),
            row_count,
        })
    }

    /// Append a row and return its ID.
    ///
    /// Column names always come from the schema, in schema order.
    pub fn insert(&self, catalog: &Catalog, table: &str, values: &[Value]) -> Result<u64> {
        let schema = catalog_ops::get_table(catalog, table)?;
        validate(catalog, table, values)?;

        let mut rows = self.tables.load(table)?;
        let mut id = self.sequences.next_id(table)?;
        for row in &rows {
            id = id.max(id_after(table, row_id(table, row)?)?);
        }

        let mut record = Record::new();
        record.push(ID_COLUMN, id.to_string());
        for (column, value) in schema.data_columns().iter().zip(values) {
            record.push(column.name.as_str(), value.canonical());
        }
        rows.push(record);

        self.tables.save(table, &rows)?;
        self.cache.invalidate(table);
        self.sequences.advance(table, id_after(table, id)?)?;

        debug!(table, id, rows = rows.len(), "inserted row");
        Ok(id)
    }

    /// Rows matching every pair of `filter`, in storage order. An empty filter
    /// returns every row. Served from the cache when possible.
    pub fn select(&self, catalog: &Catalog, table: &str, filter: &Clause) -> Result<Vec<Record>> {
        let schema = catalog_ops::get_table(catalog, table)?;
        check_columns(table, schema, filter)?;

        self.cache.get_or_load(table, filter, || {
            let rows = self.tables.load(table)?;
            if filter.is_empty() {
                return Ok(rows);
            }
            Ok(rows.into_iter().filter(|row| filter.matches(row)).collect())
        })
    }

    /// Assign `set` on every row matching `filter` and return the IDs of the
    /// matched rows. Matching nothing is not an error.
    ///
    /// The file is rewritten only if some value actually changed.
    pub fn update(
        &self,
        catalog: &Catalog,
        table: &str,
        set: &Clause,
        filter: &Clause,
    ) -> Result<Vec<u64>> {
        let schema = catalog_ops::get_table(catalog, table)?;
        let rows = self.tables.load(table)?;
        if rows.is_empty() {
            return Err(NotFoundError::EmptyTable(table.to_string()).into());
        }
        check_columns(table, schema, filter)?;
        check_columns(table, schema, set)?;
        if set.is_empty() {
            return Err(ValidationError::EmptySetClause.into());
        }
        for (column, value) in set.iter() {
            if column == ID_COLUMN {
                return Err(ValidationError::ReservedColumn(column.to_string()).into());
            }
            if let Some(def) = schema.column(column) {
                validate_value(def, value)?;
            }
        }

        let mut updated = Vec::new();
        let mut next_rows = Vec::with_capacity(rows.len());
        for row in &rows {
            if !filter.matches(row) {
                next_rows.push(row.clone());
                continue;
            }
            updated.push(row_id(table, row)?);
            let mut changed = row.clone();
            for (column, value) in set.iter() {
                changed.push(column, value.canonical());
            }
            next_rows.push(changed);
        }

        if next_rows != rows {
            self.tables.save(table, &next_rows)?;
            self.cache.invalidate(table);
        }
        debug!(table, matched = updated.len(), "updated rows");
        Ok(updated)
    }

    /// Remove every row matching `filter` and return their IDs.
    ///
    /// Fails with `NotFound` and leaves the file untouched when nothing
    /// matches.
    pub fn delete(&self, catalog: &Catalog, table: &str, filter: &Clause) -> Result<Vec<u64>> {
        let schema = catalog_ops::get_table(catalog, table)?;
        check_columns(table, schema, filter)?;

        let rows = self.tables.load(table)?;
        let (removed, kept): (Vec<Record>, Vec<Record>) =
            rows.into_iter().partition(|row| filter.matches(row));
        if removed.is_empty() {
            return Err(NotFoundError::NoMatchingRows(table.to_string()).into());
        }

        let ids = removed
            .iter()
            .map(|row| row_id(table, row))
            .collect::<Result<Vec<_>>>()?;
        let mut high_water: u64 = 0;
        for row in removed.iter().chain(&kept) {
            high_water = high_water.max(id_after(table, row_id(table, row)?)?);
        }
        // Persist the high-water mark first so a deleted maximum is not reused.
        self.sequences.advance(table, high_water)?;
        self.tables.save(table, &kept)?;
        self.cache.invalidate(table);

        info!(table, removed = ids.len(), remaining = kept.len(), "deleted rows");
        Ok(ids)
    }
}

/// Render IDs the way results are reported: `"0, 2, 5"`.
pub fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn row_id(table: &str, row: &Record) -> Result<u64> {
    let raw = row.get(ID_COLUMN).ok_or_else(|| StorageError::InvalidRecord {
        table: table.to_string(),
        reason: "missing ID".to_string(),
    })?;
    raw.parse().map_err(|_| {
        StorageError::InvalidRecord {
            table: table.to_string(),
            reason: format!("non-numeric ID '{raw}'"),
        }
        .into()
    })
}

/// The ID following `id`. The ID space is exhausted at `u64::MAX`, since
/// wrapping around would hand out IDs that were already used.
fn id_after(table: &str, id: u64) -> Result<u64> {
    id.checked_add(1).ok_or_else(|| {
        StorageError::InvalidRecord {
            table: table.to_string(),
            reason: format!("ID {id} leaves no room for another row"),
        }
        .into()
    })
}

fn check_columns(table: &str, schema: &TableSchema, clause: &Clause) -> Result<()> {
    match clause.columns().find(|column| !schema.contains(column)) {
        Some(column) => Err(NotFoundError::Column {
            table: table.to_string(),
            column: column.to_string(),
        }
        .into()),
        None => Ok(()),
    }
}
