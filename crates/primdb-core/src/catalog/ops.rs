//! Catalog operations: create, drop, get, and list tables.
//!
//! Every operation takes the catalog by value (or reference) and returns the
//! updated value; nothing here touches the filesystem. Callers persist the
//! result through [`MetadataStore`](crate::storage::metadata::MetadataStore).

use tracing::info;

use crate::error::{NotFoundError, Result, ValidationError};
use crate::types::{ColumnDef, TableSchema};

use super::Catalog;

/// Create a new table in the catalog.
///
/// Parses each spec as `name:type`, prepends `ID:int`, and inserts the schema.
/// On any failure the input catalog is dropped unchanged from the caller's
/// point of view, since the caller still owns the persisted copy.
pub fn create_table<S: AsRef<str>>(
    mut catalog: Catalog,
    table_name: &str,
    column_specs: &[S],
) -> Result<Catalog> {
    if table_name.trim().is_empty() {
        return Err(ValidationError::EmptyTableName.into());
    }
    if !table_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ValidationError::InvalidTableName(table_name.to_string()).into());
    }
    if catalog.contains(table_name) {
        return Err(ValidationError::TableAlreadyExists(table_name.to_string()).into());
    }

    let columns = column_specs
        .iter()
        .map(|spec| spec.as_ref().parse::<ColumnDef>())
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let schema = TableSchema::new(columns)?;

    info!(table = table_name, columns = schema.columns().len(), "created table");
    catalog.insert(table_name.to_string(), schema);
    Ok(catalog)
}

/// Drop a table from the catalog.
pub fn drop_table(mut catalog: Catalog, table_name: &str) -> Result<Catalog> {
    if catalog.remove(table_name).is_none() {
        return Err(NotFoundError::Table(table_name.to_string()).into());
    }
    info!(table = table_name, "dropped table");
    Ok(catalog)
}

/// Look up a table's schema by name.
pub fn get_table<'a>(catalog: &'a Catalog, table_name: &str) -> Result<&'a TableSchema> {
    catalog
        .get(table_name)
        .ok_or_else(|| NotFoundError::Table(table_name.to_string()).into())
}

/// List all table names in sorted order.
pub fn list_tables(catalog: &Catalog) -> Vec<String> {
    catalog.table_names().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::ColumnType;

    #[test]
    fn test_create_and_get_table() {
        let catalog = create_table(Catalog::new(), "users", &["name:str", "age:int"]).unwrap();

        let schema = get_table(&catalog, "users").unwrap();
        let names: Vec<&str> = schema.column_names().collect();
        assert_eq!(names, vec!["ID", "name", "age"]);
        assert_eq!(
            schema.column("age").map(|c| c.column_type),
            Some(ColumnType::Int)
        );
    }

    #[test]
    fn test_create_table_already_exists() {
        let catalog = create_table(Catalog::new(), "orders", &["total:int"]).unwrap();
        let snapshot = catalog.clone();

        let err = create_table(catalog.clone(), "orders", &["other:str"]).unwrap_err();
        assert!(
            err.to_string().contains("already exists"),
            "expected 'already exists' error, got: {err}"
        );
        assert_eq!(catalog, snapshot);
        assert_eq!(list_tables(&catalog), vec!["orders"]);
    }

    #[test]
    fn test_create_table_no_columns() {
        let catalog = create_table(Catalog::new(), "bare", &[] as &[&str]).unwrap();
        assert_eq!(get_table(&catalog, "bare").unwrap().columns().len(), 1);
    }

    #[test]
    fn test_create_table_malformed_spec() {
        let err = create_table(Catalog::new(), "t", &["name"]).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::MalformedColumn(_))
        ));
    }

    #[test]
    fn test_create_table_bad_type() {
        let err = create_table(Catalog::new(), "t", &["price:float"]).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("float"));
    }

    #[test]
    fn test_create_table_empty_name() {
        let err = create_table(Catalog::new(), "  ", &["a:int"]).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::EmptyTableName)));
    }

    #[test]
    fn test_create_table_rejects_path_like_name() {
        for name in ["../etc", "a/b", ".hidden", "with space"] {
            let err = create_table(Catalog::new(), name, &["a:int"]).unwrap_err();
            assert!(
                matches!(err, Error::Validation(ValidationError::InvalidTableName(_))),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_drop_table() {
        let catalog = create_table(Catalog::new(), "sessions", &["token:str"]).unwrap();
        let catalog = drop_table(catalog, "sessions").unwrap();
        assert!(catalog.is_empty());
        assert!(get_table(&catalog, "sessions").unwrap_err().is_not_found());
    }

    #[test]
    fn test_drop_missing_table() {
        let err = drop_table(Catalog::new(), "ghost").unwrap_err();
        assert!(matches!(err, Error::NotFound(NotFoundError::Table(t)) if t == "ghost"));
    }

    #[test]
    fn test_list_tables_sorted() {
        let mut catalog = Catalog::new();
        for name in ["zeta", "alpha", "mid"] {
            catalog = create_table(catalog, name, &["v:str"]).unwrap();
        }
        assert_eq!(list_tables(&catalog), vec!["alpha", "mid", "zeta"]);
    }
}
