//! Value validation against a table schema.

use crate::catalog::Catalog;
use crate::catalog::ops::get_table;
use crate::error::{Result, ValidationError};
use crate::types::{ColumnDef, ColumnType, FALSE_LITERAL, TRUE_LITERAL, Value};

/// Check a candidate row against the table's non-ID columns.
///
/// Fails with `NotFound` for an unknown table, and with a `ValidationError`
/// naming the first offending column when the count or a type is wrong.
pub fn validate(catalog: &Catalog, table: &str, values: &[Value]) -> Result<()> {
    let schema = get_table(catalog, table)?;
    let columns = schema.data_columns();
    if values.len() != columns.len() {
        return Err(ValidationError::ValueCount {
            table: table.to_string(),
            expected: columns.len(),
            actual: values.len(),
        }
        .into());
    }
    for (value, column) in values.iter().zip(columns) {
        validate_value(column, value)?;
    }
    Ok(())
}

/// Check one value against one column's declared type.
///
/// - `int`: an integer, or text that parses as one.
/// - `bool`: a boolean, or exactly `True` / `False`.
/// - `str`: anything.
pub fn validate_value(column: &ColumnDef, value: &Value) -> std::result::Result<(), ValidationError> {
    let ok = match (column.column_type, value) {
        (ColumnType::Int, Value::Integer(_)) => true,
        (ColumnType::Int, Value::Text(s)) => s.parse::<i64>().is_ok(),
        (ColumnType::Int, Value::Boolean(_)) => false,
        (ColumnType::Bool, Value::Boolean(_)) => true,
        (ColumnType::Bool, Value::Text(s)) => s == TRUE_LITERAL || s == FALSE_LITERAL,
        (ColumnType::Bool, Value::Integer(_)) => false,
        (ColumnType::Str, _) => true,
    };
    if ok {
        Ok(())
    } else {
        Err(ValidationError::TypeMismatch {
            column: column.name.clone(),
            expected: column.column_type,
            value: value.canonical().into_owned(),
        })
    }
}
