//! Core types: column types, schemas, records and boundary values.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// Name of the identifier column every table starts with.
pub const ID_COLUMN: &str = "ID";

/// Canonical text of a true boolean.
pub const TRUE_LITERAL: &str = "True";

/// Canonical text of a false boolean.
pub const FALSE_LITERAL: &str = "False";

/// The declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Int,
    Str,
    Bool,
}

impl ColumnType {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::Str => "str",
            ColumnType::Bool => "bool",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(ColumnType::Int),
            "str" => Ok(ColumnType::Str),
            "bool" => Ok(ColumnType::Bool),
            other => Err(ValidationError::UnknownType(other.to_string())),
        }
    }
}

/// A column definition (name + type), persisted as `"name:type"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    /// The automatically managed `ID:int` column.
    pub fn id() -> Self {
        Self::new(ID_COLUMN, ColumnType::Int)
    }
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.column_type)
    }
}

impl FromStr for ColumnDef {
    type Err = ValidationError;

    /// Parse a `name:type` spec. Only the first `:` separates name from type.
    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let (name, ty) = spec
            .split_once(':')
            .ok_or_else(|| ValidationError::MalformedColumn(spec.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MalformedColumn(spec.to_string()));
        }
        Ok(Self::new(name, ty.trim().parse()?))
    }
}

impl TryFrom<String> for ColumnDef {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColumnDef> for String {
    fn from(def: ColumnDef) -> Self {
        def.to_string()
    }
}

/// Ordered column list of one table. The first column is always `ID:int`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ColumnDef>", into = "Vec<ColumnDef>")]
pub struct TableSchema {
    columns: Vec<ColumnDef>,
}

impl TableSchema {
    /// Build a schema from caller-declared columns, prepending `ID:int`.
    ///
    /// Rejects duplicate names and any attempt to declare `ID` explicitly.
    pub fn new(data_columns: Vec<ColumnDef>) -> Result<Self, ValidationError> {
        let mut columns = Vec::with_capacity(data_columns.len() + 1);
        columns.push(ColumnDef::id());
        for column in data_columns {
            if column.name == ID_COLUMN {
                return Err(ValidationError::ReservedColumn(column.name));
            }
            if columns.iter().any(|c: &ColumnDef| c.name == column.name) {
                return Err(ValidationError::DuplicateColumn(column.name));
            }
            columns.push(column);
        }
        Ok(Self { columns })
    }

    /// All columns, `ID` first.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Columns supplied by the caller on insert (everything but `ID`).
    pub fn data_columns(&self) -> &[ColumnDef] {
        &self.columns[1..]
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

impl TryFrom<Vec<ColumnDef>> for TableSchema {
    type Error = ValidationError;

    fn try_from(mut columns: Vec<ColumnDef>) -> Result<Self, Self::Error> {
        match columns.first() {
            Some(first) if *first == ColumnDef::id() => {
                columns.remove(0);
                Self::new(columns)
            }
            _ => Err(ValidationError::MalformedColumn(format!(
                "schema must start with {}",
                ColumnDef::id()
            ))),
        }
    }
}

impl From<TableSchema> for Vec<ColumnDef> {
    fn from(schema: TableSchema) -> Self {
        schema.columns
    }
}

/// A value at the engine boundary, before it is normalized to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Text(String),
    Boolean(bool),
}

impl Value {
    /// Interpret a console literal without knowing the target column.
    ///
    /// Quoted text keeps its inner characters, with `\<c>` escapes resolved;
    /// bare integers become `Integer`; `true`/`false` in any case become
    /// `Boolean`; anything else is `Text`.
    pub fn parse_literal(raw: &str) -> Value {
        let raw = raw.trim();
        if let Some(text) = unquote(raw) {
            return Value::Text(text);
        }
        if let Ok(n) = raw.parse::<i64>() {
            return Value::Integer(n);
        }
        parse_bool(raw).map_or_else(|| Value::Text(raw.to_string()), Value::Boolean)
    }

    /// Interpret a console literal destined for a column of type `ty`.
    ///
    /// Bare tokens for `str` columns are kept exactly as typed, so `007`
    /// stays `007`. Tokens that do not fit `int`/`bool` come back as `Text`
    /// and are rejected by validation.
    pub fn parse_typed(raw: &str, ty: ColumnType) -> Value {
        let raw = raw.trim();
        if let Some(text) = unquote(raw) {
            return Value::Text(text);
        }
        let parsed = match ty {
            ColumnType::Str => None,
            ColumnType::Int => raw.parse::<i64>().ok().map(Value::Integer),
            ColumnType::Bool => parse_bool(raw).map(Value::Boolean),
        };
        parsed.unwrap_or_else(|| Value::Text(raw.to_string()))
    }

    /// The textual form used for storage and for every equality comparison.
    pub fn canonical(&self) -> Cow<'_, str> {
        match self {
            Value::Integer(n) => Cow::Owned(n.to_string()),
            Value::Text(s) => Cow::Borrowed(s.as_str()),
            Value::Boolean(true) => Cow::Borrowed(TRUE_LITERAL),
            Value::Boolean(false) => Cow::Borrowed(FALSE_LITERAL),
        }
    }

    /// Whether a stored string equals this value's canonical form.
    pub fn matches(&self, stored: &str) -> bool {
        self.canonical() == stored
    }
}

/// Inner text of a `"..."` or `'...'` literal, with `\<c>` read as `<c>`.
fn unquote(raw: &str) -> Option<String> {
    let quote = raw.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    if raw.len() < 2 || !raw.ends_with(quote) {
        return None;
    }
    let mut out = String::with_capacity(raw.len() - 2);
    let mut chars = raw[1..raw.len() - 1].chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// One stored row: column name to text, in schema order.
///
/// Serialized as a JSON object whose key order is the column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column. Replaces the value if the column is already present.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    /// Overwrite an existing column. Returns false if the column is absent.
    pub fn set(&mut self, column: &str, value: impl Into<String>) -> bool {
        match self.fields.iter_mut().find(|(c, _)| c == column) {
            Some((_, existing)) => {
                *existing = value.into();
                true
            }
            None => false,
        }
    }

    /// The parsed `ID` column, if present and numeric.
    pub fn id(&self) -> Option<u64> {
        self.get(ID_COLUMN).and_then(|v| v.parse().ok())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(c, v)| (c.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.push(k, v);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (column, value) in &self.fields {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
                let mut record = Record::new();
                while let Some((column, value)) = access.next_entry::<String, String>()? {
                    record.push(column, value);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}
