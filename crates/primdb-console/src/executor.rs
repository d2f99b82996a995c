use std::time::Duration;

use primdb_core::api::{Clause, QueryEngine, TableInfo};
use primdb_core::catalog::Catalog;
use primdb_core::config::DbConfig;
use primdb_core::error::Error;
use primdb_core::types::{Record, Value};

use crate::commands::{Command, Condition};
use crate::middleware::{Confirm, Confirmed, confirm_action, timed};

/// Structured result from executing a command.
#[derive(Debug)]
pub enum CommandResult {
    /// Table created (CREATE_TABLE), with its full column list.
    Created { table: String, columns: Vec<String> },
    /// Table removed (DROP_TABLE).
    Dropped(String),
    /// Table list (LIST_TABLES).
    TableList(Vec<String>),
    /// Table schema and size (INFO).
    TableInfo(TableInfo),
    /// Row appended (INSERT).
    Inserted { table: String, id: u64 },
    /// Rows returned (SELECT), with the schema's column names for headers.
    Rows {
        table: String,
        columns: Vec<String>,
        rows: Vec<Record>,
    },
    /// Rows changed (UPDATE). Empty when nothing matched.
    Updated { table: String, ids: Vec<u64> },
    /// Rows removed (DELETE).
    Deleted { table: String, ids: Vec<u64> },
    /// The user declined a confirmation prompt; nothing was executed.
    Cancelled,
    /// Help text (optional topic for per-command help).
    Help(Option<String>),
    /// Exit signal.
    Exit,
}

/// A result plus how long the engine call took, when it was timed.
#[derive(Debug)]
pub struct Executed {
    pub result: CommandResult,
    pub timing: Option<(&'static str, Duration)>,
}

impl Executed {
    fn untimed(result: CommandResult) -> Self {
        Self {
            result,
            timing: None,
        }
    }

    fn timed(label: &'static str, result: CommandResult, elapsed: Duration) -> Self {
        Self {
            result,
            timing: Some((label, elapsed)),
        }
    }
}

/// Owns the engine and the canonical in-memory catalog.
///
/// The catalog is replaced only after the new version has been persisted, so
/// a failed save leaves the session on the last good catalog.
pub struct Session {
    engine: QueryEngine,
    catalog: Catalog,
}

impl Session {
    pub fn open(config: DbConfig) -> Result<Self, Error> {
        let engine = QueryEngine::open(config);
        let catalog = engine.load_catalog()?;
        Ok(Self { engine, catalog })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn engine(&self) -> &QueryEngine {
        &self.engine
    }

    /// Execute a parsed command.
    ///
    /// `drop_table` and `delete` ask `confirm` first; a refusal yields
    /// [`CommandResult::Cancelled`]. `insert` and `select` are timed.
    pub fn execute(&mut self, cmd: Command, confirm: &mut dyn Confirm) -> Result<Executed, Error> {
        match cmd {
            Command::CreateTable { name, columns } => self.exec_create_table(&name, &columns),
            Command::DropTable { name } => self.exec_drop_table(&name, confirm),
            Command::ListTables => Ok(Executed::untimed(CommandResult::TableList(
                self.engine.list_tables(&self.catalog),
            ))),
            Command::Info { name } => Ok(Executed::untimed(CommandResult::TableInfo(
                self.engine.describe_table(&self.catalog, &name)?,
            ))),
            Command::Insert { table, values } => {
                let values = self.insert_values(&table, &values);
                let (id, elapsed) =
                    timed("insert", || self.engine.insert(&self.catalog, &table, &values));
                Ok(Executed::timed(
                    "insert",
                    CommandResult::Inserted { table, id: id? },
                    elapsed,
                ))
            }
            Command::Select { table, filter } => {
                let filter = filter
                    .map(|condition| self.clause(&table, &condition))
                    .unwrap_or_default();
                let (rows, elapsed) =
                    timed("select", || self.engine.select(&self.catalog, &table, &filter));
                let rows = rows?;
                let columns = self
                    .catalog
                    .get(&table)
                    .map(|schema| schema.column_names().map(String::from).collect())
                    .unwrap_or_default();
                Ok(Executed::timed(
                    "select",
                    CommandResult::Rows {
                        table,
                        columns,
                        rows,
                    },
                    elapsed,
                ))
            }
            Command::Update { table, set, filter } => {
                let set = self.clause(&table, &set);
                let filter = self.clause(&table, &filter);
                let ids = self.engine.update(&self.catalog, &table, &set, &filter)?;
                Ok(Executed::untimed(CommandResult::Updated { table, ids }))
            }
            Command::Delete { table, filter } => {
                let filter = self.clause(&table, &filter);
                let outcome = confirm_action(confirm, "delete", || {
                    self.engine.delete(&self.catalog, &table, &filter)
                })?;
                Ok(Executed::untimed(match outcome {
                    Confirmed::Done(ids) => CommandResult::Deleted { table, ids },
                    Confirmed::Cancelled => CommandResult::Cancelled,
                }))
            }
            Command::Help(topic) => Ok(Executed::untimed(CommandResult::Help(topic))),
            Command::Exit => Ok(Executed::untimed(CommandResult::Exit)),
        }
    }

    fn exec_create_table(&mut self, name: &str, columns: &[String]) -> Result<Executed, Error> {
        let next = self
            .engine
            .create_table(self.catalog.clone(), name, columns)?;
        self.engine.save_catalog(&next)?;
        self.catalog = next;
        Ok(Executed::untimed(CommandResult::Created {
            table: name.to_string(),
            columns: self.column_specs(name),
        }))
    }

    fn exec_drop_table(&mut self, name: &str, confirm: &mut dyn Confirm) -> Result<Executed, Error> {
        let outcome = confirm_action(confirm, "drop table", || {
            let next = self.engine.drop_table(self.catalog.clone(), name)?;
            self.engine.save_catalog(&next)?;
            Ok::<_, Error>(next)
        })?;
        match outcome {
            Confirmed::Done(next) => {
                self.catalog = next;
                Ok(Executed::untimed(CommandResult::Dropped(name.to_string())))
            }
            Confirmed::Cancelled => Ok(Executed::untimed(CommandResult::Cancelled)),
        }
    }

    /// Read `literal` as a value for `table.column`. Unknown tables and
    /// columns fall back to untyped parsing; the engine reports them.
    fn typed_value(&self, table: &str, column: &str, literal: &str) -> Value {
        self.catalog
            .get(table)
            .and_then(|schema| schema.column(column))
            .map(|def| Value::parse_typed(literal, def.column_type))
            .unwrap_or_else(|| Value::parse_literal(literal))
    }

    /// Insert literals paired with the schema's non-ID columns in order.
    /// Surplus literals are parsed untyped so the count check still fires.
    fn insert_values(&self, table: &str, literals: &[String]) -> Vec<Value> {
        let types: Vec<_> = self
            .catalog
            .get(table)
            .map(|schema| schema.data_columns().iter().map(|c| c.column_type).collect())
            .unwrap_or_default();
        literals
            .iter()
            .enumerate()
            .map(|(i, literal)| match types.get(i) {
                Some(ty) => Value::parse_typed(literal, *ty),
                None => Value::parse_literal(literal),
            })
            .collect()
    }

    fn clause(&self, table: &str, condition: &Condition) -> Clause {
        Clause::eq(
            condition.column.clone(),
            self.typed_value(table, &condition.column, &condition.literal),
        )
    }

    /// `name:type` strings of a table's schema, or empty if unknown.
    fn column_specs(&self, table: &str) -> Vec<String> {
        self.catalog
            .get(table)
            .map(|schema| schema.columns().iter().map(|c| c.to_string()).collect())
            .unwrap_or_default()
    }
}
