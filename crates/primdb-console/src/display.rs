use std::time::Duration;

use comfy_table::{Cell, Table, presets};
use primdb_core::api::{TableInfo, join_ids};
use primdb_core::types::Record;
use serde_json::{Value, json};

use crate::executor::{CommandResult, Executed};

/// Output mode for rendering command results.
pub enum OutputMode {
    /// Human-readable tables and messages.
    Pretty,
    /// Machine-parseable JSON (one JSON object per result on stdout).
    Json,
}

/// Render an executed command to stdout, followed by its timing line when
/// `show_timing` is set.
///
/// Returns `true` to continue execution, `false` to signal exit.
pub fn render_executed(executed: &Executed, mode: &OutputMode, show_timing: bool) -> bool {
    let keep_going = render(&executed.result, mode);
    if let Some((label, elapsed)) = executed.timing.filter(|_| show_timing) {
        render_timing(label, elapsed, mode);
    }
    keep_going
}

/// Render a command result to stdout in the given mode.
///
/// Returns `true` to continue execution, `false` to signal exit.
pub fn render(result: &CommandResult, mode: &OutputMode) -> bool {
    match result {
        CommandResult::Created { table, columns } => match mode {
            OutputMode::Pretty => print_ok(&format!(
                "Table \"{table}\" successfully created with columns: {}",
                columns.join(", ")
            )),
            OutputMode::Json => println!(
                "{}",
                json!({"ok": true, "created": table, "columns": columns})
            ),
        },
        CommandResult::Dropped(table) => match mode {
            OutputMode::Pretty => print_ok(&format!("Table \"{table}\" successfully deleted.")),
            OutputMode::Json => println!("{}", json!({"ok": true, "dropped": table})),
        },
        CommandResult::TableList(tables) => match mode {
            OutputMode::Pretty => print_table_list(tables),
            OutputMode::Json => println!("{}", json!({"tables": tables})),
        },
        CommandResult::TableInfo(info) => match mode {
            OutputMode::Pretty => print_table_info(info),
            OutputMode::Json => println!(
                "{}",
                json!({
                    "name": info.name,
                    "columns": info.schema,
                    "rows": info.row_count,
                })
            ),
        },
        CommandResult::Inserted { table, id } => match mode {
            OutputMode::Pretty => print_ok(&format!(
                "Record with ID={id} successfully added to table \"{table}\"."
            )),
            OutputMode::Json => println!("{}", json!({"ok": true, "table": table, "id": id})),
        },
        CommandResult::Rows {
            table: _,
            columns,
            rows,
        } => match mode {
            OutputMode::Pretty => print_rows(columns, rows),
            OutputMode::Json => println!(
                "{}",
                json!({"rows": rows, "count": rows.len()})
            ),
        },
        CommandResult::Updated { table, ids } => match mode {
            OutputMode::Pretty => {
                if ids.is_empty() {
                    print_ok("No records matched; nothing updated.");
                } else {
                    print_ok(&format!(
                        "Record(s) with ID={} in table \"{table}\" successfully updated.",
                        join_ids(ids)
                    ));
                }
            }
            OutputMode::Json => {
                println!("{}", json!({"ok": true, "table": table, "updated": ids}))
            }
        },
        CommandResult::Deleted { table, ids } => match mode {
            OutputMode::Pretty => print_ok(&format!(
                "Record(s) with ID={} successfully deleted from table \"{table}\".",
                join_ids(ids)
            )),
            OutputMode::Json => {
                println!("{}", json!({"ok": true, "table": table, "deleted": ids}))
            }
        },
        CommandResult::Cancelled => match mode {
            OutputMode::Pretty => print_ok("Operation cancelled."),
            OutputMode::Json => println!("{}", json!({"ok": false, "cancelled": true})),
        },
        CommandResult::Help(topic) => match mode {
            OutputMode::Pretty => render_help_pretty(topic.as_deref()),
            OutputMode::Json => render_help_json(topic.as_deref()),
        },
        CommandResult::Exit => return false,
    }
    true
}

/// Render an error in the given mode (always to stderr).
pub fn render_error(err: &dyn std::fmt::Display, mode: &OutputMode) {
    match mode {
        OutputMode::Pretty => print_error(err),
        OutputMode::Json => {
            eprintln!("{}", json!({"error": err.to_string()}));
        }
    }
}

/// Report how long a timed operation took. Goes to stderr in JSON mode so
/// stdout stays one object per result.
pub fn render_timing(label: &str, elapsed: Duration, mode: &OutputMode) {
    match mode {
        OutputMode::Pretty => println!("{}", timing_line(label, elapsed)),
        OutputMode::Json => eprintln!(
            "{}",
            json!({"operation": label, "seconds": elapsed.as_secs_f64()})
        ),
    }
}

pub fn timing_line(label: &str, elapsed: Duration) -> String {
    format!(
        "Function {label} finished in {:.3} seconds",
        elapsed.as_secs_f64()
    )
}

// ---- Pretty-print helpers ----

/// Print a list of table names.
pub fn print_table_list(tables: &[String]) {
    if tables.is_empty() {
        println!("No tables.");
    } else {
        for name in tables {
            println!("- {name}");
        }
    }
}

/// Print a table's columns and row count.
pub fn print_table_info(info: &TableInfo) {
    println!("Table: {}", info.name);
    let columns: Vec<String> = info.schema.columns().iter().map(|c| c.to_string()).collect();
    println!("  Columns: {}", columns.join(", "));
    println!("  Rows:    {}", info.row_count);
}

/// Print rows as a bordered text table.
pub fn print_rows(columns: &[String], rows: &[Record]) {
    if rows.is_empty() {
        println!("No records found.");
        return;
    }
    println!("{}", format_table(columns, rows));
}

/// Lay rows out under `columns`, one cell per column in header order.
/// Cells missing from a record are left blank.
pub fn format_table(columns: &[String], rows: &[Record]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::ASCII_FULL_CONDENSED);
    table.set_header(columns.iter().map(Cell::new));
    for row in rows {
        table.add_row(columns.iter().map(|c| Cell::new(row.get(c).unwrap_or(""))));
    }
    table
}

/// Print a success message.
pub fn print_ok(msg: &str) {
    println!("{msg}");
}

/// Print an error message to stderr.
pub fn print_error(err: &dyn std::fmt::Display) {
    eprintln!("Error: {err}");
}

// ---------------------------------------------------------------------------
// Structured per-command help
// ---------------------------------------------------------------------------

struct CommandHelp {
    name: &'static str,
    summary: &'static str,
    syntax: &'static str,
    details: &'static str,
    examples: &'static [&'static str],
}

const COMMANDS: &[CommandHelp] = &[
    CommandHelp {
        name: "create_table",
        summary: "Create a new table",
        syntax: "create_table <name> <column:type> [<column:type> ...]",
        details: "\
Column types: int, str, bool.
An ID:int column is added automatically as the first column and holds \
each row's identifier. Declaring ID yourself is an error.",
        examples: &[
            "create_table users name:str age:int",
            "create_table flags label:str enabled:bool",
        ],
    },
    CommandHelp {
        name: "drop_table",
        summary: "Delete a table and all its data",
        syntax: "drop_table <name>",
        details: "Asks for confirmation, then removes the table from the catalog along with its data file.",
        examples: &["drop_table users"],
    },
    CommandHelp {
        name: "list_tables",
        summary: "Show all tables",
        syntax: "list_tables",
        details: "Prints one table name per line in sorted order, or \"No tables.\" if there are none.",
        examples: &["list_tables"],
    },
    CommandHelp {
        name: "info",
        summary: "Show a table's columns and row count",
        syntax: "info <name>",
        details: "",
        examples: &["info users"],
    },
    CommandHelp {
        name: "insert",
        summary: "Add a record to a table",
        syntax: "insert into <table> values (<value1>, <value2>, ...)",
        details: "\
Supply one value per column, excluding ID, in the order the columns were declared.
Quoted values are text, with \\\" and \\' read as quote characters.
Bare values are read by column type: int takes integers, bool takes
true/false in any case, and str keeps the text exactly as typed.
The new record's ID is one more than any ID the table has ever used.",
        examples: &[
            "insert into users values (\"Alice\", 30)",
            "insert into flags values ('dark mode', true)",
        ],
    },
    CommandHelp {
        name: "select",
        summary: "Read records from a table",
        syntax: "select from <table> [where <column> = <value>]",
        details: "Without a where clause, returns every record in stored order.",
        examples: &["select from users", "select from users where age = 30"],
    },
    CommandHelp {
        name: "update",
        summary: "Change a column on matching records",
        syntax: "update <table> set <column> = <value> where <column> = <value>",
        details: "The ID column cannot be set. The new value must match the column's type.",
        examples: &["update users set age = 31 where name = \"Alice\""],
    },
    CommandHelp {
        name: "delete",
        summary: "Remove matching records",
        syntax: "delete from <table> where <column> = <value>",
        details: "Asks for confirmation. It is an error if no record matches.",
        examples: &["delete from users where ID = 0"],
    },
    CommandHelp {
        name: "help",
        summary: "Show this overview, or detailed help for a command",
        syntax: "help [command]",
        details: "",
        examples: &["help", "help insert"],
    },
    CommandHelp {
        name: "exit",
        summary: "Exit the console",
        syntax: "exit",
        details: "",
        examples: &["exit"],
    },
];

fn find_command(topic: &str) -> Option<&'static CommandHelp> {
    let lower = topic.trim().to_lowercase();
    COMMANDS.iter().find(|cmd| cmd.name == lower)
}

fn render_help_pretty(topic: Option<&str>) {
    match topic {
        None => print_help_overview(),
        Some(t) => match find_command(t) {
            Some(cmd) => print_command_help(cmd),
            None => {
                println!("Unknown help topic '{t}'. Type help to see available commands.");
            }
        },
    }
}

fn print_help_overview() {
    println!("PrimDB Console: Command Reference");
    println!();
    for cmd in COMMANDS {
        println!("  {:<54} {}", cmd.syntax, cmd.summary);
    }
    println!();
    println!("Type help <command> for detailed usage and examples.");
}

fn print_command_help(cmd: &CommandHelp) {
    println!("{}: {}", cmd.name, cmd.summary);
    println!();
    println!("Syntax:");
    println!("  {}", cmd.syntax);
    if !cmd.details.is_empty() {
        println!();
        for line in cmd.details.lines() {
            println!("{line}");
        }
    }
    if !cmd.examples.is_empty() {
        println!();
        println!("Examples:");
        for ex in cmd.examples {
            println!("  {ex}");
        }
    }
}

fn render_help_json(topic: Option<&str>) {
    match topic {
        None => {
            let commands: Vec<Value> = COMMANDS
                .iter()
                .map(|cmd| {
                    json!({
                        "name": cmd.name,
                        "syntax": cmd.syntax,
                        "summary": cmd.summary,
                    })
                })
                .collect();
            println!("{}", json!({ "commands": commands }));
        }
        Some(t) => match find_command(t) {
            Some(cmd) => {
                println!(
                    "{}",
                    json!({
                        "command": cmd.name,
                        "summary": cmd.summary,
                        "syntax": cmd.syntax,
                        "details": cmd.details,
                        "examples": cmd.examples,
                    })
                );
            }
            None => {
                eprintln!("{}", json!({"error": format!("Unknown help topic '{t}'")}));
            }
        },
    }
}
