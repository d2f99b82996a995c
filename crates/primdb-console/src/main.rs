use std::io::{BufRead, IsTerminal};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use primdb_core::config::DbConfig;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

mod commands;
mod display;
mod executor;
mod middleware;
mod parser;

use display::OutputMode;
use executor::Session;
use middleware::{AutoConfirm, Confirm, catch_errors, is_yes};

/// PrimDB Console: interactive and scriptable CLI for a PrimDB directory.
#[derive(Parser, Debug)]
#[command(name = "primdb", version)]
struct Cli {
    /// Database root holding db_meta.json and data/ (default: current directory).
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Execute a command non-interactively (can be repeated).
    #[arg(short, long = "exec")]
    exec: Vec<String>,

    /// Output results as machine-parseable JSON.
    #[arg(short, long)]
    json: bool,

    /// Answer "y" to every confirmation prompt in exec and pipe modes.
    #[arg(short, long)]
    yes: bool,

    /// Disable the select result cache.
    #[arg(long)]
    no_cache: bool,

    /// Do not print how long insert and select took.
    #[arg(long)]
    no_timing: bool,
}

impl Cli {
    fn config(&self) -> DbConfig {
        let root = self.dir.clone().unwrap_or_else(|| PathBuf::from("."));
        DbConfig::new(root).cache(!self.no_cache)
    }

    fn mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Pretty
        }
    }
}

/// Result of running one input line.
#[derive(Debug, PartialEq)]
enum Step {
    Continue,
    Exit,
    Failed,
}

impl Confirm for DefaultEditor {
    fn confirm(&mut self, prompt: &str) -> bool {
        match self.readline(prompt) {
            Ok(answer) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

fn history_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("primdb").join("history.txt"))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mode = cli.mode();

    let Some(mut session) = catch_errors(&mode, || Session::open(cli.config())) else {
        process::exit(1);
    };
    let show_timing = !cli.no_timing;

    if !cli.exec.is_empty() {
        let code = run_exec_mode(&mut session, &cli.exec, &mode, cli.yes, show_timing);
        process::exit(code);
    } else if !std::io::stdin().is_terminal() {
        let code = run_pipe_mode(&mut session, &mode, cli.yes, show_timing);
        process::exit(code);
    } else {
        run_repl(&mut session, show_timing);
    }
}

/// Parse, execute and render one line. Errors are rendered, not returned.
fn run_line(
    session: &mut Session,
    line: &str,
    mode: &OutputMode,
    confirm: &mut dyn Confirm,
    show_timing: bool,
) -> Step {
    let Some(cmd) = catch_errors(mode, || parser::parse(line)) else {
        return Step::Failed;
    };
    let Some(executed) = catch_errors(mode, || session.execute(cmd, confirm)) else {
        return Step::Failed;
    };
    if display::render_executed(&executed, mode, show_timing) {
        Step::Continue
    } else {
        Step::Exit
    }
}

/// Execute one or more commands non-interactively (--exec mode).
///
/// Returns exit code: 0 = all succeeded, 1 = first error stops execution.
fn run_exec_mode(
    session: &mut Session,
    commands: &[String],
    mode: &OutputMode,
    yes: bool,
    show_timing: bool,
) -> i32 {
    let mut confirm = AutoConfirm(yes);
    for cmd_str in commands {
        match run_line(session, cmd_str, mode, &mut confirm, show_timing) {
            Step::Continue => {}
            Step::Exit => return 0,
            Step::Failed => return 1,
        }
    }
    0
}

/// Read commands from stdin (pipe mode).
///
/// Returns exit code: 0 = all succeeded, 1 = first error.
fn run_pipe_mode(session: &mut Session, mode: &OutputMode, yes: bool, show_timing: bool) -> i32 {
    let mut confirm = AutoConfirm(yes);
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                display::render_error(&e, mode);
                return 1;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match run_line(session, trimmed, mode, &mut confirm, show_timing) {
            Step::Continue => {}
            Step::Exit => return 0,
            Step::Failed => return 1,
        }
    }
    0
}

/// Interactive REPL mode. Errors are reported and the loop continues.
fn run_repl(session: &mut Session, show_timing: bool) {
    println!("PrimDB Console v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "Database: {} ({} table(s))",
        session.engine().config().root().display(),
        session.catalog().len()
    );
    println!("Type help for available commands.\n");

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            display::print_error(&e);
            return;
        }
    };
    let history = history_path();
    if let Some(path) = &history {
        // Missing on first run.
        let _ = rl.load_history(path);
    }

    loop {
        match rl.readline("primdb> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                let step = run_line(session, trimmed, &OutputMode::Pretty, &mut rl, show_timing);
                if step == Step::Exit {
                    println!("Bye!");
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!();
            }
            Err(ReadlineError::Eof) => {
                println!("Bye!");
                break;
            }
            Err(e) => {
                eprintln!("Readline error: {e}");
                break;
            }
        }
    }

    if let Some(path) = &history {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = rl.save_history(path) {
            tracing::debug!(path = %path.display(), error = %e, "could not save history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn exec(dir: &std::path::Path, commands: &[&str], yes: bool) -> i32 {
        let mut session = Session::open(DbConfig::new(dir)).unwrap();
        let commands: Vec<String> = commands.iter().map(|c| c.to_string()).collect();
        run_exec_mode(&mut session, &commands, &OutputMode::Json, yes, false)
    }

    // ---- Cli parsing tests ----

    #[test]
    fn test_cli_no_args() {
        let cli = Cli::try_parse_from(["bin"]).unwrap();
        assert!(cli.dir.is_none());
        assert!(cli.exec.is_empty());
        assert!(!cli.json);
        assert!(!cli.yes);
        assert!(cli.config().cache_enabled());
    }

    #[test]
    fn test_cli_dir() {
        let cli = Cli::try_parse_from(["bin", "--dir", "/tmp/db"]).unwrap();
        assert_eq!(cli.dir, Some(PathBuf::from("/tmp/db")));
        assert_eq!(
            cli.config().metadata_path(),
            PathBuf::from("/tmp/db/db_meta.json")
        );
    }

    #[test]
    fn test_cli_exec_multiple() {
        let cli =
            Cli::try_parse_from(["bin", "-e", "list_tables", "--exec", "help insert"]).unwrap();
        assert_eq!(cli.exec, vec!["list_tables", "help insert"]);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from(["bin", "-j", "-y", "--no-cache", "--no-timing"]).unwrap();
        assert!(cli.json);
        assert!(cli.yes);
        assert!(cli.no_timing);
        assert!(!cli.config().cache_enabled());
    }

    #[test]
    fn test_cli_exec_missing_value() {
        assert!(Cli::try_parse_from(["bin", "--exec"]).is_err());
    }

    #[test]
    fn test_cli_unknown_flag() {
        assert!(Cli::try_parse_from(["bin", "--verbose"]).is_err());
    }

    // ---- exec mode integration tests ----

    #[test]
    fn test_exec_list_tables_empty() {
        let dir = tempdir().unwrap();
        assert_eq!(exec(dir.path(), &["list_tables"], false), 0);
    }

    #[test]
    fn test_exec_full_session() {
        let dir = tempdir().unwrap();
        let code = exec(
            dir.path(),
            &[
                "create_table users name:str age:int",
                "insert into users values (\"Al\", 30)",
                "insert into users values (Bo, 25)",
                "update users set age = 26 where name = Bo",
                "select from users where age = 26",
                "delete from users where ID = 0",
                "info users",
            ],
            true,
        );
        assert_eq!(code, 0);

        let data = std::fs::read_to_string(dir.path().join("data/users.json")).unwrap();
        let rows: serde_json::Value = serde_json::from_str(&data).unwrap();
        assert_eq!(
            rows,
            serde_json::json!([{"ID": "1", "name": "Bo", "age": "26"}])
        );
    }

    #[test]
    fn test_exec_error_stops_early() {
        let dir = tempdir().unwrap();
        let code = exec(
            dir.path(),
            &["select from missing", "create_table t v:str"],
            false,
        );
        assert_eq!(code, 1);
        assert!(!dir.path().join("db_meta.json").exists());
    }

    #[test]
    fn test_exec_parse_error_returns_1() {
        let dir = tempdir().unwrap();
        assert_eq!(exec(dir.path(), &["gibberish here"], false), 1);
    }

    #[test]
    fn test_exec_delete_without_yes_is_cancelled() {
        let dir = tempdir().unwrap();
        let code = exec(
            dir.path(),
            &[
                "create_table t v:str",
                "insert into t values (a)",
                "delete from t where v = a",
            ],
            false,
        );
        assert_eq!(code, 0);
        assert!(dir.path().join("data/t.json").exists());
    }

    #[test]
    fn test_exec_exit_stops_without_error() {
        let dir = tempdir().unwrap();
        let code = exec(dir.path(), &["exit", "select from missing"], false);
        assert_eq!(code, 0);
    }
}
