use crate::commands::{Command, Condition};

/// Tokenize an input line into a vector of string tokens.
///
/// Handles:
/// - Whitespace-separated words
/// - Quoted strings: `"hello world"` or `'hello world'` becomes a single token
///   (quotes preserved)
/// - Value lists: when `(` is encountered, scans to the matching `)` (tracking
///   quoted strings inside), returning the entire `(...)` as one token
/// - `=` as a separate token, so `age=30` and `age = 30` read the same
fn tokenize(input: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let mut i = 0;

    while i < len {
        // Skip whitespace.
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }

        // Value list.
        if chars[i] == '(' {
            let start = i;
            let mut depth = 0;
            let mut quote: Option<char> = None;
            loop {
                if i >= len {
                    return Err("Unterminated value list: missing ')'".to_string());
                }
                let c = chars[i];
                match quote {
                    Some(q) => {
                        if c == '\\' {
                            // Skip escaped character.
                            i += 1;
                        } else if c == q {
                            quote = None;
                        }
                    }
                    None => match c {
                        '"' | '\'' => quote = Some(c),
                        '(' => depth += 1,
                        ')' => {
                            depth -= 1;
                            if depth == 0 {
                                i += 1;
                                break;
                            }
                        }
                        _ => {}
                    },
                }
                i += 1;
            }
            let token: String = chars[start..i].iter().collect();
            tokens.push(token);
            continue;
        }

        // Quoted string.
        if chars[i] == '"' || chars[i] == '\'' {
            let q = chars[i];
            let start = i;
            i += 1;
            while i < len && chars[i] != q {
                if chars[i] == '\\' {
                    i += 1; // skip escaped char
                }
                i += 1;
            }
            if i >= len {
                return Err("Unterminated quoted string".to_string());
            }
            i += 1; // skip closing quote
            let token: String = chars[start..i].iter().collect();
            tokens.push(token);
            continue;
        }

        if chars[i] == '=' {
            tokens.push("=".to_string());
            i += 1;
            continue;
        }

        // Regular word token: everything up to whitespace, quote, paren, or `=`.
        let start = i;
        while i < len
            && !chars[i].is_whitespace()
            && chars[i] != '"'
            && chars[i] != '\''
            && chars[i] != '('
            && chars[i] != '='
        {
            i += 1;
        }
        if i > start {
            let token: String = chars[start..i].iter().collect();
            tokens.push(token);
        }
    }

    Ok(tokens)
}

/// Split the inside of a `( ... )` value list on commas outside quotes.
fn split_values(inner: &str) -> Result<Vec<String>, String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    current.push(c);
                }
                ',' => parts.push(std::mem::take(&mut current)),
                _ => current.push(c),
            },
        }
    }
    if quote.is_some() {
        return Err("Unterminated quoted string in value list".to_string());
    }
    parts.push(current);

    let parts: Vec<String> = parts.into_iter().map(|p| p.trim().to_string()).collect();
    if parts.len() == 1 && parts[0].is_empty() {
        return Ok(Vec::new());
    }
    if let Some(pos) = parts.iter().position(String::is_empty) {
        return Err(format!("Empty value at position {} in value list", pos + 1));
    }
    Ok(parts)
}

/// Split a `( v1, v2, ... )` token into its raw literals.
fn parse_values(token: &str) -> Result<Vec<String>, String> {
    if !(token.starts_with('(') && token.ends_with(')')) || token.len() < 2 {
        return Err(
            "Values must be a parenthesized list: insert into <table> values (<v1>, <v2>, ...)"
                .to_string(),
        );
    }
    let inner = &token[1..token.len() - 1];
    split_values(inner)
}

/// Parse `<col> = <value>` starting at `tokens[at]`.
fn parse_condition(tokens: &[String], at: usize, keyword: &str) -> Result<Condition, String> {
    if tokens.len() < at + 3 {
        return Err(format!("Expected <column> = <value> after {keyword}"));
    }
    if tokens[at + 1] != "=" {
        return Err(format!(
            "Expected '=' after '{}' in {keyword} clause, got '{}'",
            tokens[at],
            tokens[at + 1]
        ));
    }
    Ok(Condition::new(tokens[at].clone(), tokens[at + 2].clone()))
}

/// Expect `tokens[at]` to be `keyword` (case-insensitive).
fn expect_keyword(tokens: &[String], at: usize, keyword: &str, usage: &str) -> Result<(), String> {
    match tokens.get(at) {
        Some(t) if t.eq_ignore_ascii_case(keyword) => Ok(()),
        Some(t) => Err(format!("Expected {}, got '{t}'. Usage: {usage}", keyword.to_uppercase())),
        None => Err(format!("Usage: {usage}")),
    }
}

fn reject_trailing(tokens: &[String], expected_len: usize, usage: &str) -> Result<(), String> {
    if tokens.len() > expected_len {
        return Err(format!(
            "Unexpected '{}'. Usage: {usage}",
            tokens[expected_len..].join(" ")
        ));
    }
    Ok(())
}

/// Parse an input line into a [`Command`].
pub fn parse(input: &str) -> Result<Command, String> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err("Empty command".to_string());
    }

    let first = tokens[0].to_lowercase();
    match first.as_str() {
        "create_table" => parse_create_table(&tokens),
        "drop_table" => parse_drop_table(&tokens),
        "list_tables" => {
            reject_trailing(&tokens, 1, "list_tables")?;
            Ok(Command::ListTables)
        }
        "info" => parse_info(&tokens),
        "insert" => parse_insert(&tokens),
        "select" => parse_select(&tokens),
        "update" => parse_update(&tokens),
        "delete" => parse_delete(&tokens),
        "help" => {
            let topic = if tokens.len() > 1 {
                Some(tokens[1..].join(" "))
            } else {
                None
            };
            Ok(Command::Help(topic))
        }
        "exit" | "quit" => Ok(Command::Exit),
        _ => Err(format!("Unknown command '{}'. Type help for a list.", tokens[0])),
    }
}

/// create_table <name> <col:type> [<col:type> ...]
fn parse_create_table(tokens: &[String]) -> Result<Command, String> {
    if tokens.len() < 2 {
        return Err(
            "Usage: create_table <name> <column:type> ...  (types: int, str, bool)".to_string(),
        );
    }
    Ok(Command::CreateTable {
        name: tokens[1].clone(),
        columns: tokens[2..].to_vec(),
    })
}

/// drop_table <name>
fn parse_drop_table(tokens: &[String]) -> Result<Command, String> {
    const USAGE: &str = "drop_table <name>";
    if tokens.len() < 2 {
        return Err(format!("Usage: {USAGE}"));
    }
    reject_trailing(tokens, 2, USAGE)?;
    Ok(Command::DropTable {
        name: tokens[1].clone(),
    })
}

/// info <name>
fn parse_info(tokens: &[String]) -> Result<Command, String> {
    const USAGE: &str = "info <name>";
    if tokens.len() < 2 {
        return Err(format!("Usage: {USAGE}"));
    }
    reject_trailing(tokens, 2, USAGE)?;
    Ok(Command::Info {
        name: tokens[1].clone(),
    })
}

/// insert into <table> values (<v1>, <v2>, ...)
fn parse_insert(tokens: &[String]) -> Result<Command, String> {
    const USAGE: &str = "insert into <table> values (<v1>, <v2>, ...)";
    expect_keyword(tokens, 1, "into", USAGE)?;
    let table = tokens
        .get(2)
        .cloned()
        .ok_or_else(|| format!("Usage: {USAGE}"))?;
    expect_keyword(tokens, 3, "values", USAGE)?;
    let list = tokens.get(4).ok_or_else(|| format!("Usage: {USAGE}"))?;
    reject_trailing(tokens, 5, USAGE)?;
    Ok(Command::Insert {
        table,
        values: parse_values(list)?,
    })
}

/// select from <table> [where <col> = <value>]
fn parse_select(tokens: &[String]) -> Result<Command, String> {
    const USAGE: &str = "select from <table> [where <column> = <value>]";
    expect_keyword(tokens, 1, "from", USAGE)?;
    let table = tokens
        .get(2)
        .cloned()
        .ok_or_else(|| format!("Usage: {USAGE}"))?;
    let filter = if tokens.len() > 3 {
        expect_keyword(tokens, 3, "where", USAGE)?;
        let condition = parse_condition(tokens, 4, "WHERE")?;
        reject_trailing(tokens, 7, USAGE)?;
        Some(condition)
    } else {
        None
    };
    Ok(Command::Select { table, filter })
}

/// update <table> set <col> = <value> where <col> = <value>
fn parse_update(tokens: &[String]) -> Result<Command, String> {
    const USAGE: &str = "update <table> set <column> = <value> where <column> = <value>";
    let table = tokens
        .get(1)
        .cloned()
        .ok_or_else(|| format!("Usage: {USAGE}"))?;
    expect_keyword(tokens, 2, "set", USAGE)?;
    let set = parse_condition(tokens, 3, "SET")?;
    expect_keyword(tokens, 6, "where", USAGE)?;
    let filter = parse_condition(tokens, 7, "WHERE")?;
    reject_trailing(tokens, 10, USAGE)?;
    Ok(Command::Update { table, set, filter })
}

/// delete from <table> where <col> = <value>
fn parse_delete(tokens: &[String]) -> Result<Command, String> {
    const USAGE: &str = "delete from <table> where <column> = <value>";
    expect_keyword(tokens, 1, "from", USAGE)?;
    let table = tokens
        .get(2)
        .cloned()
        .ok_or_else(|| format!("Usage: {USAGE}"))?;
    expect_keyword(tokens, 3, "where", USAGE)?;
    let filter = parse_condition(tokens, 4, "WHERE")?;
    reject_trailing(tokens, 7, USAGE)?;
    Ok(Command::Delete { table, filter })
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Tokenizer
    // -----------------------------------------------------------------------

    #[test]
    fn test_tokenize_splits_equals() {
        assert_eq!(
            tokenize("select from t where age=30").unwrap(),
            vec!["select", "from", "t", "where", "age", "=", "30"]
        );
    }

    #[test]
    fn test_tokenize_keeps_value_list_whole() {
        assert_eq!(
            tokenize(r#"insert into t values ("a, b", 1)"#).unwrap(),
            vec!["insert", "into", "t", "values", r#"("a, b", 1)"#]
        );
    }

    #[test]
    fn test_tokenize_quoted_word() {
        assert_eq!(
            tokenize("where name = 'Al Bo'").unwrap(),
            vec!["where", "name", "=", "'Al Bo'"]
        );
    }

    #[test]
    fn test_tokenize_unterminated() {
        assert!(tokenize("values (1, 2").is_err());
        assert!(tokenize("where name = \"Al").is_err());
    }

    // -----------------------------------------------------------------------
    // CREATE / DROP / LIST / INFO
    // -----------------------------------------------------------------------

    #[test]
    fn test_create_table() {
        let cmd = parse("create_table users name:str age:int").unwrap();
        assert_eq!(
            cmd,
            Command::CreateTable {
                name: "users".to_string(),
                columns: vec!["name:str".to_string(), "age:int".to_string()],
            }
        );
    }

    #[test]
    fn test_create_table_missing_name() {
        let err = parse("create_table").unwrap_err();
        assert!(err.contains("Usage"), "{err}");
    }

    #[test]
    fn test_drop_table() {
        assert_eq!(
            parse("DROP_TABLE users").unwrap(),
            Command::DropTable {
                name: "users".to_string()
            }
        );
        assert!(parse("drop_table").is_err());
        assert!(parse("drop_table a b").is_err());
    }

    #[test]
    fn test_list_and_info() {
        assert_eq!(parse("list_tables").unwrap(), Command::ListTables);
        assert_eq!(
            parse("info users").unwrap(),
            Command::Info {
                name: "users".to_string()
            }
        );
    }

    // -----------------------------------------------------------------------
    // INSERT
    // -----------------------------------------------------------------------

    #[test]
    fn test_insert_values() {
        let cmd = parse(r#"insert into users values ("Al", 30, true)"#).unwrap();
        assert_eq!(
            cmd,
            Command::Insert {
                table: "users".to_string(),
                values: vec!["\"Al\"".to_string(), "30".to_string(), "true".to_string()],
            }
        );
    }

    #[test]
    fn test_insert_quoted_comma() {
        let Command::Insert { values, .. } =
            parse(r#"insert into t values ('a, b', "c")"#).unwrap()
        else {
            panic!("Expected Insert");
        };
        assert_eq!(values, vec!["'a, b'", "\"c\""]);
    }

    #[test]
    fn test_insert_empty_list() {
        let Command::Insert { values, .. } = parse("insert into t values ()").unwrap() else {
            panic!("Expected Insert");
        };
        assert!(values.is_empty());
    }

    #[test]
    fn test_insert_bad_shape() {
        assert!(parse("insert users values (1)").is_err());
        assert!(parse("insert into users (1)").is_err());
        assert!(parse("insert into users values 1").is_err());
        assert!(parse("insert into users values (1,,2)").is_err());
    }

    // -----------------------------------------------------------------------
    // SELECT / UPDATE / DELETE
    // -----------------------------------------------------------------------

    #[test]
    fn test_select_all() {
        assert_eq!(
            parse("select from users").unwrap(),
            Command::Select {
                table: "users".to_string(),
                filter: None,
            }
        );
    }

    #[test]
    fn test_select_where() {
        assert_eq!(
            parse("SELECT FROM users WHERE age = 28").unwrap(),
            Command::Select {
                table: "users".to_string(),
                filter: Some(Condition::new("age", "28")),
            }
        );
    }

    #[test]
    fn test_select_where_keeps_quotes() {
        let Command::Select { filter, .. } = parse(r#"select from t where code = "007""#).unwrap()
        else {
            panic!("Expected Select");
        };
        assert_eq!(filter, Some(Condition::new("code", "\"007\"")));
    }

    #[test]
    fn test_select_bad_where() {
        assert!(parse("select from users where age").is_err());
        assert!(parse("select from users where age > 3").is_err());
        assert!(parse("select from users age = 3").is_err());
    }

    #[test]
    fn test_update() {
        assert_eq!(
            parse("update users set age = 31 where name = Al").unwrap(),
            Command::Update {
                table: "users".to_string(),
                set: Condition::new("age", "31"),
                filter: Condition::new("name", "Al"),
            }
        );
    }

    #[test]
    fn test_update_requires_where() {
        let err = parse("update users set age = 31").unwrap_err();
        assert!(err.contains("WHERE") || err.contains("Usage"), "{err}");
    }

    #[test]
    fn test_delete() {
        assert_eq!(
            parse("delete from users where ID = 1").unwrap(),
            Command::Delete {
                table: "users".to_string(),
                filter: Condition::new("ID", "1"),
            }
        );
        assert!(parse("delete from users").is_err());
    }

    // -----------------------------------------------------------------------
    // Misc
    // -----------------------------------------------------------------------

    #[test]
    fn test_help_and_exit() {
        assert_eq!(parse("help").unwrap(), Command::Help(None));
        assert_eq!(
            parse("help insert").unwrap(),
            Command::Help(Some("insert".to_string()))
        );
        assert_eq!(parse("exit").unwrap(), Command::Exit);
        assert_eq!(parse("QUIT").unwrap(), Command::Exit);
    }

    #[test]
    fn test_unknown_and_empty() {
        assert!(parse("frobnicate").unwrap_err().contains("Unknown command"));
        assert_eq!(parse("   ").unwrap_err(), "Empty command");
    }
}
