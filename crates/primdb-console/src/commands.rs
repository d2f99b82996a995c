/// One `<column> = <literal>` condition. The literal is kept as typed
/// (quotes included) until the column's type is known.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub literal: String,
}

impl Condition {
    pub fn new(column: impl Into<String>, literal: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            literal: literal.into(),
        }
    }
}

/// A parsed console command.
#[derive(Debug, PartialEq)]
pub enum Command {
    CreateTable {
        name: String,
        columns: Vec<String>,
    },
    DropTable {
        name: String,
    },
    ListTables,
    Info {
        name: String,
    },
    Insert {
        table: String,
        /// Raw literals, one per non-ID column.
        values: Vec<String>,
    },
    Select {
        table: String,
        filter: Option<Condition>,
    },
    Update {
        table: String,
        set: Condition,
        filter: Condition,
    },
    Delete {
        table: String,
        filter: Condition,
    },
    Help(Option<String>),
    Exit,
}
