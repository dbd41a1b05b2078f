//! Classification of raw input into meta-commands and engine statements.

/// What a single line of user input asks for.
///
/// Classification is total: anything that is not a recognised meta-command
/// is either a [`Command::Query`] or an [`Command::Action`], and the engine
/// decides whether it is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Empty,
    CreateDatabase { name: &'a str },
    DropDatabase { name: &'a str, if_exists: bool },
    UseDatabase { name: &'a str },
    ShowDatabases,
    ShowTables,
    ShowColumns { table: &'a str },
    Help,
    Exit,
    /// SELECT / PRAGMA / EXPLAIN: returns rows.
    Query(&'a str),
    /// Everything else (DDL/DML); runs through the dialect translator.
    Action(&'a str),
}

const QUERY_KEYWORDS: [&str; 3] = ["SELECT", "PRAGMA", "EXPLAIN"];
const EXIT_TOKENS: [&str; 5] = ["EXIT", "EXIT;", "QUIT", "QUIT;", "\\q"];

impl<'a> Command<'a> {
    /// Only engine statements require an open database; meta-commands
    /// either don't need one or report its absence themselves.
    pub fn needs_connection(&self) -> bool {
        matches!(self, Command::Query(_) | Command::Action(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Command::Empty => "empty",
            Command::CreateDatabase { .. } => "create_database",
            Command::DropDatabase { .. } => "drop_database",
            Command::UseDatabase { .. } => "use_database",
            Command::ShowDatabases => "show_databases",
            Command::ShowTables => "show_tables",
            Command::ShowColumns { .. } => "show_columns",
            Command::Help => "help",
            Command::Exit => "exit",
            Command::Query(_) => "query",
            Command::Action(_) => "action",
        }
    }
}

/// Classifies `raw`. Prefix checks run in a fixed priority order and the
/// first match wins.
pub fn classify(raw: &str) -> Command<'_> {
    let sql = raw.trim();
    if sql.is_empty() {
        return Command::Empty;
    }

    if let Some(rest) = strip_prefix_ci(sql, "CREATE DATABASE") {
        // Creating an existing database just opens it, so IF NOT EXISTS
        // changes nothing beyond being accepted.
        let rest = rest.trim();
        let name = strip_prefix_ci(rest, "IF NOT EXISTS ").map_or(rest, str::trim);
        return Command::CreateDatabase { name };
    }

    if let Some(rest) = strip_prefix_ci(sql, "DROP DATABASE") {
        let rest = rest.trim();
        return match strip_prefix_ci(rest, "IF EXISTS ") {
            Some(name) => Command::DropDatabase {
                name: name.trim(),
                if_exists: true,
            },
            None => Command::DropDatabase {
                name: rest,
                if_exists: false,
            },
        };
    }

    if let Some(rest) = strip_prefix_ci(sql, "USE ") {
        return Command::UseDatabase { name: rest.trim() };
    }

    if is_exact(sql, "SHOW DATABASES") {
        return Command::ShowDatabases;
    }
    if is_exact(sql, "SHOW TABLES") {
        return Command::ShowTables;
    }

    let described = strip_prefix_ci(sql, "SHOW COLUMNS FROM ")
        .or_else(|| strip_prefix_ci(sql, "DESC "))
        .or_else(|| strip_prefix_ci(sql, "DESCRIBE "));
    if let Some(rest) = described {
        return Command::ShowColumns {
            table: unquote(rest.trim().trim_end_matches(';').trim()),
        };
    }

    if is_exact(sql, "HELP") {
        return Command::Help;
    }
    if EXIT_TOKENS.iter().any(|t| sql.eq_ignore_ascii_case(t)) {
        return Command::Exit;
    }

    if QUERY_KEYWORDS
        .iter()
        .any(|k| first_keyword(sql).eq_ignore_ascii_case(k))
    {
        Command::Query(sql)
    } else {
        Command::Action(sql)
    }
}

/// Strips one matching pair of surrounding quotes (`'`, `"` or backtick).
pub(crate) fn unquote(s: &str) -> &str {
    for q in ['\'', '"', '`'] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// `word` or `word;`, nothing else.
fn is_exact(s: &str, word: &str) -> bool {
    let s = s.strip_suffix(';').unwrap_or(s);
    s.eq_ignore_ascii_case(word)
}

/// Leading whitespace-delimited token.
fn first_keyword(s: &str) -> &str {
    s.split_whitespace().next().unwrap_or("")
}
