use std::{path::PathBuf, time::Instant};

use rusqlite::Connection;

use crate::{
    core::{
        catalog::{normalize_db_name, Catalog},
        command::{classify, Command},
        help::help_table,
        query,
        sample::{ecommerce_script, SAMPLE_DATABASE},
        translate::translate,
        types::{QueryResult, TextTable},
    },
    error::{AppError, AppResult},
};

const NO_DATABASE_HINT: &str =
    "No database is open. Use 'CREATE DATABASE dbname;' or 'USE dbname;'";

/// One user session: a catalog plus the command router in front of it.
///
/// `process` never fails; every error ends up in a failed [`QueryResult`].
/// Calls must be serialized (see [`crate::core::worker::SessionHandle`]).
pub struct Session {
    catalog: Catalog,
}

impl Session {
    pub fn new(data_dir: impl Into<PathBuf>) -> AppResult<Self> {
        Ok(Self {
            catalog: Catalog::new(data_dir)?,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn process(&mut self, raw: &str) -> QueryResult {
        let command = classify(raw);
        let span = tracing::debug_span!("process", kind = command.kind());
        let _enter = span.enter();

        if command.needs_connection() && !self.catalog.is_open() {
            return QueryResult::fail(NO_DATABASE_HINT);
        }

        let result = match command {
            Command::Empty => QueryResult::fail("Empty SQL command"),
            Command::CreateDatabase { name } => self.create_database(name),
            Command::DropDatabase { name, if_exists } => self.drop_database(name, if_exists),
            Command::UseDatabase { name } => self.use_database(name),
            Command::ShowDatabases => self.show_databases(),
            Command::ShowTables => self.show_tables(),
            Command::ShowColumns { table } => self.show_columns(table),
            Command::Help => QueryResult::table("PocketSQL Command Reference:", help_table()),
            Command::Exit => QueryResult::exit(),
            Command::Query(sql) => self.engine(|conn| {
                let table = query::run_query(conn, sql)?;
                Ok(QueryResult::table(
                    format!("Query returned {} row(s)", table.rows.len()),
                    table,
                ))
            }),
            Command::Action(sql) => self.engine(|conn| {
                let translated = translate(sql);
                if translated != sql {
                    tracing::debug!(original = sql, translated = %translated, "dialect rewrite");
                }
                let changed = query::run_execute(conn, &translated)?;
                Ok(QueryResult::ok("Command executed successfully").with_rows_affected(changed))
            }),
        };

        if !result.success {
            tracing::debug!(message = %result.message, "command failed");
        }
        result
    }

    pub fn list_databases(&self) -> AppResult<Vec<String>> {
        self.catalog.list_databases()
    }

    pub fn list_tables(&self) -> AppResult<Vec<String>> {
        self.catalog.list_tables()
    }

    pub fn current_database_name(&self) -> Option<&str> {
        self.catalog.current_database_name()
    }

    pub fn is_open(&self) -> bool {
        self.catalog.is_open()
    }

    pub fn open_or_create(&mut self, name: &str) -> AppResult<String> {
        self.catalog.open_or_create(name)
    }

    pub fn close(&mut self) {
        self.catalog.close();
    }

    pub fn export_bytes(&self) -> AppResult<Vec<u8>> {
        self.catalog.export_bytes()
    }

    /// Opens `ecommerce.db` and runs the sample script through `process`.
    pub fn load_sample(&mut self) -> QueryResult {
        let db = match self.catalog.open_or_create(SAMPLE_DATABASE) {
            Ok(db) => db,
            Err(e) => {
                tracing::warn!(error = %e, "sample database open failed");
                return QueryResult::fail("Failed to create sample database");
            }
        };

        let script = ecommerce_script();
        let mut failures = Vec::new();
        for sql in script {
            let r = self.process(sql);
            if !r.success {
                tracing::warn!(sql = %sql, message = %r.message, "sample statement failed");
                failures.push(r.message);
            }
        }

        let executed = script.len() - failures.len();
        match failures.first() {
            None => QueryResult::ok(format!(
                "Sample database '{db}' ready ({executed} commands executed)"
            )),
            Some(first) => QueryResult::message(
                false,
                format!(
                    "Sample database '{db}' incomplete: {} of {} commands failed, first: {first}",
                    failures.len(),
                    script.len()
                ),
            ),
        }
    }

    /// Gate, timer and error boundary around one engine call.
    fn engine(&self, run: impl FnOnce(&Connection) -> AppResult<QueryResult>) -> QueryResult {
        let Ok(conn) = self.catalog.connection() else {
            return QueryResult::fail(NO_DATABASE_HINT);
        };
        let started = Instant::now();
        let result = run(conn);
        let elapsed = started.elapsed();
        match result {
            Ok(r) => r.with_elapsed(elapsed),
            Err(e) => QueryResult::fail(e.to_string()).with_elapsed(elapsed),
        }
    }

    fn create_database(&mut self, name: &str) -> QueryResult {
        let Ok(db) = normalize_db_name(name) else {
            return QueryResult::fail("Invalid database name");
        };
        match self.catalog.open_or_create(&db) {
            Ok(db) => QueryResult::ok(format!("Database '{db}' created and opened successfully")),
            Err(e) => {
                tracing::warn!(db = %db, error = %e, "create database failed");
                QueryResult::fail(format!("Failed to create database '{db}'"))
            }
        }
    }

    fn use_database(&mut self, name: &str) -> QueryResult {
        let Ok(db) = normalize_db_name(name) else {
            return QueryResult::fail("Invalid database name");
        };
        match self.catalog.use_database(&db) {
            Ok(db) => QueryResult::ok(format!("Switched to database '{db}'")),
            Err(e) => {
                tracing::warn!(db = %db, error = %e, "use database failed");
                QueryResult::fail(format!("Failed to open database '{db}'"))
            }
        }
    }

    fn drop_database(&mut self, name: &str, if_exists: bool) -> QueryResult {
        let Ok(db) = normalize_db_name(name) else {
            return QueryResult::fail("Invalid database name");
        };
        match self.catalog.drop_database(&db) {
            Ok(db) => QueryResult::ok(format!("Database '{db}' dropped successfully")),
            Err(AppError::DatabaseNotFound(db)) if if_exists => {
                QueryResult::ok(format!("Database '{db}' does not exist, nothing dropped"))
            }
            Err(e @ AppError::DatabaseNotFound(_)) => QueryResult::fail(e.to_string()),
            Err(e) => {
                tracing::warn!(db = %db, error = %e, "drop database failed");
                QueryResult::fail(format!("Failed to drop database '{db}'"))
            }
        }
    }

    fn show_databases(&self) -> QueryResult {
        match self.catalog.list_databases() {
            Ok(names) => single_column(
                "Database".to_string(),
                names,
                |n| format!("Found {n} database(s)"),
            ),
            Err(e) => {
                tracing::warn!(error = %e, "listing databases failed");
                QueryResult::fail("Failed to list databases")
            }
        }
    }

    fn show_tables(&self) -> QueryResult {
        let Some(db) = self.catalog.current_database_name() else {
            return QueryResult::fail("No database is open");
        };
        let header = format!("Tables_in_{db}");
        self.engine(|conn| {
            let tables = crate::core::schema::list_tables(conn)?;
            Ok(single_column(header, tables, |n| format!("Found {n} table(s)")))
        })
    }

    fn show_columns(&self, table: &str) -> QueryResult {
        if !self.catalog.is_open() {
            return QueryResult::fail("No database is open");
        }
        if table.is_empty() {
            return QueryResult::fail("Invalid SHOW COLUMNS syntax. Use: SHOW COLUMNS FROM tablename;");
        }
        self.engine(|_| {
            let info = self.catalog.describe(table)?;
            Ok(QueryResult::table(
                format!("Query returned {} row(s)", info.rows.len()),
                info,
            ))
        })
    }
}

fn single_column(
    header: String,
    values: Vec<String>,
    message: impl FnOnce(usize) -> String,
) -> QueryResult {
    let message = message(values.len());
    QueryResult::table(
        message,
        TextTable {
            columns: vec![header],
            rows: values.into_iter().map(|v| vec![v]).collect(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> (tempfile::TempDir, Session) {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(dir.path()).unwrap();
        (dir, session)
    }

    #[test]
    fn empty_input_fails() {
        let (_dir, mut s) = session();
        let r = s.process("   ");
        assert!(!r.success);
        assert!(r.message.contains("Empty SQL command"));
    }

    #[test]
    fn exit_without_database() {
        let (_dir, mut s) = session();
        let r = s.process("EXIT;");
        assert!(r.success && r.exit_requested);
        assert_eq!(r.message, "Bye");
        assert!(s.process("\\q").exit_requested);
    }

    #[test]
    fn statements_need_open_database() {
        let (_dir, mut s) = session();
        for sql in ["SELECT 1", "CREATE TABLE t (a INT)"] {
            let r = s.process(sql);
            assert!(!r.success);
            assert_eq!(r.message, format!("ERROR: {NO_DATABASE_HINT}"));
        }
        assert_eq!(s.process("SHOW TABLES").message, "ERROR: No database is open");
        assert_eq!(s.process("DESC t").message, "ERROR: No database is open");
    }

    #[test]
    fn select_literal() {
        let (_dir, mut s) = session();
        s.process("CREATE DATABASE shop;");
        let r = s.process("SELECT 1 as x;");
        assert!(r.success, "{}", r.message);
        assert_eq!(r.columns, ["x"]);
        assert_eq!(r.rows, [["1"]]);
        assert_eq!(r.rows_affected, 1);
        assert_eq!(r.message, "Query returned 1 row(s)");
    }

    #[test]
    fn create_then_show_tables() {
        let (_dir, mut s) = session();
        let r = s.process("CREATE DATABASE shop;");
        assert_eq!(r.message, "Database 'shop.db' created and opened successfully");
        let r = s.process("SHOW TABLES;");
        assert!(r.success);
        assert_eq!(r.columns, ["Tables_in_shop.db"]);
        assert!(r.rows.is_empty());
        assert_eq!(r.message, "Found 0 table(s)");
    }

    #[test]
    fn invalid_names() {
        let (_dir, mut s) = session();
        assert_eq!(s.process("CREATE DATABASE ;").message, "ERROR: Invalid database name");
        assert_eq!(s.process("USE '.db'").message, "ERROR: Invalid database name");
        assert_eq!(s.process("DROP DATABASE").message, "ERROR: Invalid database name");
    }

    #[test]
    fn action_is_translated() {
        let (_dir, mut s) = session();
        s.process("CREATE DATABASE shop");
        let r = s.process(
            "CREATE TABLE users (id INT AUTO_INCREMENT PRIMARY KEY, role ENUM('a','b'), created DATETIME DEFAULT NOW()) ENGINE=InnoDB;",
        );
        assert!(r.success, "{}", r.message);
        assert_eq!(r.message, "Command executed successfully");

        let r = s.process("INSERT IGNORE INTO users (role) VALUES ('a'), ('b');");
        assert!(r.success, "{}", r.message);
        assert_eq!(r.rows_affected, 2);

        let r = s.process("SELECT id, role FROM users ORDER BY id");
        assert_eq!(r.rows, [["1", "a"], ["2", "b"]]);
    }

    #[test]
    fn engine_errors_are_prefixed() {
        let (_dir, mut s) = session();
        s.process("CREATE DATABASE shop");
        let r = s.process("SELECT * FROM nope");
        assert!(!r.success);
        assert_eq!(r.message, "ERROR: no such table: nope");

        s.process("CREATE TABLE t (a INT)");
        let r = s.process("CREATE TABLE t (a INT)");
        assert!(r.message.starts_with("ERROR: "));
        assert!(r.message.contains("already exists"));
    }

    #[test]
    fn describe_table() {
        let (_dir, mut s) = session();
        s.process("CREATE DATABASE shop");
        s.process("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)");
        let r = s.process("DESCRIBE users;");
        assert!(r.success, "{}", r.message);
        assert_eq!(r.columns[1], "name");
        assert_eq!(r.rows.len(), 2);
        assert_eq!(r.rows[1][1], "name");
        assert_eq!(r.rows[1][2], "TEXT");
    }

    #[test]
    fn help_lists_commands() {
        let (_dir, mut s) = session();
        let r = s.process("help;");
        assert!(r.success);
        assert_eq!(r.message, "PocketSQL Command Reference:");
        assert_eq!(r.columns, ["Category", "Command", "Description"]);
        assert_eq!(r.rows_affected as usize, r.rows.len());
        assert!(r.rows.iter().any(|row| row[1] == "SHOW TABLES"));
    }

    #[test]
    fn drop_variants() {
        let (_dir, mut s) = session();
        let r = s.process("DROP DATABASE ghost;");
        assert!(!r.success);
        assert_eq!(r.message, "ERROR: Database 'ghost.db' does not exist");

        let r = s.process("DROP DATABASE IF EXISTS ghost;");
        assert!(r.success);

        s.process("CREATE DATABASE shop");
        let r = s.process("DROP DATABASE shop;");
        assert_eq!(r.message, "Database 'shop.db' dropped successfully");
        assert!(!s.is_open());
        assert_eq!(s.current_database_name(), None);
    }

    #[test]
    fn sample_database_loads() {
        let (_dir, mut s) = session();
        let r = s.load_sample();
        assert!(r.success, "{}", r.message);
        assert_eq!(s.current_database_name(), Some("ecommerce.db"));
        assert_eq!(
            s.list_tables().unwrap(),
            ["categories", "order_items", "orders", "products", "users"]
        );
        let r = s.process("SELECT COUNT(*) AS n FROM products");
        assert_eq!(r.rows, [["8"]]);
        // Loading twice rebuilds instead of duplicating.
        assert!(s.load_sample().success);
        assert_eq!(s.process("SELECT COUNT(*) FROM users").rows, [["5"]]);
    }
}
