use crate::core::types::TextTable;

const COLUMNS: [&str; 3] = ["Category", "Command", "Description"];

const ENTRIES: &[(&str, &str, &str)] = &[
    ("Basic", "CREATE DATABASE", "Creates a new database"),
    ("Basic", "DROP DATABASE", "Deletes a database"),
    ("Basic", "SHOW DATABASES", "Lists all databases"),
    ("Basic", "USE dbname", "Switches to database"),
    ("Basic", "SHOW TABLES", "Lists tables in database"),
    ("Basic", "DESC tablename", "Shows table structure"),
    ("Basic", "EXIT / QUIT", "Ends the session"),
    ("DDL", "CREATE TABLE", "Creates a new table"),
    ("DDL", "ALTER TABLE", "Renames a table or adds a column"),
    ("DDL", "DROP TABLE", "Deletes a table"),
    ("DDL", "CREATE INDEX", "Creates an index on table columns"),
    ("DML", "INSERT INTO", "Adds rows to a table"),
    ("DML", "UPDATE", "Modifies existing rows"),
    ("DML", "DELETE FROM", "Removes rows from a table"),
    ("DML", "TRUNCATE TABLE", "Removes all rows (runs as DELETE FROM)"),
    ("Query", "SELECT", "Reads rows from tables"),
    ("Query", "EXPLAIN QUERY PLAN", "Shows how a query will run"),
    ("Query", "PRAGMA", "Reads or sets engine settings"),
    ("MySQL", "AUTO_INCREMENT", "Rewritten to INTEGER PRIMARY KEY AUTOINCREMENT"),
    ("MySQL", "ENUM(...)", "Stored as TEXT"),
    ("MySQL", "INSERT IGNORE", "Rewritten to INSERT OR IGNORE"),
    ("MySQL", "NOW()", "Rewritten to CURRENT_TIMESTAMP"),
    ("MySQL", "ENGINE= / CHARSET=", "Ignored"),
];

/// The rows shown by `HELP`.
pub fn help_table() -> TextTable {
    TextTable {
        columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows: ENTRIES
            .iter()
            .map(|(category, command, description)| {
                vec![category.to_string(), command.to_string(), description.to_string()]
            })
            .collect(),
    }
}
