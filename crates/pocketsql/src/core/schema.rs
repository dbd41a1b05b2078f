use rusqlite::Connection;

use crate::core::{query, types::TextTable};
use crate::error::{AppError, AppResult};

/// User tables, ordered by name. SQLite bookkeeping tables and the Android
/// locale table some imported files carry are hidden.
pub fn list_tables(conn: &Connection) -> AppResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master \
         WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != 'android_metadata' \
         ORDER BY name",
    )?;
    let rows = stmt
        .query_map([], |r| r.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Column metadata for `table` as reported by `PRAGMA table_info`.
pub fn table_info(conn: &Connection, table: &str) -> AppResult<TextTable> {
    // Table names can't be bound as parameters in a PRAGMA, so only plain
    // identifiers are let through.
    if !is_safe_table_ref(table) {
        return Err(AppError::InvalidRequest(format!(
            "invalid table identifier: {table}"
        )));
    }
    query::run_query(conn, &format!("PRAGMA table_info({table})"))
}

pub(crate) fn is_safe_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else { return false };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `table` or `schema.table`.
pub(crate) fn is_safe_table_ref(s: &str) -> bool {
    match s.split_once('.') {
        None => is_safe_identifier(s),
        Some((schema, table)) => is_safe_identifier(schema) && is_safe_identifier(table),
    }
}
