use std::fmt::Write;

use rusqlite::{types::ValueRef, Connection, Row};

use crate::core::types::TextTable;
use crate::error::AppResult;

/// Runs a row-returning statement and renders every cell as text.
pub fn run_query(conn: &Connection, sql: &str) -> AppResult<TextTable> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();

    let mut rows = Vec::new();
    let mut r = stmt.query([])?;
    while let Some(row) = r.next()? {
        rows.push(row_to_text(row, columns.len())?);
    }

    Ok(TextTable { columns, rows })
}

/// Runs a statement batch for its side effects and returns how many rows it
/// inserted, updated or deleted.
pub fn run_execute(conn: &Connection, sql: &str) -> AppResult<u64> {
    // changes() keeps the count of the last DML statement across DDL, so the
    // delta of the running total is used instead.
    let before = total_changes(conn)?;
    conn.execute_batch(sql)?;
    let after = total_changes(conn)?;
    Ok(after.saturating_sub(before))
}

fn total_changes(conn: &Connection) -> AppResult<u64> {
    let n: i64 = conn.query_row("SELECT total_changes()", [], |r| r.get(0))?;
    Ok(n.max(0) as u64)
}

fn row_to_text(row: &Row<'_>, width: usize) -> AppResult<Vec<String>> {
    let mut out = Vec::with_capacity(width);
    for i in 0..width {
        out.push(render_cell(row.get_ref(i)?));
    }
    Ok(out)
}

/// A true NULL renders as the bare word `NULL`.
pub fn render_cell(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(x) => x.to_string(),
        ValueRef::Real(x) if x.is_finite() && x.fract() == 0.0 => format!("{x:.1}"),
        ValueRef::Real(x) => x.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => {
            let mut hex = String::with_capacity(b.len() * 2 + 3);
            hex.push_str("X'");
            for byte in b {
                let _ = write!(hex, "{byte:02X}");
            }
            hex.push('\'');
            hex
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_each_storage_class() {
        let conn = Connection::open_in_memory().unwrap();
        let t = run_query(
            &conn,
            "SELECT NULL AS n, 'NULL' AS s, 42 AS i, 45.0 AS r, 1.25 AS f, x'00ff' AS b",
        )
        .unwrap();
        assert_eq!(t.columns, ["n", "s", "i", "r", "f", "b"]);
        assert_eq!(t.rows, [["NULL", "NULL", "42", "45.0", "1.25", "X'00FF'"]]);
    }

    #[test]
    fn execute_counts_changed_rows() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(run_execute(&conn, "CREATE TABLE t (a INTEGER)").unwrap(), 0);
        assert_eq!(
            run_execute(&conn, "INSERT INTO t VALUES (1), (2), (3)").unwrap(),
            3
        );
        // DDL after DML doesn't repeat the previous count.
        assert_eq!(run_execute(&conn, "CREATE TABLE u (b INTEGER)").unwrap(), 0);
        assert_eq!(run_execute(&conn, "UPDATE t SET a = a + 1 WHERE a > 1").unwrap(), 2);
    }

    #[test]
    fn execute_accepts_comment_only_batch() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(run_execute(&conn, "-- LOCK TABLES t WRITE;").unwrap(), 0);
    }

    #[test]
    fn engine_errors_keep_message() {
        let conn = Connection::open_in_memory().unwrap();
        let err = run_query(&conn, "SELECT * FROM missing").unwrap_err();
        assert!(err.to_string().contains("no such table: missing"), "{err}");
    }
}
