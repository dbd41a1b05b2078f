use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Column names plus rows of already-rendered cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Outcome of one submitted command.
///
/// Every command produces the same shape; meta-commands that only report a
/// message leave `columns`/`rows` empty, queries fill them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
    #[serde(default)]
    pub rows_affected: u64,
    #[serde(rename = "elapsed_ms", with = "duration_ms", default)]
    pub elapsed: Duration,
    #[serde(default)]
    pub exit_requested: bool,
}

impl QueryResult {
    pub fn message(success: bool, message: impl Into<String>) -> Self {
        Self {
            success,
            message: message.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            rows_affected: 0,
            elapsed: Duration::ZERO,
            exit_requested: false,
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self::message(true, message)
    }

    /// Failure result; the message is prefixed with `ERROR: `.
    pub fn fail(message: impl AsRef<str>) -> Self {
        Self::message(false, format!("ERROR: {}", message.as_ref()))
    }

    pub fn table(message: impl Into<String>, table: TextTable) -> Self {
        let rows_affected = table.rows.len() as u64;
        Self {
            columns: table.columns,
            rows: table.rows,
            rows_affected,
            ..Self::ok(message)
        }
    }

    pub fn exit() -> Self {
        Self {
            exit_requested: true,
            ..Self::ok("Bye")
        }
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn with_rows_affected(mut self, rows_affected: u64) -> Self {
        self.rows_affected = rows_affected;
        self
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
