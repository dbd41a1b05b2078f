//! MySQL-style error codes for failed results.
//!
//! Purely presentational: the router reports engine messages verbatim and
//! hosts that want `ERROR 1146 (42S02): ...` output run them through
//! [`ErrorCode::from_message`].

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ErrorCode {
    pub code: u16,
    pub sql_state: &'static str,
}

impl ErrorCode {
    pub const BAD_DB: ErrorCode = ErrorCode { code: 1049, sql_state: "42000" };
    pub const TABLE_EXISTS: ErrorCode = ErrorCode { code: 1050, sql_state: "42S01" };
    pub const PARSE_ERROR: ErrorCode = ErrorCode { code: 1064, sql_state: "42000" };
    pub const NO_SUCH_TABLE: ErrorCode = ErrorCode { code: 1146, sql_state: "42S02" };

    /// Picks a code by substring; unknown messages fall back to 1064.
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("no such table") || lower.contains("doesn't exist") {
            Self::NO_SUCH_TABLE
        } else if lower.contains("no database") {
            Self::BAD_DB
        } else if lower.contains("syntax error") {
            Self::PARSE_ERROR
        } else if lower.contains("already exists") {
            Self::TABLE_EXISTS
        } else {
            Self::PARSE_ERROR
        }
    }

    /// `ERROR <code> (<state>): <message>` with any `ERROR: ` prefix removed.
    pub fn format(message: &str) -> String {
        let bare = message.strip_prefix("ERROR: ").unwrap_or(message);
        let code = Self::from_message(bare);
        format!("ERROR {} ({}): {}", code.code, code.sql_state, bare)
    }
}
