use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::types::QueryResult;

pub const PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BridgeRequest {
    pub v: u32,
    pub id: String,
    pub cmd: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct BridgeResponse<T> {
    pub v: u32,
    pub id: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl<T> BridgeResponse<T> {
    pub fn ok(v: u32, id: String, data: T) -> Self {
        Self {
            v,
            id,
            status: "ok",
            data: Some(data),
            error: None,
            code: None,
        }
    }

    pub fn err(v: u32, id: String, code: &'static str, error: String) -> Self {
        Self {
            v,
            id,
            status: "error",
            data: None,
            error: Some(error),
            code: Some(code),
        }
    }
}

// Payloads

#[derive(Debug, Deserialize)]
pub struct ProcessPayload {
    pub sql: String,
}

#[derive(Debug, Deserialize)]
pub struct OpenPayload {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportPayload {
    pub dest: PathBuf,
}

// Response data

/// A processed command. Failed commands are still `status: "ok"` at the
/// protocol level; `mysql_error` carries the display form of the failure.
#[derive(Debug, Serialize)]
pub struct ProcessData {
    #[serde(flatten)]
    pub result: QueryResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mysql_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExportData {
    pub dest: PathBuf,
    pub bytes: usize,
}

pub type DatabasesResult = Vec<String>;
pub type TablesResult = Vec<String>;
pub type CurrentResult = Option<String>;
