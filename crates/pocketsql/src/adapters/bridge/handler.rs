use std::{fs, path::Path};

use serde::Serialize;
use serde_json::Value;

use crate::{
    core::{error_code::ErrorCode, worker::SessionHandle},
    error::{AppError, AppResult},
};

use super::protocol::*;

pub struct BridgeHandler {
    session: SessionHandle,
    exit_requested: bool,
}

impl BridgeHandler {
    pub fn new(session: SessionHandle) -> Self {
        Self {
            session,
            exit_requested: false,
        }
    }

    /// Set once a processed command asked the host to quit.
    pub fn should_exit(&self) -> bool {
        self.exit_requested
    }

    pub async fn handle(&mut self, req: BridgeRequest) -> BridgeResponse<Value> {
        if req.v != PROTOCOL_VERSION {
            return BridgeResponse::err(
                req.v,
                req.id,
                "INVALID_REQUEST",
                format!("unsupported protocol version: {}", req.v),
            );
        }

        match req.cmd.as_str() {
            "process" => self.handle_process(req).await,
            "databases" => {
                let r = self.session.list_databases().await;
                respond::<DatabasesResult>(req, r)
            }
            "tables" => {
                let r = self.session.list_tables().await;
                respond::<TablesResult>(req, r)
            }
            "current" => {
                let r = self.session.current_database_name().await;
                respond::<CurrentResult>(req, r)
            }
            "open" => self.handle_open(req).await,
            "close" => {
                let r = self.session.close().await.map(|()| true);
                respond(req, r)
            }
            "export" => self.handle_export(req).await,
            "sample" => {
                let r = self.session.load_sample().await;
                respond(req, r)
            }
            other => BridgeResponse::err(
                req.v,
                req.id,
                "INVALID_REQUEST",
                format!("unknown cmd: {other}"),
            ),
        }
    }

    async fn handle_process(&mut self, req: BridgeRequest) -> BridgeResponse<Value> {
        let p: ProcessPayload = match payload(&req) {
            Ok(v) => v,
            Err(e) => return err(req, e),
        };
        let result = self.session.process(p.sql).await;
        if result.exit_requested {
            self.exit_requested = true;
        }
        let mysql_error = (!result.success).then(|| ErrorCode::format(&result.message));
        respond(req, Ok(ProcessData { result, mysql_error }))
    }

    async fn handle_open(&mut self, req: BridgeRequest) -> BridgeResponse<Value> {
        let p: OpenPayload = match payload(&req) {
            Ok(v) => v,
            Err(e) => return err(req, e),
        };
        let r = self.session.open_or_create(p.name).await;
        respond(req, r)
    }

    async fn handle_export(&mut self, req: BridgeRequest) -> BridgeResponse<Value> {
        let p: ExportPayload = match payload(&req) {
            Ok(v) => v,
            Err(e) => return err(req, e),
        };
        let r = match self.session.export_bytes().await {
            Ok(bytes) => write_atomically(&p.dest, &bytes).map(|()| ExportData {
                bytes: bytes.len(),
                dest: p.dest,
            }),
            Err(e) => Err(e),
        };
        respond(req, r)
    }
}

/// Writes next to `dest` first and renames, so a partial copy never sits
/// under the final name.
fn write_atomically(dest: &Path, bytes: &[u8]) -> AppResult<()> {
    let mut partial = dest.as_os_str().to_owned();
    partial.push(".partial");
    let partial = Path::new(&partial);

    if let Err(e) = fs::write(partial, bytes).and_then(|()| fs::rename(partial, dest)) {
        let _ = fs::remove_file(partial);
        return Err(e.into());
    }
    tracing::info!(dest = %dest.display(), bytes = bytes.len(), "database exported");
    Ok(())
}

fn payload<T: serde::de::DeserializeOwned>(req: &BridgeRequest) -> AppResult<T> {
    serde_json::from_value(req.payload.clone()).map_err(|e| AppError::InvalidRequest(e.to_string()))
}

fn respond<T: Serialize>(req: BridgeRequest, r: AppResult<T>) -> BridgeResponse<Value> {
    match r.and_then(|v| Ok(serde_json::to_value(v)?)) {
        Ok(v) => BridgeResponse::ok(req.v, req.id, v),
        Err(e) => err(req, e),
    }
}

fn err(req: BridgeRequest, e: AppError) -> BridgeResponse<Value> {
    BridgeResponse::err(req.v, req.id, e.code(), e.to_string())
}
