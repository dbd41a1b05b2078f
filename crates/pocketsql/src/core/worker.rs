//! The single lane every session call goes through.
//!
//! A [`Session`] lives on its own thread and handles one task at a time in
//! submission order, so open/close/drop can never interleave with a running
//! statement. Handles are cheap to clone and usable from any thread.

use std::{path::PathBuf, sync::mpsc, thread};

use tokio::sync::oneshot;

use crate::{
    core::{router::Session, types::QueryResult},
    error::{AppError, AppResult},
};

#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionTask>,
}

impl SessionHandle {
    /// Creates the session (and its data directory) and starts the worker.
    pub fn spawn(data_dir: impl Into<PathBuf>) -> AppResult<Self> {
        let session = Session::new(data_dir)?;
        let (tx, rx) = mpsc::channel::<SessionTask>();
        thread::Builder::new()
            .name("pocketsql-session".into())
            .spawn(move || session_worker_main(session, rx))?;
        Ok(Self { tx })
    }

    pub async fn process(&self, sql: String) -> QueryResult {
        let res = self
            .call(|respond_to| SessionTask::Process { sql, respond_to })
            .await;
        // The lane only fails when the worker thread is gone.
        res.unwrap_or_else(|e| QueryResult::fail(e.to_string()))
    }

    pub async fn list_databases(&self) -> AppResult<Vec<String>> {
        self.call(|respond_to| SessionTask::ListDatabases { respond_to })
            .await?
    }

    pub async fn list_tables(&self) -> AppResult<Vec<String>> {
        self.call(|respond_to| SessionTask::ListTables { respond_to })
            .await?
    }

    pub async fn current_database_name(&self) -> AppResult<Option<String>> {
        self.call(|respond_to| SessionTask::Current { respond_to })
            .await
    }

    pub async fn is_open(&self) -> AppResult<bool> {
        Ok(self.current_database_name().await?.is_some())
    }

    pub async fn open_or_create(&self, name: String) -> AppResult<String> {
        self.call(|respond_to| SessionTask::Open { name, respond_to })
            .await?
    }

    pub async fn close(&self) -> AppResult<()> {
        self.call(|respond_to| SessionTask::Close { respond_to })
            .await
    }

    pub async fn export_bytes(&self) -> AppResult<Vec<u8>> {
        self.call(|respond_to| SessionTask::Export { respond_to })
            .await?
    }

    pub async fn load_sample(&self) -> AppResult<QueryResult> {
        self.call(|respond_to| SessionTask::LoadSample { respond_to })
            .await
    }

    async fn call<T>(
        &self,
        task: impl FnOnce(oneshot::Sender<T>) -> SessionTask,
    ) -> AppResult<T> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(task(tx))
            .map_err(|_| AppError::Internal("session worker unavailable".into()))?;
        rx.await
            .map_err(|_| AppError::Internal("session worker dropped response".into()))
    }
}

enum SessionTask {
    Process {
        sql: String,
        respond_to: oneshot::Sender<QueryResult>,
    },
    ListDatabases {
        respond_to: oneshot::Sender<AppResult<Vec<String>>>,
    },
    ListTables {
        respond_to: oneshot::Sender<AppResult<Vec<String>>>,
    },
    Current {
        respond_to: oneshot::Sender<Option<String>>,
    },
    Open {
        name: String,
        respond_to: oneshot::Sender<AppResult<String>>,
    },
    Close {
        respond_to: oneshot::Sender<()>,
    },
    Export {
        respond_to: oneshot::Sender<AppResult<Vec<u8>>>,
    },
    LoadSample {
        respond_to: oneshot::Sender<QueryResult>,
    },
}

fn session_worker_main(mut session: Session, rx: mpsc::Receiver<SessionTask>) {
    tracing::debug!(data_dir = %session.catalog().data_dir().display(), "session worker started");

    while let Ok(task) = rx.recv() {
        match task {
            SessionTask::Process { sql, respond_to } => {
                let _ = respond_to.send(session.process(&sql));
            }
            SessionTask::ListDatabases { respond_to } => {
                let _ = respond_to.send(session.list_databases());
            }
            SessionTask::ListTables { respond_to } => {
                let _ = respond_to.send(session.list_tables());
            }
            SessionTask::Current { respond_to } => {
                let _ = respond_to.send(session.current_database_name().map(str::to_string));
            }
            SessionTask::Open { name, respond_to } => {
                let _ = respond_to.send(session.open_or_create(&name));
            }
            SessionTask::Close { respond_to } => {
                session.close();
                let _ = respond_to.send(());
            }
            SessionTask::Export { respond_to } => {
                let _ = respond_to.send(session.export_bytes());
            }
            SessionTask::LoadSample { respond_to } => {
                let _ = respond_to.send(session.load_sample());
            }
        }
    }

    // Every handle is gone; dropping the session closes the connection.
    tracing::debug!("session worker stopped");
}
