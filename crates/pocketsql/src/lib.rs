pub mod adapters;
pub mod cli;
pub mod core;
pub mod error;
pub mod logging;

pub use crate::core::{
    command::{classify, Command},
    error_code::ErrorCode,
    router::Session,
    translate::translate,
    types::QueryResult,
    worker::SessionHandle,
};
pub use crate::error::{AppError, AppResult};
