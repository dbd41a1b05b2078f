pub mod catalog;
pub mod command;
pub mod error_code;
pub mod help;
pub mod query;
pub mod router;
pub mod sample;
pub mod schema;
pub mod translate;
pub mod types;
pub mod worker;
