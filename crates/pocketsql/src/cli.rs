use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "pocketsql")]
pub struct Args {
    /// Directory holding the `.db` files managed by CREATE/USE/DROP DATABASE.
    #[arg(long, env = "POCKETSQL_DATA_DIR", default_value = "./databases")]
    pub data_dir: PathBuf,

    /// Logging level (stderr). Also supports RUST_LOG.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Create and open the sample e-commerce database before reading requests.
    #[arg(long)]
    pub sample: bool,
}
