use clap::Parser;

use pocketsql::{adapters, cli::Args, logging, AppResult};

fn main() -> AppResult<()> {
    let args = Args::parse();
    logging::init(&args.log_level);
    adapters::bridge::run(args)
}
