mod cli;
mod logging;

use clap::Parser;

use hive_rows::{adapters::replay, AppResult};

use crate::cli::Args;

fn main() -> AppResult<()> {
    let args = Args::parse();
    logging::init(&args.log_level);

    replay::run(&args.fixture, args.cursor_options())
}
