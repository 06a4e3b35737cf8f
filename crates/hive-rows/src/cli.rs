use std::{path::PathBuf, time::Duration};

use clap::Parser;

use hive_rows::CursorOptions;

#[derive(Parser, Debug, Clone)]
#[command(name = "hive-rows")]
pub struct Args {
    /// Recorded server conversation (JSON) to replay.
    #[arg(long)]
    pub fixture: PathBuf,

    /// Logging level (stderr). Also supports RUST_LOG.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Rows requested per FetchResults call.
    #[arg(long, default_value_t = hive_rows::core::options::DEFAULT_PAGE_SIZE)]
    pub page_size: i64,

    /// Delay between status polls while the query runs.
    #[arg(long, default_value_t = 100)]
    pub poll_interval_ms: u64,

    /// Give up waiting for the query after this long.
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

impl Args {
    pub fn cursor_options(&self) -> CursorOptions {
        CursorOptions::default()
            .with_page_size(self.page_size)
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
            .with_wait_timeout(self.timeout_ms.map(Duration::from_millis))
    }
}
