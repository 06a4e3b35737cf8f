use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber. `--log-level` applies to this crate; other
/// crates stay at `warn`. `RUST_LOG` replaces both.
pub fn init(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,hive_rows={log_level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
