use tracing_subscriber::EnvFilter;

pub(crate) const DEFAULT_LOG_FILTER: &str = "warn";

/// Filter from `--log-level`, else `RUST_LOG`, else [`DEFAULT_LOG_FILTER`].
pub(crate) fn log_filter(level: Option<&str>) -> EnvFilter {
    match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
    }
}

/// Logs go to stderr; stdout carries the line protocol.
pub(crate) fn init_logging(level: Option<&str>) {
    // A second init (tests, repeated runs in one process) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
