use tracing_appender::non_blocking::WorkerGuard;

/// Initialize logging based on AVSPLIT_DEBUG environment variable.
///
/// Logs go to a daily file so they never draw over the terminal UI.
pub fn init_logging() -> Option<WorkerGuard> {
    if std::env::var("AVSPLIT_DEBUG").is_ok() {
        let log_dir = dirs::data_local_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join("avsplit");

        let _ = std::fs::create_dir_all(&log_dir);

        let file_appender = tracing_appender::rolling::daily(&log_dir, "avsplit.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::fmt()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive(tracing::Level::DEBUG.into()),
            )
            .init();

        tracing::info!("avsplit logging initialized in {}", log_dir.display());
        Some(guard)
    } else {
        None
    }
}
