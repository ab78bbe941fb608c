use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
  EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber, writing to `<log_dir>/tvshelf.log`.
///
/// Falls back to stderr when the file cannot be opened. Stdout is never used;
/// it belongs to the command output. The returned guard must be held until exit
/// or buffered lines are lost.
pub fn init(log_dir: &Path) -> Option<WorkerGuard> {
  let log_path = log_dir.join("tvshelf.log");
  let opened = std::fs::create_dir_all(log_dir).and_then(|()| {
    std::fs::OpenOptions::new()
      .create(true)
      .append(true)
      .open(&log_path)
  });

  match opened {
    Ok(file) => {
      let (non_blocking, guard) = tracing_appender::non_blocking(file);
      tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .with_ansi(false)
        .with_writer(non_blocking)
        .init();
      tracing::info!(path = %log_path.display(), "logging initialized");
      Some(guard)
    }
    Err(e) => {
      tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
      tracing::warn!(error = %e, "failed to open log file; using stderr");
      None
    }
  }
}
