use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Where synthesis logs land when no explicit directory is given.
fn default_log_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".stratus/logs")
}

/// Initialize logging for an embedding tool.
///
/// Logs roll daily under `log_dir` (default `~/.stratus/logs`) with the
/// component name as the prefix, creating files like synth.2026-08-08.
/// The returned guard must stay alive for the non-blocking writer to
/// keep flushing.
pub fn init_logging(component: &str, log_dir: Option<&Path>, to_stderr: bool) -> WorkerGuard {
    let log_dir = log_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(default_log_dir);
    let _ = std::fs::create_dir_all(&log_dir);

    let file_appender = tracing_appender::rolling::daily(&log_dir, component);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // File layer: no ANSI colors
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    if to_stderr {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);
        registry.with(stderr_layer).init();
    } else {
        registry.init();
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_logging_creates_component_log() {
        let dir = tempdir().unwrap();
        let guard = init_logging("synth", Some(dir.path()), false);
        tracing::info!("logging smoke test");
        drop(guard);

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().any(|name| name.starts_with("synth")));
    }
}
