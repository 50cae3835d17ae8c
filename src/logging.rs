//! Tracing configuration and log routing.
//!
//! Both binaries log to stdout using a compact formatter, and to a file. When `CATALOG_LOG_FILE`
//! is set, logs are appended to that path; otherwise each binary writes its own file under
//! `logs/<app>.log`. Missing parent directories are created.
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Configure tracing subscribers for stdout and optional file logging.
///
/// - Respects `RUST_LOG` for filtering (defaults to `info`).
/// - Keeps the non-blocking writer alive for the process lifetime through a global guard.
pub fn init_tracing(app: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer);

    if let Some(writer) = configure_file_writer(app) {
        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact();

        registry.with(file_layer).init();
    } else {
        registry.init();
    }
}

/// Where the file layer writes: `CATALOG_LOG_FILE` or `logs/<app>.log`.
fn log_path(app: &str) -> PathBuf {
    std::env::var_os("CATALOG_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new("logs").join(log_file_name(app)))
}

/// Returns `None` when the parent directory cannot be created or the file cannot be opened;
/// stdout logging continues either way.
fn configure_file_writer(app: &str) -> Option<NonBlocking> {
    let path = log_path(app);
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        if let Err(err) = std::fs::create_dir_all(parent) {
            eprintln!("Failed to create log directory {}: {err}", parent.display());
            return None;
        }
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .inspect_err(|err| eprintln!("Failed to open log file {}: {err}", path.display()))
        .ok()?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    let _ = LOG_GUARD.set(guard);
    Some(writer)
}

fn log_file_name(app: &str) -> String {
    let stem: String = app
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' { ch } else { '_' })
        .collect();
    if stem.is_empty() {
        "catalog-search.log".to_string()
    } else {
        format!("{stem}.log")
    }
}

#[cfg(test)]
mod tests {
    use super::{log_file_name, log_path};
    use std::path::Path;

    #[test]
    fn log_file_name_sanitizes_app_name() {
        assert_eq!(log_file_name("catalog-ingest"), "catalog-ingest.log");
        assert_eq!(log_file_name("a/b c"), "a_b_c.log");
        assert_eq!(log_file_name(""), "catalog-search.log");
    }

    #[test]
    fn log_path_follows_environment() {
        // SAFETY: no other test reads or writes this variable.
        unsafe { std::env::remove_var("CATALOG_LOG_FILE") };
        assert_eq!(log_path("catalog-ingest"), Path::new("logs/catalog-ingest.log"));

        // SAFETY: as above.
        unsafe { std::env::set_var("CATALOG_LOG_FILE", "/var/log/catalog/run.log") };
        assert_eq!(log_path("catalog-ingest"), Path::new("/var/log/catalog/run.log"));
        // SAFETY: as above.
        unsafe { std::env::remove_var("CATALOG_LOG_FILE") };
    }
}
