//! Logging bootstrap: console output on stderr plus a dated log file per day

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Log file name for a given day, e.g. `2024-03-01_log.txt`
pub fn log_file_name(date: NaiveDate) -> String {
    format!("{}_log.txt", date.format("%Y-%m-%d"))
}

fn open_log_file(log_dir: &Path) -> Result<(File, PathBuf)> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let path = log_dir.join(log_file_name(chrono::Local::now().date_naive()));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    Ok((file, path))
}

/// Installs the global subscriber and returns the log file path in use
///
/// The console honours `RUST_LOG` and otherwise shows warnings (info with
/// `verbose`). The file always records info and above. A log file that cannot
/// be opened only disables file logging.
pub fn init_logging(log_dir: &Path, verbose: bool) -> Option<PathBuf> {
    let default_directive = if verbose { "repo_fleet=info" } else { "repo_fleet=warn" };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let (file_layer, log_path) = match open_log_file(log_dir) {
        Ok((file, path)) => {
            let layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_filter(LevelFilter::INFO);
            (Some(layer), Some(path))
        }
        Err(e) => {
            eprintln!("⚠️  File logging disabled: {e:#}");
            (None, None)
        }
    };

    if let Err(e) = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
    {
        eprintln!("⚠️  Logging already initialized: {e}");
    }
    log_path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(log_file_name(date), "2024-03-01_log.txt");
    }

    #[test]
    fn test_open_log_file_creates_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("log");
        let (_, path) = open_log_file(&log_dir).unwrap();
        assert!(path.starts_with(&log_dir));
        assert!(path.is_file());
    }
}
