use chrono::Local;
use colored::Colorize;
use env_logger::Builder;
use log::Level;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub fn setup_logging(verbose: bool) {
    use log::LevelFilter;

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn) // Default: only warnings from dependencies
        .filter_module(env!("CARGO_PKG_NAME"), level) // Our crate: use requested level
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME");
            let line = match record.level() {
                Level::Error | Level::Warn => {
                    let level_str = match record.level() {
                        Level::Warn => "WARN".yellow(),
                        _ => "ERROR".red(),
                    };
                    let path = record.target().to_string().white();
                    format!("[{} {} {}] {}", name.cyan(), level_str, path, record.args())
                }
                _ => format!("[{}] {}", name.cyan(), record.args()),
            };
            writeln!(buf, "{}", line)
        })
        .try_init();
}

/// Diagnostic sink injected into the indexer. Implementations must not panic and must return
/// quickly; the walker calls them inline.
pub trait IndexLogger: Send + Sync {
    fn log(&self, message: &str);
    fn log_error(&self, error: &anyhow::Error);
}

/// Forwards to the `log` facade (info / error).
#[derive(Clone, Copy, Debug, Default)]
pub struct LogFacade;

impl IndexLogger for LogFacade {
    fn log(&self, message: &str) {
        log::info!("{}", message);
    }

    fn log_error(&self, error: &anyhow::Error) {
        log::error!("{:#}", error);
    }
}

/// Appends timestamped lines to a log file (default `indexer.log` in the data dir).
pub struct FileLogger {
    path: PathBuf,
    lock: Mutex<()>,
    echo: bool,
}

impl FileLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            echo: false,
        }
    }

    /// Also forward every line to the `log` facade (debug / error).
    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, text: &str) {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        if let Ok(mut f) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
        {
            let _ = writeln!(f, "[{}] {}", stamp, text);
        }
    }
}

impl IndexLogger for FileLogger {
    fn log(&self, message: &str) {
        if self.echo {
            log::debug!("{}", message);
        }
        self.append(message);
    }

    fn log_error(&self, error: &anyhow::Error) {
        if self.echo {
            log::error!("{:#}", error);
        }
        self.append(&format!("Exception: {:#}", error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_logger_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let logger = FileLogger::new(dir.path().join("logs").join("indexer.log"));
        logger.log("first");
        logger.log_error(&anyhow::anyhow!("boom"));
        let text = std::fs::read_to_string(logger.path()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("] first"));
        assert!(lines[1].contains("Exception: boom"));
    }

    #[test]
    fn file_logger_swallows_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in place of the file: open fails, log must not panic.
        let logger = FileLogger::new(dir.path());
        logger.log("ignored");
    }
}
