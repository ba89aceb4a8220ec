//! Daily file + console logger.
//!
//! A [`Logger`] owns one append-mode handle to `<dir>/<DD-MM-YY>.log`, named
//! after the local date at construction time. Every line goes to that file
//! and to stdout. The name is never recomputed, so a process that runs past
//! midnight keeps writing to the file it started with.

use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Component, Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
};

use chrono::{Local, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::{
    config::LoggingConfig,
    error::{LoggerError, Result},
    gitignore,
};

mod level;

pub use level::Level;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const FILE_NAME_FORMAT: &str = "%d-%m-%y.log";

const GITIGNORE_MARKER: &str = "# daylog";

type Console = Box<dyn Write + Send>;

// Both sinks sit behind one lock so each line lands whole, and in the same
// order, on file and console.
struct Sinks {
    // `None` once closed.
    file: Option<File>,
    console: Option<Console>,
}

pub struct Logger {
    path: PathBuf,
    sinks: Mutex<Sinks>,
    write_failed: AtomicBool,
}

impl Logger {
    /// Open today's log file under `config.dir`, creating the directory if
    /// needed. When `config.gitignore` is set, the gitignore file is updated
    /// to exclude the log files first.
    pub fn new(config: &LoggingConfig) -> Result<Self> {
        let console = config
            .console
            .then(|| Box::new(io::stdout()) as Console);
        Self::with_console(config, console)
    }

    /// Open a logger in `dir` with console output on and no gitignore update.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::new(&LoggingConfig {
            dir: dir.into(),
            gitignore: false,
            ..LoggingConfig::default()
        })
    }

    fn with_console(config: &LoggingConfig, console: Option<Console>) -> Result<Self> {
        fs::create_dir_all(&config.dir).map_err(|source| LoggerError::CreateDir {
            path: config.dir.clone(),
            source,
        })?;

        if config.gitignore {
            ensure_gitignored(config)?;
        }

        let path = config.dir.join(file_name_for(Local::now().date_naive()));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LoggerError::OpenFile {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), "Opened log file");

        Ok(Self {
            path,
            sinks: Mutex::new(Sinks {
                file: Some(file),
                console,
            }),
            write_failed: AtomicBool::new(false),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.lock().file.is_none()
    }

    /// Format and emit one line. Never fails: sink errors are dropped.
    pub fn write(&self, level: Level, message: &str) {
        let line = format_line(Local::now().naive_local(), level, message);

        let mut sinks = self.lock();
        if let Some(file) = sinks.file.as_mut() {
            if let Err(e) = file.write_all(line.as_bytes()) {
                self.report_write_failure(&e);
            }
        }

        if let Some(console) = sinks.console.as_mut() {
            let _ = console.write_all(line.as_bytes());
        }
    }

    pub fn info(&self, message: &str) {
        self.write(Level::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.write(Level::Debug, message);
    }

    pub fn error(&self, message: &str) {
        self.write(Level::Error, message);
    }

    pub fn http(&self, message: &str) {
        self.write(Level::Http, message);
    }

    /// Flush and release the file handle. Safe to call more than once.
    pub fn close(&self) {
        let mut sinks = self.lock();
        if let Some(console) = sinks.console.as_mut() {
            let _ = console.flush();
        }
        if let Some(file) = sinks.file.take() {
            let _ = file.sync_all();
            debug!(path = %self.path.display(), "Closed log file");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Sinks> {
        self.sinks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn report_write_failure(&self, error: &io::Error) {
        if !self.write_failed.swap(true, Ordering::Relaxed) {
            warn!(
                path = %self.path.display(),
                error = %error,
                "Failed to write to log file; further failures will be ignored silently"
            );
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("path", &self.path)
            .field("console", &self.lock().console.is_some())
            .finish_non_exhaustive()
    }
}

pub fn file_name_for(date: NaiveDate) -> String {
    date.format(FILE_NAME_FORMAT).to_string()
}

pub fn format_line(timestamp: NaiveDateTime, level: Level, message: &str) -> String {
    format!("{} - {} - {}\n", timestamp.format(TIMESTAMP_FORMAT), level, message)
}

fn ensure_gitignored(config: &LoggingConfig) -> Result<()> {
    let pattern = std::env::current_dir()
        .ok()
        .and_then(|cwd| gitignore_pattern(&config.dir, &config.gitignore_path, &cwd));

    match pattern {
        Some(pattern) => {
            gitignore::ensure_entries(
                &config.gitignore_path,
                &[GITIGNORE_MARKER, pattern.as_str()],
            )?;
        }
        None => debug!(
            dir = %config.dir.display(),
            gitignore = %config.gitignore_path.display(),
            "Log directory is outside the gitignore directory, skipping gitignore update"
        ),
    }
    Ok(())
}

/// `/<dir>/*.log`, anchored at the directory holding the gitignore file.
///
/// Relative paths are resolved against `cwd`. Returns `None` when the log
/// directory is not inside the gitignore file's directory.
fn gitignore_pattern(dir: &Path, gitignore_path: &Path, cwd: &Path) -> Option<String> {
    let base = normalize(gitignore_path.parent().unwrap_or(Path::new("")), cwd);
    let dir = normalize(dir, cwd);
    let relative = dir.strip_prefix(&base).ok()?;

    let parts: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();

    if parts.is_empty() {
        return Some("/*.log".to_string());
    }
    Some(format!("/{}/*.log", parts.join("/")))
}

// Lexical only: symlinks are not followed.
fn normalize(path: &Path, cwd: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in cwd.join(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
