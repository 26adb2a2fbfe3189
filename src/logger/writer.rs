//! Log writer module
//!
//! Process-wide writer for the diagnostic log and the access log. Each goes
//! to a file when configured, otherwise to stderr and stdout respectively.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use super::LogLevel;

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Log output target
enum LogTarget {
    Stdout,
    Stderr,
    File(File),
}

/// Thread-safe log writer
pub struct LogWriter {
    /// Lowest level written to the diagnostic log
    level: LogLevel,
    log: Mutex<LogTarget>,
    access: Mutex<LogTarget>,
}

impl LogWriter {
    fn new(
        level: LogLevel,
        log_file: Option<&str>,
        access_log_file: Option<&str>,
    ) -> io::Result<Self> {
        let log = match log_file {
            Some(path) => LogTarget::File(open_log_file(path)?),
            None => LogTarget::Stderr,
        };
        let access = match access_log_file {
            Some(path) => LogTarget::File(open_log_file(path)?),
            None => LogTarget::Stdout,
        };

        Ok(Self {
            level,
            log: Mutex::new(log),
            access: Mutex::new(access),
        })
    }

    pub const fn level(&self) -> LogLevel {
        self.level
    }

    /// Write a formatted diagnostic line if `level` passes the filter
    pub fn write_log(&self, level: LogLevel, line: &str) {
        if level < self.level {
            return;
        }
        if let Ok(mut target) = self.log.lock() {
            write_to_target(&mut target, line);
        }
    }

    /// Write one access log line
    pub fn write_access(&self, line: &str) {
        if let Ok(mut target) = self.access.lock() {
            write_to_target(&mut target, line);
        }
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

fn write_to_target(target: &mut LogTarget, line: &str) {
    match target {
        LogTarget::Stdout => println!("{line}"),
        LogTarget::Stderr => eprintln!("{line}"),
        LogTarget::File(file) => {
            let _ = writeln!(file, "{line}");
        }
    }
}

/// Initialize the global log writer
///
/// Call once at startup. Fails if a log file cannot be opened or the writer
/// was already initialized.
pub fn init(
    level: LogLevel,
    log_file: Option<&str>,
    access_log_file: Option<&str>,
) -> io::Result<()> {
    let writer = LogWriter::new(level, log_file, access_log_file)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// The global writer, if [`init`] has run
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}
