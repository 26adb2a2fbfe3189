//! Logger module
//!
//! Provides logging utilities for the negotiation server:
//! - Leveled diagnostic logging (debug through critical)
//! - Access logging with multiple formats
//! - File-based logging support
//!
//! Until [`init`] runs, messages go straight to stdout/stderr.

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use chrono::Local;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::config::{LoggingConfig, Settings};
use crate::error::ConfigError;

/// Logger name printed in every diagnostic line
const LOGGER_NAME: &str = "autoneg";

/// Diagnostic log severity, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "critical" => Ok(Self::Critical),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(level: LogLevel, config: &LoggingConfig) -> std::io::Result<()> {
    writer::init(
        level,
        config.file.as_deref(),
        config.access_log_file.as_deref(),
    )
}

/// `<time> <LEVEL>  [autoneg] <message>`
fn format_line(level: LogLevel, message: &str) -> String {
    format!(
        "{} {}  [{LOGGER_NAME}] {message}",
        Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
        level.label(),
    )
}

fn write(level: LogLevel, message: &str) {
    let line = format_line(level, message);
    match writer::get() {
        Some(writer) => writer.write_log(level, &line),
        None if level >= LogLevel::Warning => eprintln!("{line}"),
        None if level >= LogLevel::Info => println!("{line}"),
        None => {}
    }
}

/// Whether debug lines would currently be written
pub fn debug_enabled() -> bool {
    writer::get().is_some_and(|w| w.level() == LogLevel::Debug)
}

pub fn log_debug(message: &str) {
    write(LogLevel::Debug, message);
}

pub fn log_info(message: &str) {
    write(LogLevel::Info, message);
}

pub fn log_warning(message: &str) {
    write(LogLevel::Warning, message);
}

pub fn log_error(message: &str) {
    write(LogLevel::Error, message);
}

pub fn log_critical(message: &str) {
    write(LogLevel::Critical, message);
}

pub fn log_server_start(addr: &SocketAddr, settings: &Settings, workers: Option<usize>) {
    log_info("AutoNeg starting up");
    log_info(&format!("Listening on: http://{addr}"));
    log_info(&format!("Base directory: {}", settings.base.display()));
    if !settings.script.is_empty() {
        log_info(&format!("Stripping script prefix: {}", settings.script));
    }
    log_info(&format!("Index file: {}", settings.index));
    for representation in &settings.representations {
        log_info(&format!(
            "  {} -> .{}",
            representation.content_type(),
            representation.extensions.join(", .")
        ));
    }
    if settings.strict {
        log_info("Strict matching: wildcard media ranges are ignored");
    }
    if settings.debug {
        log_warning("Debug mode: fault details are returned to clients");
    }
    match workers {
        Some(workers) => log_info(&format!("Worker threads: {workers}")),
        None => log_info("Worker threads: one per CPU core"),
    }
}

pub fn log_connection_error(err: &impl fmt::Display) {
    log_error(&format!("Failed to serve connection: {err}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    let line = entry.format(format);
    match writer::get() {
        Some(writer) => writer.write_access(&line),
        None => println!("{line}"),
    }
}
