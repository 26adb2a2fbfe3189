//! Error types
//!
//! Expected negotiation outcomes (not found, not acceptable) are plain return
//! values and never appear here. These enums cover startup failures and the
//! per-request fault channel that ends in a 500.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration load and validation failures. Any of these aborts startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or deserializing a configuration source failed
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// No representations configured, so nothing could ever be served
    #[error("at least one representation must be configured")]
    NoRepresentations,

    /// Mime type is not of the form `type/subtype`
    #[error("representation #{index}: invalid mime type '{mime_type}', expected 'type/subtype'")]
    InvalidMimeType { index: usize, mime_type: String },

    /// Server-side representations must be concrete
    #[error("representation #{index}: mime type '{mime_type}' must not contain a wildcard")]
    WildcardMimeType { index: usize, mime_type: String },

    /// Representation declares no file extensions
    #[error("representation #{index} ({mime_type}): no extensions configured")]
    NoExtensions { index: usize, mime_type: String },

    /// Extension is empty, starts with a dot, or contains a path separator
    #[error("representation #{index} ({mime_type}): invalid extension '{extension}'")]
    InvalidExtension {
        index: usize,
        mime_type: String,
        extension: String,
    },

    /// Index filename is empty or not a single path component
    #[error("invalid index filename '{0}', expected a plain file name")]
    InvalidIndex(String),

    /// Unknown log level name
    #[error("invalid log level '{0}', expected one of debug, info, warning, error, critical")]
    InvalidLogLevel(String),

    /// Host and port do not form a socket address
    #[error("invalid listen address '{0}'")]
    InvalidAddress(String),
}

/// Unexpected faults raised while handling a single request.
///
/// These are caught at the dispatch boundary, logged with request context and
/// turned into a 500 response.
#[derive(Debug, Error)]
pub enum ServeError {
    /// A variant was found on disk but could not be opened or inspected
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Response headers could not be assembled (e.g. non-ASCII filename)
    #[error("failed to build response: {0}")]
    Response(#[from] hyper::http::Error),

    /// The blocking resolution task panicked or was cancelled
    #[error("request task failed: {0}")]
    Task(String),
}
