// Configuration types module
// Defines the on-disk configuration schema

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub negotiation: NegotiationConfig,
    pub logging: LoggingConfig,
    /// Ordered list of server-side representations. Order is the tie-break
    /// between equally preferred media ranges.
    #[serde(default = "default_representations")]
    pub representations: Vec<RepresentationConfig>,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Seconds a connection may stay open, 0 disables the limit
    pub connection_timeout: u64,
}

/// Negotiation configuration
#[derive(Debug, Deserialize, Clone)]
pub struct NegotiationConfig {
    /// Directory that request paths are mapped under
    pub base: String,
    /// Prefix stripped from request paths before mapping (e.g. `/docs`)
    pub script: String,
    /// Basename used when the request maps to a directory
    pub index: String,
    /// Ignore wildcard media ranges entirely
    pub strict: bool,
    /// Return fault details in 500 responses
    pub debug: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// Diagnostic log file path (optional, stderr if not set)
    #[serde(default)]
    pub file: Option<String>,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
}

/// One `[[representations]]` entry
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RepresentationConfig {
    pub mime_type: String,
    pub extensions: Vec<String>,
}

impl RepresentationConfig {
    pub fn new(mime_type: &str, extensions: &[&str]) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            extensions: extensions.iter().map(ToString::to_string).collect(),
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

fn default_representations() -> Vec<RepresentationConfig> {
    vec![
        RepresentationConfig::new("text/plain", &["txt"]),
        RepresentationConfig::new("text/html", &["html"]),
    ]
}
