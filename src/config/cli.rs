// Command-line interface
// Flags override the configuration file and AUTONEG_* environment variables

use clap::Parser;

/// AutoNeg - serve files by HTTP content negotiation.
///
/// Maps a request path to `<base>/<path>.<ext>` and picks the extension from
/// the client's Accept header and the configured representations.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "autoneg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (TOML). Optional, `autoneg.toml` is tried when absent.
    #[arg(short, long, env = "AUTONEG_CONFIG")]
    pub config: Option<String>,

    /// Return fault details in 500 responses.
    #[arg(short, long)]
    pub debug: bool,

    /// Base directory for stored files.
    #[arg(short, long)]
    pub base: Option<String>,

    /// Script prefix stripped from request paths.
    #[arg(short, long)]
    pub script: Option<String>,

    /// Index basename used for directory requests.
    #[arg(short, long)]
    pub index: Option<String>,

    /// Diagnostic log file.
    #[arg(short, long)]
    pub logfile: Option<String>,

    /// Log level (debug, info, warning, error, critical).
    #[arg(short, long)]
    pub verbosity: Option<String>,

    /// Host address to bind the server to.
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on.
    #[arg(long)]
    pub port: Option<u16>,

    /// Ignore wildcard media ranges in Accept headers.
    #[arg(long)]
    pub strict: bool,
}
