// Configuration module entry point
// Layers defaults, an optional TOML file, AUTONEG_* environment variables and
// command-line flags, then validates the result into immutable Settings

mod cli;
mod settings;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use cli::Cli;
pub use settings::{ConfigWarning, Settings};
pub use types::{Config, LoggingConfig, NegotiationConfig, RepresentationConfig, ServerConfig};

use crate::error::ConfigError;
use crate::logger::LogLevel;

/// Config file tried when `-c` is not given (any supported extension)
const DEFAULT_CONFIG_NAME: &str = "autoneg";

type Builder = config::ConfigBuilder<config::builder::DefaultState>;

impl Config {
    /// Load configuration for the given command line
    ///
    /// An explicit `--config` file must exist. Without one, `autoneg.toml` in
    /// the working directory is used when present.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match cli.config.as_deref() {
            Some(path) => config::File::with_name(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let builder = with_defaults(config::Config::builder())?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("AUTONEG")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        let settings = with_cli_overrides(builder, cli)?.build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Load configuration from TOML text, defaults filling the gaps
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let settings = with_defaults(config::Config::builder())?
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = if self.server.host.contains(':') {
            format!("[{}]:{}", self.server.host, self.server.port)
        } else {
            format!("{}:{}", self.server.host, self.server.port)
        };
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }

    pub fn log_level(&self) -> Result<LogLevel, ConfigError> {
        self.logging.level.parse()
    }

    /// Validate into runtime [`Settings`]
    pub fn to_settings(&self) -> Result<(Settings, Vec<ConfigWarning>), ConfigError> {
        Settings::from_config(self)
    }
}

fn with_defaults(builder: Builder) -> Result<Builder, config::ConfigError> {
    builder
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("server.connection_timeout", 30)?
        .set_default("negotiation.base", "/var/www")?
        .set_default("negotiation.script", "")?
        .set_default("negotiation.index", "index")?
        .set_default("negotiation.strict", false)?
        .set_default("negotiation.debug", false)?
        .set_default("logging.level", "info")?
        .set_default("logging.access_log", true)
}

fn with_cli_overrides(builder: Builder, cli: &Cli) -> Result<Builder, config::ConfigError> {
    builder
        .set_override_option("server.host", cli.host.clone())?
        .set_override_option("server.port", cli.port.map(i64::from))?
        .set_override_option("negotiation.base", cli.base.clone())?
        .set_override_option("negotiation.script", cli.script.clone())?
        .set_override_option("negotiation.index", cli.index.clone())?
        .set_override_option("negotiation.strict", cli.strict.then_some(true))?
        .set_override_option("negotiation.debug", cli.debug.then_some(true))?
        .set_override_option("logging.level", cli.verbosity.clone())?
        .set_override_option("logging.file", cli.logfile.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.connection_timeout, 30);
        assert_eq!(config.negotiation.index, "index");
        assert!(!config.negotiation.strict);
        assert_eq!(config.logging.access_log_format, "combined");
        assert_eq!(
            config.representations,
            vec![
                RepresentationConfig::new("text/plain", &["txt"]),
                RepresentationConfig::new("text/html", &["html"]),
            ]
        );
        assert_eq!(config.log_level().unwrap(), LogLevel::Info);
    }

    #[test]
    fn test_toml_representations() {
        let config = Config::from_toml_str(
            r#"
            [negotiation]
            base = "/srv/docs"
            script = "/docs/"
            strict = true

            [[representations]]
            mime_type = "text/html"
            extensions = ["html", "htm"]

            [[representations]]
            mime_type = "application/pdf"
            extensions = ["pdf"]
            "#,
        )
        .unwrap();

        let (settings, warnings) = config.to_settings().unwrap();
        assert!(warnings.is_empty());
        assert_eq!(settings.base, Path::new("/srv/docs"));
        assert_eq!(settings.script, "/docs");
        assert!(settings.strict);
        let types: Vec<_> = settings
            .representations
            .iter()
            .map(|r| r.content_type())
            .collect();
        assert_eq!(types, vec!["text/html", "application/pdf"]);
    }

    #[test]
    fn test_invalid_representation_rejected() {
        let config = Config::from_toml_str(
            r#"
            [[representations]]
            mime_type = "*/*"
            extensions = ["any"]
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.to_settings(),
            Err(ConfigError::WildcardMimeType { .. })
        ));
    }

    #[test]
    fn test_bad_level_and_address() {
        let config = Config::from_toml_str(
            r#"
            [server]
            host = "not an address"

            [logging]
            level = "loud"
            "#,
        )
        .unwrap();
        assert!(matches!(config.log_level(), Err(ConfigError::InvalidLogLevel(_))));
        assert!(matches!(config.socket_addr(), Err(ConfigError::InvalidAddress(_))));
    }

    #[test]
    fn test_ipv6_socket_addr() {
        let config = Config::from_toml_str("[server]\nhost = \"::1\"\nport = 9000\n").unwrap();
        assert_eq!(config.socket_addr().unwrap().to_string(), "[::1]:9000");
    }

    #[test]
    fn test_load_file_with_cli_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.toml");
        std::fs::write(
            &path,
            "[server]\nport = 7000\n\n[negotiation]\nbase = \"/from/file\"\nindex = \"home\"\n",
        )
        .unwrap();

        let cli = Cli {
            config: path.to_str().map(String::from),
            base: Some("/from/cli".to_string()),
            port: Some(7100),
            debug: true,
            verbosity: Some("debug".to_string()),
            ..Cli::default()
        };
        let config = Config::load(&cli).unwrap();
        assert_eq!(config.server.port, 7100);
        assert_eq!(config.negotiation.base, "/from/cli");
        assert_eq!(config.negotiation.index, "home");
        assert!(config.negotiation.debug);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let cli = Cli {
            config: Some("/nonexistent/autoneg-test-config.toml".to_string()),
            ..Cli::default()
        };
        assert!(matches!(Config::load(&cli), Err(ConfigError::Load(_))));
    }
}
