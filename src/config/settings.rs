// Validated runtime settings
// Built once at startup from Config and shared read-only with every request

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use super::types::{Config, RepresentationConfig};
use crate::error::ConfigError;
use crate::negotiation::{Representation, WILDCARD};

/// Everything a request needs to negotiate and resolve a file
#[derive(Debug, Clone)]
pub struct Settings {
    pub representations: Vec<Representation>,
    pub base: PathBuf,
    pub script: String,
    pub index: String,
    pub strict: bool,
    pub debug: bool,
    pub access_log: bool,
    pub access_log_format: String,
}

/// Non-fatal problems found while validating the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Two representations declare the same content type. Only `first` is used.
    DuplicateContentType {
        content_type: String,
        first: usize,
        duplicate: usize,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateContentType {
                content_type,
                first,
                duplicate,
            } => write!(
                f,
                "representation #{duplicate} repeats content type {content_type} \
                 from representation #{first}; its extensions are ignored"
            ),
        }
    }
}

impl Settings {
    /// Validate `config` into settings plus any warnings worth logging
    pub fn from_config(config: &Config) -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        let (representations, warnings) = build_representations(&config.representations)?;
        validate_index(&config.negotiation.index)?;

        let settings = Self {
            representations,
            base: PathBuf::from(&config.negotiation.base),
            script: config.negotiation.script.trim_end_matches('/').to_string(),
            index: config.negotiation.index.clone(),
            strict: config.negotiation.strict,
            debug: config.negotiation.debug,
            access_log: config.logging.access_log,
            access_log_format: config.logging.access_log_format.clone(),
        };
        Ok((settings, warnings))
    }
}

fn build_representations(
    entries: &[RepresentationConfig],
) -> Result<(Vec<Representation>, Vec<ConfigWarning>), ConfigError> {
    if entries.is_empty() {
        return Err(ConfigError::NoRepresentations);
    }

    let mut representations = Vec::with_capacity(entries.len());
    let mut warnings = Vec::new();
    let mut first_seen: HashMap<String, usize> = HashMap::new();

    for (index, entry) in entries.iter().enumerate() {
        let representation = parse_representation(index, entry)?;
        let content_type = representation.content_type();

        if let Some(&first) = first_seen.get(&content_type) {
            warnings.push(ConfigWarning::DuplicateContentType {
                content_type,
                first,
                duplicate: index,
            });
            continue;
        }
        first_seen.insert(content_type, index);
        representations.push(representation);
    }

    Ok((representations, warnings))
}

fn parse_representation(
    index: usize,
    entry: &RepresentationConfig,
) -> Result<Representation, ConfigError> {
    let mime_type = entry.mime_type.trim();
    let invalid = || ConfigError::InvalidMimeType {
        index,
        mime_type: entry.mime_type.clone(),
    };

    let (main_type, subtype) = mime_type.split_once('/').ok_or_else(invalid)?;
    let well_formed = |part: &str| {
        !part.is_empty() && !part.contains('/') && !part.chars().any(char::is_whitespace)
    };
    if !well_formed(main_type) || !well_formed(subtype) {
        return Err(invalid());
    }
    if main_type.contains(WILDCARD) || subtype.contains(WILDCARD) {
        return Err(ConfigError::WildcardMimeType {
            index,
            mime_type: entry.mime_type.clone(),
        });
    }

    if entry.extensions.is_empty() {
        return Err(ConfigError::NoExtensions {
            index,
            mime_type: entry.mime_type.clone(),
        });
    }
    for extension in &entry.extensions {
        if extension.is_empty()
            || extension.starts_with('.')
            || extension.contains(['/', '\\'])
        {
            return Err(ConfigError::InvalidExtension {
                index,
                mime_type: entry.mime_type.clone(),
                extension: extension.clone(),
            });
        }
    }

    Ok(Representation::new(
        main_type,
        subtype,
        entry.extensions.iter().cloned(),
    ))
}

fn validate_index(index: &str) -> Result<(), ConfigError> {
    if index.is_empty() || index == "." || index == ".." || index.contains(['/', '\\']) {
        return Err(ConfigError::InvalidIndex(index.to_string()));
    }
    Ok(())
}
