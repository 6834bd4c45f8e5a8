//! Linker configuration file parsing.

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::warn;

use crate::runner::linker::chain::DEFAULT_UNSTABLE_RELINK_THRESHOLD;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("Invalid value for {key} on line {line}: {value}")]
    InvalidValue {
        line: usize,
        key: String,
        value: String,
    },
    #[error("Malformed line {line}: {content}")]
    Malformed { line: usize, content: String },
}

/// Settings for the linker chain and the call sites it serves.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkerConfig {
    /// Relinks after which a call site stops caching.
    pub unstable_relink_threshold: usize,
    /// Serialize relinking per call site.
    pub sync_on_relink: bool,
    /// Count hits and misses on every call site.
    pub profile_callsites: bool,
    /// Trace every invocation and relink.
    pub trace_callsites: bool,
    /// Grant access to restricted host classes.
    pub allow_reflection: bool,
}

impl LinkerConfig {
    pub fn new() -> Self {
        LinkerConfig {
            unstable_relink_threshold: DEFAULT_UNSTABLE_RELINK_THRESHOLD,
            sync_on_relink: true,
            profile_callsites: false,
            trace_callsites: false,
            allow_reflection: true,
        }
    }

    /// Load configuration from a TOML file.
    ///
    /// Expected format:
    /// ```toml
    /// [linker]
    /// unstable_relink_threshold = 16
    /// sync_on_relink = true
    /// profile_callsites = false
    /// trace_callsites = false
    ///
    /// [reflection]
    /// allow = false
    /// ```
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string. Only flat `key = value` pairs
    /// inside the two known sections are understood.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config = LinkerConfig::new();
        let mut current_section = String::new();

        for (i, line) in content.lines().enumerate() {
            let line_no = i + 1;
            let line = match line.find('#') {
                Some(pos) => line[..pos].trim(),
                None => line.trim(),
            };
            if line.is_empty() {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                current_section = line[1..line.len() - 1].trim().to_string();
                continue;
            }

            let (key, value) = match line.split_once('=') {
                Some((k, v)) => (k.trim(), v.trim().trim_matches('"')),
                None => {
                    return Err(ConfigError::Malformed {
                        line: line_no,
                        content: line.to_string(),
                    })
                }
            };

            match (current_section.as_str(), key) {
                ("linker", "unstable_relink_threshold") => {
                    config.unstable_relink_threshold = match value.parse() {
                        Ok(n) if n > 0 => n,
                        _ => return Err(invalid(line_no, key, value)),
                    };
                }
                ("linker", "sync_on_relink") => {
                    config.sync_on_relink = parse_bool(line_no, key, value)?;
                }
                ("linker", "profile_callsites") => {
                    config.profile_callsites = parse_bool(line_no, key, value)?;
                }
                ("linker", "trace_callsites") => {
                    config.trace_callsites = parse_bool(line_no, key, value)?;
                }
                ("reflection", "allow") => {
                    config.allow_reflection = parse_bool(line_no, key, value)?;
                }
                (section, key) => {
                    warn!(section, key, line = line_no, "ignoring unknown linker config key");
                }
            }
        }

        Ok(config)
    }
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_bool(line: usize, key: &str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid(line, key, value)),
    }
}

fn invalid(line: usize, key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        line,
        key: key.to_string(),
        value: value.to_string(),
    }
}
