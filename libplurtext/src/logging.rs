//! Logging setup shared by the library and the `plur-text` binary
//!
//! The library only emits `tracing` events; nothing is printed unless a
//! subscriber is installed. Binaries install one with [`LoggingConfig`],
//! usually built from the environment:
//!
//! - `PLURTEXT_LOG_FORMAT`: `text` (default), `json` or `pretty`
//! - `PLURTEXT_LOG_LEVEL`: an `EnvFilter` directive such as `warn` or
//!   `libplurtext=debug` (default `warn`)
//!
//! All output goes to stderr so stdout stays clean for JSON results.
//!
//! ```no_run
//! use libplurtext::logging::LoggingConfig;
//!
//! let config = LoggingConfig::from_env(false).unwrap();
//! config.try_init();
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::{ConfigError, Result};

pub const FORMAT_ENV: &str = "PLURTEXT_LOG_FORMAT";
pub const LEVEL_ENV: &str = "PLURTEXT_LOG_LEVEL";

const DEFAULT_LEVEL: &str = "warn";
const VERBOSE_LEVEL: &str = "debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Plain text without colors, for piping
    #[default]
    Text,
    /// One JSON object per line
    Json,
    /// Multi-line, colored output for development
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                s
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        };
        f.write_str(name)
    }
}

/// Subscriber settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// `EnvFilter` directive
    pub level: String,
    /// Raise the level to `debug` unless `level` was set explicitly
    pub verbose: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            level: DEFAULT_LEVEL.to_string(),
            verbose: false,
        }
    }
}

impl LoggingConfig {
    pub fn new(format: LogFormat, level: impl Into<String>, verbose: bool) -> Self {
        Self {
            format,
            level: level.into(),
            verbose,
        }
    }

    /// Read `PLURTEXT_LOG_FORMAT` and `PLURTEXT_LOG_LEVEL`
    ///
    /// An explicit `PLURTEXT_LOG_LEVEL` wins over `verbose`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unknown format name.
    pub fn from_env(verbose: bool) -> Result<Self> {
        let format = match std::env::var(FORMAT_ENV) {
            Ok(value) => value.parse().map_err(|reason| ConfigError::InvalidValue {
                field: FORMAT_ENV.to_string(),
                reason,
            })?,
            Err(_) => LogFormat::default(),
        };

        let level = std::env::var(LEVEL_ENV).ok().filter(|l| !l.trim().is_empty());
        Ok(match level {
            Some(level) => Self::new(format, level, false),
            None => Self::new(format, DEFAULT_LEVEL, verbose),
        })
    }

    /// The filter directive actually applied
    pub fn effective_level(&self) -> &str {
        if self.verbose {
            VERBOSE_LEVEL
        } else {
            &self.level
        }
    }

    /// Build the `EnvFilter` for this configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the directive does not parse.
    pub fn filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(self.effective_level()).map_err(|e| {
            ConfigError::InvalidValue {
                field: LEVEL_ENV.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Install the global subscriber
    ///
    /// Returns `false` when a subscriber was already installed (for example
    /// by a test harness); the existing one is kept. An unparsable level
    /// falls back to the default.
    pub fn try_init(&self) -> bool {
        let filter = self
            .filter()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

        let installed = match self.format {
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .flatten_event(true)
                .with_current_span(true)
                .with_target(true)
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_line_number(true)
                .with_file(true)
                .try_init(),
            LogFormat::Text => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(false)
                .try_init(),
        };

        installed.is_ok()
    }
}
