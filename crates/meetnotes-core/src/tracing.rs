//! Tracing setup shared by the server and the CLI.
//!
//! ```ignore
//! use meetnotes_core::tracing::{init_tracing, TracingConfig};
//!
//! // meetnotesd
//! init_tracing(TracingConfig::daemon())?;
//!
//! // meetnotes --debug
//! init_tracing(TracingConfig::cli_debug())?;
//! ```
//!
//! `RUST_LOG` takes precedence over the configured default level unless an
//! explicit filter is set with [`TracingConfig::with_env_filter`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self as subscriber_fmt, format::FmtSpan},
    prelude::*,
};

/// Targets that get the default level when `RUST_LOG` is unset.
const DEFAULT_TARGETS: &[&str] = &["meetnotes", "tower_http"];

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),

    #[error("unknown log format '{0}' (expected pretty, compact or json)")]
    UnknownFormat(String),
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// Multi-line human-readable output.
    #[default]
    Pretty,
    /// Single-line output.
    Compact,
    /// One JSON object per line, for log shippers.
    Json,
}

impl fmt::Display for TracingOutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pretty => "pretty",
            Self::Compact => "compact",
            Self::Json => "json",
        })
    }
}

impl FromStr for TracingOutputFormat {
    type Err = TracingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(TracingError::UnknownFormat(other.to_string())),
        }
    }
}

/// Configuration for tracing initialization
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level applied to meetnotes targets when RUST_LOG is not set
    pub default_level: Level,
    pub output_format: TracingOutputFormat,
    /// Include file/line in each event
    pub include_location: bool,
    /// Include the module path in each event
    pub include_target: bool,
    pub include_timestamp: bool,
    /// Emit span open/close events (per-request spans on the server)
    pub include_span_events: bool,
    /// Explicit filter directive; overrides both RUST_LOG and default_level
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: Level::INFO,
            output_format: TracingOutputFormat::Pretty,
            include_location: false,
            include_target: true,
            include_timestamp: true,
            include_span_events: false,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Compact, location-annotated debug output for `meetnotes --debug`.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            default_level: Level::DEBUG,
            output_format: TracingOutputFormat::Compact,
            include_location: true,
            include_timestamp: false,
            ..Self::default()
        }
    }

    /// Quiet output for normal CLI runs; only warnings and errors.
    #[must_use]
    pub fn cli() -> Self {
        Self {
            default_level: Level::WARN,
            output_format: TracingOutputFormat::Compact,
            include_target: false,
            include_timestamp: false,
            ..Self::default()
        }
    }

    /// JSON output with span events for `meetnotesd`.
    #[must_use]
    pub fn daemon() -> Self {
        Self {
            default_level: Level::INFO,
            output_format: TracingOutputFormat::Json,
            include_location: true,
            include_target: true,
            include_timestamp: true,
            include_span_events: true,
            env_filter: None,
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.output_format = format;
        self
    }

    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Returns the directive used when neither RUST_LOG nor an explicit
    /// filter is set.
    pub fn default_directive(&self) -> String {
        DEFAULT_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, self.default_level))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already installed or the explicit filter
/// directive does not parse.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = match config.env_filter {
        Some(ref filter) => EnvFilter::try_new(filter)?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.default_directive())),
    };

    let span_events = if config.include_span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = subscriber_fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_target(config.include_target)
        .with_span_events(span_events);

    let layer = match (config.output_format, config.include_timestamp) {
        (TracingOutputFormat::Pretty, _) => layer.pretty().boxed(),
        (TracingOutputFormat::Compact, true) => layer.compact().boxed(),
        (TracingOutputFormat::Compact, false) => layer.compact().without_time().boxed(),
        (TracingOutputFormat::Json, _) => layer.json().boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(env_filter).with(layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.default_level, Level::INFO);
        assert_eq!(config.output_format, TracingOutputFormat::Pretty);
        assert!(!config.include_location);
        assert!(config.include_timestamp);
        assert!(config.env_filter.is_none());
    }

    #[test]
    fn test_daemon_config() {
        let config = TracingConfig::daemon();
        assert_eq!(config.output_format, TracingOutputFormat::Json);
        assert!(config.include_span_events);
    }

    #[test]
    fn test_cli_configs() {
        assert_eq!(TracingConfig::cli().default_level, Level::WARN);
        let debug = TracingConfig::cli_debug();
        assert_eq!(debug.default_level, Level::DEBUG);
        assert!(!debug.include_timestamp);
    }

    #[test]
    fn test_default_directive_covers_http_layer() {
        let config = TracingConfig::default().with_level(Level::DEBUG);
        assert_eq!(config.default_directive(), "meetnotes=DEBUG,tower_http=DEBUG");
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(
            "JSON".parse::<TracingOutputFormat>().unwrap(),
            TracingOutputFormat::Json
        );
        assert_eq!(
            "compact".parse::<TracingOutputFormat>().unwrap(),
            TracingOutputFormat::Compact
        );
        assert!("xml".parse::<TracingOutputFormat>().is_err());
        assert_eq!(TracingOutputFormat::Pretty.to_string(), "pretty");
    }

    #[test]
    fn test_builder_methods() {
        let config = TracingConfig::default()
            .with_level(Level::WARN)
            .with_format(TracingOutputFormat::Json)
            .with_env_filter("meetnotes=trace");

        assert_eq!(config.default_level, Level::WARN);
        assert_eq!(config.output_format, TracingOutputFormat::Json);
        assert_eq!(config.env_filter, Some("meetnotes=trace".to_string()));
    }
}
