//! Logging setup for session-kernel
//!
//! Installs a `tracing-subscriber` registry with a level filter and either a JSON or a
//! human-readable fmt layer. Output goes to stderr so command output on stdout stays
//! machine-readable.

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Telemetry error types
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber is already installed, or installation failed
    #[error("Failed to initialize tracing: {0}")]
    Init(String),
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// Parse a configured format name; anything unknown falls back to JSON
    pub fn parse(format: &str) -> Self {
        match format.to_lowercase().as_str() {
            "pretty" | "text" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// Map a configured level name to a tracing level; unknown names mean `info`
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Initialize the global tracing subscriber
///
/// Returns an error instead of panicking when called twice.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = LevelFilter::from_level(parse_level(&config.level));

    match LogFormat::parse(&config.format) {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| TelemetryError::Init(e.to_string())),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| TelemetryError::Init(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test 1: Level names map to tracing levels
    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), Level::TRACE);
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("warning"), Level::WARN);
        assert_eq!(parse_level("error"), Level::ERROR);
        assert_eq!(parse_level("verbose"), Level::INFO);
    }

    // Test 2: Format names
    #[test]
    fn test_parse_format() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("Pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("text"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("xml"), LogFormat::Json);
    }

    // Test 3: Second initialization is an error, not a panic
    #[test]
    fn test_init_twice() {
        let config = LoggingConfig::default();
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
