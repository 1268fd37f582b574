//! Application configuration loaded from environment variables.

use std::time::Duration;

/// Which notification sender the service starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierKind {
    Log,
    Mock,
}

/// Service configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `RESERVE_TIMEOUT_MS`: per-call inventory timeout (default: `2000`)
/// - `BREAKER_THRESHOLD`: consecutive failures before the circuit opens (default: `5`)
/// - `BREAKER_OPEN_SECS`: how long the circuit stays open (default: `30`)
/// - `NOTIFIER`: `log` or `mock` (default: `log`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub reserve_timeout: Duration,
    pub breaker_threshold: u32,
    pub breaker_open_interval: Duration,
    pub notifier: NotifierKind,
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            reserve_timeout: Duration::from_millis(
                std::env::var("RESERVE_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(2000),
            ),
            breaker_threshold: std::env::var("BREAKER_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            breaker_open_interval: Duration::from_secs(
                std::env::var("BREAKER_OPEN_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
            notifier: match std::env::var("NOTIFIER").as_deref() {
                Ok("mock") => NotifierKind::Mock,
                _ => NotifierKind::Log,
            },
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reserve_timeout: Duration::from_millis(2000),
            breaker_threshold: 5,
            breaker_open_interval: Duration::from_secs(30),
            notifier: NotifierKind::Log,
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.reserve_timeout, Duration::from_millis(2000));
        assert_eq!(config.breaker_threshold, 5);
        assert_eq!(config.breaker_open_interval, Duration::from_secs(30));
        assert_eq!(config.notifier, NotifierKind::Log);
        assert_eq!(config.log_level, "info");
    }
}
