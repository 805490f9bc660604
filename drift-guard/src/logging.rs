//! Logging utilities and configuration for drift-guard.
//!
//! Findings are surfaced as `WARN` events by the
//! [`TracingObserver`](crate::observer::TracingObserver); this module controls
//! how chatty the rest of the monitor is and offers a ready-made subscriber
//! setup for applications that do not configure `tracing` themselves.

use serde::{Deserialize, Serialize};
use tracing::Level;

/// Logging configuration for a monitor.
///
/// In JSON the level is written as a string such as `"debug"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Base log level for drift-guard components
    #[serde(with = "level_name")]
    pub base_level: Level,
    /// Whether to log per-feature details while fitting
    pub log_fit_details: bool,
    /// Whether to emit a warning event per finding
    pub log_findings: bool,
    /// Maximum unknown values listed in one finding event
    pub max_logged_values: usize,
    /// Maximum length for logged field values (to prevent huge logs)
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_fit_details: false,
            log_findings: true,
            max_logged_values: 20,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Creates a verbose configuration suitable for debugging.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_fit_details: true,
            log_findings: true,
            max_logged_values: 100,
            max_field_length: 1024,
        }
    }

    /// Creates a minimal configuration for serving paths.
    ///
    /// Findings are still logged; everything else is off.
    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
            log_fit_details: false,
            log_findings: true,
            max_logged_values: 10,
            max_field_length: 128,
        }
    }

    /// Creates a configuration that never logs findings.
    pub fn silent() -> Self {
        Self {
            log_findings: false,
            ..Self::production()
        }
    }
}

mod level_name {
    use std::str::FromStr;

    use serde::{de, Deserialize, Deserializer, Serializer};
    use tracing::Level;

    pub fn serialize<S: Serializer>(level: &Level, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&level.as_str().to_ascii_lowercase())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Level, D::Error> {
        let name = String::deserialize(deserializer)?;
        Level::from_str(&name).map_err(de::Error::custom)
    }
}

/// Macro for performance-sensitive debug logging.
///
/// Arguments are only evaluated when the config's base level admits debug events.
#[macro_export]
macro_rules! perf_debug {
    ($config:expr, $($arg:tt)*) => {
        if $config.base_level >= tracing::Level::DEBUG {
            tracing::debug!($($arg)*);
        }
    };
}

/// Macro for conditional per-feature fit logging.
#[macro_export]
macro_rules! log_fit_detail {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_fit_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// Truncates a string to the maximum field length if needed.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        value.to_string()
    } else {
        let mut end = max_length;
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...(truncated)", &value[..end])
    }
}

/// Utilities for setting up structured logging.
pub mod setup {
    use tracing::Level;

    /// Configuration for drift-guard's logging setup.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for the application
        pub level: Level,
        /// Log level for drift-guard components specifically
        pub drift_level: Level,
        /// Whether to use JSON output format
        pub json_format: bool,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::INFO,
                drift_level: Level::INFO,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// Creates a configuration for production use: JSON lines, warnings and up.
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                drift_level: Level::WARN,
                json_format: true,
                env_filter: None,
            }
        }

        /// Creates a configuration for development use.
        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                drift_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }

        /// Sets the log level for the application.
        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        /// Sets the log level for drift-guard components.
        pub fn with_drift_level(mut self, level: Level) -> Self {
            self.drift_level = level;
            self
        }

        /// Sets whether to use JSON output format.
        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        /// Sets a custom environment filter.
        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the environment filter string.
        pub fn env_filter(&self) -> String {
            if let Some(ref filter) = self.env_filter {
                filter.clone()
            } else {
                format!(
                    "{},drift_guard={}",
                    self.level.as_str().to_lowercase(),
                    self.drift_level.as_str().to_lowercase()
                )
            }
        }
    }

    /// Initializes a global subscriber. `RUST_LOG` takes precedence over the config.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use drift_guard::logging::setup::{LoggingConfig, init_logging};
    ///
    /// init_logging(LoggingConfig::production()).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer().json().boxed()
        } else {
            tracing_subscriber::fmt::layer().boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::setup::LoggingConfig;
    use super::*;

    #[test]
    fn test_log_config_defaults() {
        let config = LogConfig::default();
        assert_eq!(config.base_level, Level::INFO);
        assert!(!config.log_fit_details);
        assert!(config.log_findings);
        assert_eq!(config.max_logged_values, 20);
    }

    #[test]
    fn test_log_config_production_keeps_findings() {
        let config = LogConfig::production();
        assert_eq!(config.base_level, Level::WARN);
        assert!(config.log_findings);
        assert_eq!(config.max_logged_values, 10);
        assert!(!LogConfig::silent().log_findings);
    }

    #[test]
    fn test_truncate_field() {
        assert_eq!(truncate_field("hello", 10), "hello");
        assert_eq!(
            truncate_field("this is a very long text", 10),
            "this is a ...(truncated)"
        );
        // Never splits a multi-byte character.
        assert_eq!(truncate_field("ééé", 3), "é...(truncated)");
    }

    #[test]
    fn test_env_filter() {
        assert_eq!(LoggingConfig::default().env_filter(), "info,drift_guard=info");
        assert_eq!(
            LoggingConfig::development().env_filter(),
            "debug,drift_guard=debug"
        );
        assert_eq!(
            LoggingConfig::default()
                .with_env_filter("drift_guard=trace")
                .env_filter(),
            "drift_guard=trace"
        );
    }
}
