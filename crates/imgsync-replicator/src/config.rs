//! Configuration types for the replicator.
//!
//! The log level is read once from the environment into an explicit value
//! and handed to whoever needs it; nothing reads `LOG_LEVEL` afterwards.

use std::fmt;

use imgsync_registry::TlsConfig;

/// Environment variable holding the log level.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Verbosity of the handler's logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Everything, including per-call tracing.
    Trace,
    /// State transitions and collaborator command lines.
    Debug,
    /// Lifecycle milestones.
    #[default]
    Info,
    /// Recoverable oddities.
    Warn,
    /// Failures only.
    Error,
}

impl LogLevel {
    /// Parses a level name, case-insensitively.
    ///
    /// `fatal` and `panic` are accepted as aliases of `error`.
    ///
    /// # Examples
    ///
    /// ```
    /// use imgsync_replicator::LogLevel;
    ///
    /// assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
    /// assert_eq!(LogLevel::parse("panic"), Some(LogLevel::Error));
    /// assert_eq!(LogLevel::parse("loud"), None);
    /// ```
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" | "fatal" | "panic" => Some(Self::Error),
            _ => None,
        }
    }

    /// Returns the level name as understood by log filters.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Returns true if debug output is enabled at this level.
    #[must_use]
    pub const fn is_debug(&self) -> bool {
        matches!(self, Self::Trace | Self::Debug)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the replication driver.
#[derive(Debug, Clone, Default)]
pub struct ReplicatorConfig {
    /// Log level.
    pub log_level: LogLevel,

    /// TLS settings applied to every registry context.
    pub tls: TlsConfig,

    rejected_log_level: Option<String>,
}

impl ReplicatorConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ReplicatorConfigBuilder {
        ReplicatorConfigBuilder::default()
    }

    /// Reads the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_log_level_value(std::env::var(LOG_LEVEL_ENV).ok().as_deref())
    }

    /// Builds the configuration from a raw `LOG_LEVEL` value.
    ///
    /// A missing value means `info`. An unrecognized value also means
    /// `info` and is kept so it can be reported once logging is up.
    #[must_use]
    pub fn from_log_level_value(value: Option<&str>) -> Self {
        let (log_level, rejected_log_level) = match value.filter(|v| !v.trim().is_empty()) {
            None => (LogLevel::Info, None),
            Some(raw) => LogLevel::parse(raw)
                .map_or_else(|| (LogLevel::Info, Some(raw.to_string())), |level| (level, None)),
        };
        Self {
            log_level,
            tls: TlsConfig::default(),
            rejected_log_level,
        }
    }

    /// The unrecognized `LOG_LEVEL` value, if one was given.
    #[must_use]
    pub fn rejected_log_level(&self) -> Option<&str> {
        self.rejected_log_level.as_deref()
    }
}

/// Builder for `ReplicatorConfig`.
#[derive(Debug, Default)]
pub struct ReplicatorConfigBuilder {
    log_level: Option<LogLevel>,
    tls: Option<TlsConfig>,
}

impl ReplicatorConfigBuilder {
    /// Sets the log level.
    #[must_use]
    pub const fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Sets the TLS configuration.
    #[must_use]
    pub fn tls(mut self, tls: TlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> ReplicatorConfig {
        ReplicatorConfig {
            log_level: self.log_level.unwrap_or_default(),
            tls: self.tls.unwrap_or_default(),
            rejected_log_level: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels() {
        assert_eq!(LogLevel::parse("trace"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::parse("Info"), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse("warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("fatal"), Some(LogLevel::Error));
        assert_eq!(LogLevel::parse(""), None);
    }

    #[test]
    fn test_from_log_level_value() {
        let config = ReplicatorConfig::from_log_level_value(None);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.rejected_log_level(), None);

        let config = ReplicatorConfig::from_log_level_value(Some("debug"));
        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(config.log_level.is_debug());

        let config = ReplicatorConfig::from_log_level_value(Some("chatty"));
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.rejected_log_level(), Some("chatty"));

        let config = ReplicatorConfig::from_log_level_value(Some("  "));
        assert_eq!(config.rejected_log_level(), None);
    }

    #[test]
    fn test_builder() {
        let config = ReplicatorConfig::builder()
            .log_level(LogLevel::Warn)
            .tls(TlsConfig::new().insecure())
            .build();
        assert_eq!(config.log_level, LogLevel::Warn);
        assert!(config.tls.insecure_skip_verify);
        assert!(!config.log_level.is_debug());
    }
}
