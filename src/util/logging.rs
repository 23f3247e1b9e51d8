//! Structured logging setup for beamgraph
//!
//! The subscriber writes to stderr so that generated descriptors on stdout
//! stay machine-readable. Levels come from `--log-level`, `-v`/`-q` or
//! `BEAMGRAPH_LOG_LEVEL`, in that order; `RUST_LOG` replaces all of them.
//!
//! ```no_run
//! use beamgraph::util::logging::{init_logging, LoggingConfig};
//!
//! init_logging(LoggingConfig::from_env());
//! tracing::debug!(src = "src/foo.erl", "resolving");
//! ```

use crate::config::{validate_log_level, ConfigError};
use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_LEVEL_ENV: &str = "BEAMGRAPH_LOG_LEVEL";
pub const LOG_JSON_ENV: &str = "BEAMGRAPH_LOG_JSON";

static INIT: Once = Once::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: Level,
    /// One JSON object per event instead of human-readable lines
    pub use_json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
        }
    }
}

impl LoggingConfig {
    /// Reads `BEAMGRAPH_LOG_LEVEL` and `BEAMGRAPH_LOG_JSON`. An unknown level
    /// in the environment is reported and replaced by INFO.
    pub fn from_env() -> Self {
        let level = match env::var(LOG_LEVEL_ENV) {
            Ok(value) => validate_log_level(&value).unwrap_or_else(|e| {
                eprintln!("{}, defaulting to info", e);
                Level::INFO
            }),
            Err(_) => Level::INFO,
        };
        let use_json = env::var(LOG_JSON_ENV)
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);
        Self { level, use_json }
    }

    /// Applies the global CLI flags on top of the environment. An explicit
    /// `--log-level` must be valid and wins over `-v` and `-q`.
    pub fn with_flags(
        mut self,
        log_level: Option<&str>,
        verbose: bool,
        quiet: bool,
    ) -> Result<Self, ConfigError> {
        if let Some(level) = log_level {
            self.level = validate_log_level(level)?;
        } else if verbose {
            self.level = Level::DEBUG;
        } else if quiet {
            self.level = Level::ERROR;
        }
        Ok(self)
    }

    fn filter(&self) -> EnvFilter {
        if env::var("RUST_LOG").is_ok() {
            return EnvFilter::from_default_env();
        }
        EnvFilter::new(format!("beamgraph={}", self.level))
    }
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let registry = tracing_subscriber::registry().with(config.filter());
        if config.use_json {
            registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        } else {
            registry
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    struct EnvGuard;

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            env::remove_var(LOG_LEVEL_ENV);
            env::remove_var(LOG_JSON_ENV);
        }
    }

    #[test]
    #[serial]
    fn test_from_env() {
        let _guard = EnvGuard;
        env::set_var(LOG_LEVEL_ENV, "debug");
        env::set_var(LOG_JSON_ENV, "true");

        let config = LoggingConfig::from_env();
        assert_eq!(config.level, Level::DEBUG);
        assert!(config.use_json);
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_level_defaults_to_info() {
        let _guard = EnvGuard;
        env::set_var(LOG_LEVEL_ENV, "chatty");
        assert_eq!(LoggingConfig::from_env().level, Level::INFO);
    }

    #[test]
    #[serial]
    fn test_from_env_unset() {
        let _guard = EnvGuard;
        assert_eq!(LoggingConfig::from_env(), LoggingConfig::default());
    }

    #[test]
    fn test_explicit_level_wins_over_verbosity() {
        let config = LoggingConfig::default()
            .with_flags(Some("warn"), true, false)
            .unwrap();
        assert_eq!(config.level, Level::WARN);
    }

    #[test]
    fn test_verbose_and_quiet() {
        let verbose = LoggingConfig::default().with_flags(None, true, false).unwrap();
        assert_eq!(verbose.level, Level::DEBUG);

        let quiet = LoggingConfig::default().with_flags(None, false, true).unwrap();
        assert_eq!(quiet.level, Level::ERROR);
    }

    #[test]
    fn test_invalid_flag_level_is_an_error() {
        let err = LoggingConfig::default()
            .with_flags(Some("loud"), false, false)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(level) if level == "loud"));
    }
}
