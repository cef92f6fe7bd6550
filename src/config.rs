//! Runtime configuration.
//!
//! Settings are layered: built-in defaults, then an optional TOML file
//! (`flowguard.toml` in the working directory when present), then
//! `FLOWGUARD_*` environment variables. Nested keys use `__`, e.g.
//! `FLOWGUARD_COORDINATOR__MAX_HISTORY=50` or `FLOWGUARD_LOGGING__FORMAT=json`.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {}", .violations.join("; "))]
    Invalid { violations: Vec<String> },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub coordinator: CoordinatorConfig,
    pub logging: LoggingConfig,
}

/// Tuning for [`ErrorCoordinator`](crate::coordinator::ErrorCoordinator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Errors retained for history queries and statistics.
    pub max_history: usize,
    /// Attempts for a retry strategy that does not name its own limit.
    pub default_max_retries: u32,
    /// Attempts for the retry applied when no handler claims a
    /// non-critical error.
    pub fallback_retry_attempts: u32,
    pub backoff: BackoffConfig,
    /// Cascade hops allowed from the originating error.
    pub max_cascade_depth: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_history: 100,
            default_max_retries: 3,
            fallback_retry_attempts: 2,
            backoff: BackoffConfig::default(),
            max_cascade_depth: 3,
        }
    }
}

/// Exponential backoff between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 1000,
            max_delay_ms: 10_000,
        }
    }
}

impl BackoffConfig {
    /// Delay after the zero-based failed `attempt`:
    /// `min(base * 2^attempt, max)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u64.checked_pow(attempt).unwrap_or(u64::MAX);
        let millis = self
            .base_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms);
        Duration::from_millis(millis)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Settings {
    pub const DEFAULT_FILE: &'static str = "flowguard.toml";
    pub const ENV_PREFIX: &'static str = "FLOWGUARD";

    /// Load and validate settings.
    ///
    /// An explicit `path` must exist; without one, `flowguard.toml` is read
    /// only if present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix(Self::ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        match path {
            Some(path) => builder = builder.add_source(File::from(path)),
            None => {
                if Path::new(Self::DEFAULT_FILE).exists() {
                    builder = builder.add_source(File::with_name(Self::DEFAULT_FILE));
                }
            }
        }

        let settings: Settings = builder.add_source(env).build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check every setting, reporting all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.coordinator;
        let checks = vec![
            check(c.max_history >= 1, "coordinator.max_history must be at least 1"),
            check(
                c.default_max_retries >= 1,
                "coordinator.default_max_retries must be at least 1",
            ),
            check(
                c.fallback_retry_attempts >= 1,
                "coordinator.fallback_retry_attempts must be at least 1",
            ),
            check(
                c.backoff.base_delay_ms <= c.backoff.max_delay_ms,
                "coordinator.backoff.base_delay_ms must not exceed max_delay_ms",
            ),
            check(
                c.max_cascade_depth >= 1,
                "coordinator.max_cascade_depth must be at least 1",
            ),
            check(
                !self.logging.level.trim().is_empty(),
                "logging.level must not be empty",
            ),
        ];

        match Validation::all_vec(checks).map(|_| ()) {
            Validation::Success(_) => Ok(()),
            Validation::Failure(errors) => Err(ConfigError::Invalid {
                violations: errors.iter().cloned().collect(),
            }),
        }
    }
}

fn check(ok: bool, message: &str) -> Validation<(), NonEmptyVec<String>> {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(message.to_string())
    }
}
