//! Configuration management for Visitor Desk

use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// When set, logs are also written to a daily file in this directory
    pub directory: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AlertsConfig {
    pub medium_hours: i64,
    pub high_hours: i64,
    pub critical_hours: i64,
    pub refresh_interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PresenceConfig {
    pub heartbeat_interval_secs: u64,
    pub stale_after_secs: u64,
    /// Desk user the binary heartbeats for while it runs
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StoreConfig {
    /// JSON file of backend documents used to seed the in-memory store
    pub seed_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
    #[serde(default)]
    pub presence: PresenceConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> AppResult<Self> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Self::builder(&run_mode)?.build()?;
        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn builder(run_mode: &str) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (e.g. VISITOR_DESK__ALERTS__HIGH_HOURS)
            .add_source(
                Environment::with_prefix("VISITOR_DESK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            // Override seed file from SEED_PATH env var if present
            .set_override_option("store.seed_path", env::var("SEED_PATH").ok())
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> AppResult<()> {
        let a = &self.alerts;
        let ordered = 0 < a.medium_hours
            && a.medium_hours < a.high_hours
            && a.high_hours < a.critical_hours;
        if !ordered {
            return Err(AppError::Validation(format!(
                "Alert thresholds must satisfy 0 < medium ({}) < high ({}) < critical ({})",
                a.medium_hours, a.high_hours, a.critical_hours
            )));
        }
        if a.refresh_interval_secs == 0 {
            return Err(AppError::Validation(
                "alerts.refresh_interval_secs must be positive".to_string(),
            ));
        }

        let p = &self.presence;
        if p.heartbeat_interval_secs == 0 {
            return Err(AppError::Validation(
                "presence.heartbeat_interval_secs must be positive".to_string(),
            ));
        }
        if p.stale_after_secs <= p.heartbeat_interval_secs {
            return Err(AppError::Validation(
                "presence.stale_after_secs must exceed the heartbeat interval".to_string(),
            ));
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(AppError::Validation(format!("Unknown log format: {}", other))),
        }
    }
}

impl AlertsConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

impl PresenceConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn stale_after(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.stale_after_secs as i64)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            directory: None,
        }
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            medium_hours: 12,
            high_hours: 18,
            critical_hours: 24,
            refresh_interval_secs: 60,
        }
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: 30,
            stale_after_secs: 90,
            user_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_unordered_thresholds_rejected() {
        let mut config = AppConfig::default();
        config.alerts.high_hours = 30;
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_stale_window_must_exceed_heartbeat() {
        let mut config = AppConfig::default();
        config.presence.stale_after_secs = 30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let mut config = AppConfig::default();
        config.logging.format = "xml".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_source_fills_defaults() {
        let config: AppConfig = Config::builder()
            .set_override("alerts.critical_hours", 36)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.alerts.critical_hours, 36);
        assert_eq!(config.alerts.high_hours, 18);
        assert_eq!(config.presence.heartbeat_interval_secs, 30);
        assert_eq!(config.logging.format, "pretty");
        assert!(config.store.seed_path.is_none());
    }
}
