//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub enrollment: EnrollmentConfig,
    pub settlement: SettlementConfig,
    pub scheduler: SchedulerConfig,
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Enrollment policy configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnrollmentConfig {
    /// Minutes before start at which registration closes. 0 means joining is
    /// possible right up to the start time.
    pub registration_close_minutes: i64,
    /// Minimum lead time in minutes when creating or rescheduling a game.
    pub min_lead_minutes: i64,
    /// Capacity bounds accepted when creating a game.
    pub min_participants: i32,
    pub max_participants: i32,
}

/// Settlement policy configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SettlementConfig {
    /// Days after game start at which a settlement falls due.
    pub due_days: i64,
}

/// Expiry and maintenance scheduler configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerConfig {
    /// Delay before the first sweep after startup, in seconds.
    pub startup_delay_secs: u64,
    /// Interval between sweeps, in seconds.
    pub sweep_interval_secs: u64,
    /// Delay before retrying after a failed sweep, in seconds.
    pub error_backoff_secs: u64,
    /// Minutes past start time before a game is considered expired.
    pub completion_grace_minutes: i64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("MATCHDAY").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> crate::utils::errors::Result<()> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/matchday".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            enrollment: EnrollmentConfig {
                registration_close_minutes: 0,
                min_lead_minutes: 60,
                min_participants: 2,
                max_participants: 100,
            },
            settlement: SettlementConfig { due_days: 7 },
            scheduler: SchedulerConfig {
                startup_delay_secs: 60,
                sweep_interval_secs: 3600,
                error_backoff_secs: 300,
                completion_grace_minutes: 30,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "/var/log/matchday".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.enrollment.registration_close_minutes, 0);
        assert_eq!(settings.scheduler.sweep_interval_secs, 3600);
    }
}
