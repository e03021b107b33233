//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use super::Settings;
use crate::utils::errors::{MatchdayError, Result};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_enrollment_config(&settings.enrollment)?;
    validate_settlement_config(&settings.settlement)?;
    validate_scheduler_config(&settings.scheduler)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(MatchdayError::Config("Database URL is required".to_string()));
    }

    if config.max_connections == 0 {
        return Err(MatchdayError::Config(
            "Max connections must be greater than 0".to_string(),
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(MatchdayError::Config(
            "Min connections cannot be greater than max connections".to_string(),
        ));
    }

    Ok(())
}

/// Validate enrollment policy configuration
fn validate_enrollment_config(config: &super::EnrollmentConfig) -> Result<()> {
    if config.registration_close_minutes < 0 {
        return Err(MatchdayError::Config(
            "Registration close minutes cannot be negative".to_string(),
        ));
    }

    if config.min_lead_minutes < 0 {
        return Err(MatchdayError::Config(
            "Minimum lead minutes cannot be negative".to_string(),
        ));
    }

    if config.min_participants < 1 {
        return Err(MatchdayError::Config(
            "Minimum participants must be at least 1".to_string(),
        ));
    }

    if config.max_participants < config.min_participants {
        return Err(MatchdayError::Config(
            "Max participants cannot be less than min participants".to_string(),
        ));
    }

    Ok(())
}

/// Validate settlement policy configuration
fn validate_settlement_config(config: &super::SettlementConfig) -> Result<()> {
    if config.due_days < 0 {
        return Err(MatchdayError::Config(
            "Settlement due days cannot be negative".to_string(),
        ));
    }

    Ok(())
}

/// Validate scheduler configuration
fn validate_scheduler_config(config: &super::SchedulerConfig) -> Result<()> {
    if config.sweep_interval_secs == 0 {
        return Err(MatchdayError::Config(
            "Sweep interval must be greater than 0".to_string(),
        ));
    }

    if config.error_backoff_secs == 0 {
        return Err(MatchdayError::Config(
            "Error backoff must be greater than 0".to_string(),
        ));
    }

    if config.completion_grace_minutes < 0 {
        return Err(MatchdayError::Config(
            "Completion grace minutes cannot be negative".to_string(),
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(MatchdayError::Config("Log level is required".to_string()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(MatchdayError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_sweep_interval() {
        let mut settings = Settings::default();
        settings.scheduler.sweep_interval_secs = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn rejects_inverted_capacity_bounds() {
        let mut settings = Settings::default();
        settings.enrollment.min_participants = 10;
        settings.enrollment.max_participants = 5;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut settings = Settings::default();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }
}
