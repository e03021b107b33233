//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging helpers
//! for the matchday engine.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration.
///
/// Returns the appender guard; dropping it stops the background log writer,
/// so the caller must keep it alive for the process lifetime.
pub fn init_logging(config: &LoggingConfig) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "matchday.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log enrollment actions with structured data
pub fn log_enrollment_action(game_id: i64, user_id: uuid::Uuid, action: &str, details: Option<&str>) {
    info!(
        game_id = game_id,
        user_id = %user_id,
        action = action,
        details = details,
        "Enrollment action performed"
    );
}

/// Log a scheduler sweep outcome
pub fn log_sweep_outcome(completed: usize, failed: usize, topped_up: usize) {
    info!(
        completed = completed,
        failed = failed,
        topped_up = topped_up,
        "Expiry sweep finished"
    );
}
