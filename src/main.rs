//! Matchday service
//!
//! Main application entry point: loads configuration, connects the database,
//! runs migrations and keeps the expiry/maintenance scheduler running until
//! the process is asked to stop.

use tokio_util::sync::CancellationToken;
use tracing::info;

use matchday::{
    config::Settings,
    database::{connection, DatabaseService},
    services::ServiceFactory,
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard must outlive the runtime
    let _guard = logging::init_logging(&settings.logging)?;

    info!("Starting matchday engine...");

    // Initialize database connection
    info!("Connecting to database...");
    let pool_config = connection::PoolConfig::from_settings(&settings.database);
    let pool = connection::create_pool(&pool_config).await?;

    // Run database migrations
    connection::run_migrations(&pool).await?;

    // Initialize services
    info!("Initializing services...");
    let database = DatabaseService::new(pool);
    let services = ServiceFactory::with_logging_hooks(database, settings);

    // Start the background scheduler
    let shutdown = CancellationToken::new();
    let scheduler = services.scheduler(shutdown.clone());
    let scheduler_handle = scheduler.spawn();

    info!("Matchday engine is ready");

    // Run until ctrl-c, then stop the scheduler cleanly
    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    shutdown.cancel();
    scheduler_handle.await?;

    info!("Matchday engine has been shut down.");

    Ok(())
}
