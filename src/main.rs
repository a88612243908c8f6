use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use slotbook_api::config::ApiConfig;
use slotbook_core::Scheduler;
use slotbook_db::{PgSlotStore, create_pool, schema::initialize_database};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;

    // Create database connection pool
    let db_pool = create_pool(&config.database_url, config.database_max_connections).await?;

    // Initialize database schema
    initialize_database(&db_pool).await?;

    let scheduler =
        Scheduler::new(Arc::new(PgSlotStore::new(db_pool))).with_timezone(config.timezone);

    // Start API server
    slotbook_api::start_server(config, scheduler).await?;

    Ok(())
}
