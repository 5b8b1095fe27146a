use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::info;

use error_shield::{
    api::{create_router, router::AppState},
    infrastructure::{init_tracing, load_code_table, TracingLogSink},
    Config, ErrorDispatcher,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env();
    config.validate()?;

    // Initialize tracing with structured logging
    init_tracing(config.log_format()?);
    info!("Starting error_shield service");

    // Code table is built once and never changes afterwards
    let table = load_code_table(config.error_handling.code_table_path.as_deref())
        .context("Failed to load database code table")?;
    info!(codes = table.len(), "Database code table ready");

    let sink = TracingLogSink::new(config.error_handling.log_client_errors);
    let dispatcher = Arc::new(ErrorDispatcher::new(Arc::new(table), Arc::new(sink)));

    // Lazy pool: the service starts without the database, readiness reports it
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
        .connect_lazy(&config.database_url)
        .context("Invalid DATABASE_URL")?;

    let app = create_router(AppState { pool }, dispatcher);

    // Start server
    info!("Listening on {}", config.listen_addr);
    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
