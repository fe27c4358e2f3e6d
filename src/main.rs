use anyhow::Context;
use dotenvy::dotenv;

use drivers_hub::logging::init_tracing;
use drivers_hub::metrics::init_metrics;
use drivers_hub::router::init_router;
use drivers_hub::state::AppState;
use drivers_hub_config::{CorsConfig, DatabaseConfig, EmailConfig, JwtConfig, ServerConfig};
use drivers_hub_core::errors::expose_internal_errors;
use drivers_hub_db::{init_db_pool, run_migrations};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let server_config = ServerConfig::from_env();
    let development = server_config.is_development();

    init_tracing(&server_config.log_dir, development);
    expose_internal_errors(development);

    let metrics = init_metrics(server_config.metrics_enabled)
        .context("Failed to install the Prometheus recorder")?;

    let database = DatabaseConfig::from_env().context("DATABASE_URL must be set")?;
    let db = init_db_pool(&database.url, database.max_connections)
        .await
        .context("Failed to connect to the database")?;
    run_migrations(&db).await.context("Failed to run migrations")?;

    let email_config = EmailConfig::from_env();
    let state = AppState::new(
        db,
        JwtConfig::from_env(),
        CorsConfig::from_env(),
        server_config.clone(),
        &email_config,
        metrics,
    )
    .context("Failed to configure the mail transport")?;

    tracing::info!(
        transport = state.email.transport_name(),
        upload_dir = %server_config.upload_dir.display(),
        environment = ?server_config.environment,
        "Application state ready"
    );

    let app = init_router(state);

    let addr = format!("0.0.0.0:{}", server_config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(%addr, "Server running");
    tracing::info!("Swagger UI available at http://localhost:{}/swagger-ui", server_config.port);
    tracing::info!("Scalar UI available at http://localhost:{}/scalar", server_config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
