use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use jury_server::bootstrap::build_state;
use jury_server::config::AppConfig;
use jury_server::database::init_db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load config")?;
    let db = init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    info!("Database connected and schema synced");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = build_state(db, config)
        .await
        .context("Failed to restore state")?;
    let app = jury_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
