use anyhow::Context;
use tracing::info;

use store::config::AppConfig;
use store::state::AppState;
use store::{build_router, database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = database::init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    seed::promote_staff(&db, &config.auth.staff_usernames)
        .await
        .context("Failed to promote staff users")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    let app = build_router(AppState { db, config });
    axum::serve(listener, app).await?;

    Ok(())
}
