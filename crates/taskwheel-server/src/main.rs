use std::sync::Arc;

use tracing::info;

use taskwheel_core::db;
use taskwheel_core::repository::SqliteRepository;
use taskwheel_server::config::Config;
use taskwheel_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let config = Config::load()?;

    info!("Opening database at {}", config.db_path);
    let pool = db::establish_connection(&config.db_path).await?;

    let state = Arc::new(AppState {
        repo: SqliteRepository::new(pool),
    });
    let app = taskwheel_server::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
