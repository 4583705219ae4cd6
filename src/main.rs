use marketchat::core::{AppState, Config, db};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 1. Load the configuration; invalid values abort startup
    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;
    config.print_info();

    // 2. Open the message store and apply the migrations
    let settings = config.chat_settings();
    let pool = db::connect(
        &config.database_url,
        config.max_connections,
        Duration::from_millis(config.store_timeout_ms),
    )
    .await
    .map_err(|e| {
        error!("Failed to open the message store: {}", e);
        e
    })?;

    // 3. Shared state and router
    let state = Arc::new(AppState::new(pool, config.jwt_secret.clone(), settings));
    let app = marketchat::create_router(state);

    // 4. Serve
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
