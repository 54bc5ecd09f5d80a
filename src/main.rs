use reelgraph::api::{create_router, AppState};
use reelgraph::config::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("reelgraph=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    let addr = config.bind_addr();

    // Initialize application state
    let state = AppState::in_memory(config);

    // Create the router with all routes
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
