use threaded_posts::{AppState, AppConfig};
use threaded_posts::routes::create_routes;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use std::net::SocketAddr;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("❌ Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received, draining connections...");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Load configuration from environment
    let config = AppConfig::from_env();

    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    info!("Starting threaded posts server...");

    // Initialize application state
    let app_state = AppState::new(config.clone()).await?;
    info!("Application state initialized ({} storage)", app_state.db.backend_name());

    // Build our application with routes
    let app = create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(app_state);

    let addr: SocketAddr = config.server_address().parse()?;
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", config.server_address());

    // Start serving requests
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
