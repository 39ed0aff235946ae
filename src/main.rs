use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scamscan_backend::{build_router, initialize_app_state};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scamscan_backend=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = scamscan_backend::app_config::config();
    let bind_address = config.server_addr();
    println!("=== STARTING SCAMSCAN BACKEND API ===");
    info!("Starting ScamScan backend on {}", bind_address);

    let state = initialize_app_state().await?;
    println!("✓ Store and analysis pipeline initialized");

    let app = build_router(state);

    println!("Starting HTTP server on {}...", bind_address);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
