use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use trajview_config::ViewerConfig;
use trajview_server::{build_router, ServerState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let config = ViewerConfig::from_env()?;
    match &config.demo_trace {
        Some(path) => info!("Demo trace: {}", path.display()),
        None => warn!("Demo endpoint disabled: TRAJVIEW_DEMO_TRACE not configured"),
    }

    let addr = config.server.addr.clone();
    let app = build_router(Arc::new(ServerState::new(config)));

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
