use std::net::SocketAddr;

use admin_server::{build_router, config::load_settings, AppState, Directory, API_PREFIX};
use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let directory = if settings.seed_demo_data {
        Directory::with_demo_data()
    } else {
        Directory::new()
    };
    let app = build_router(AppState::new(directory));

    let addr: SocketAddr = settings
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.bind_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        %addr,
        prefix = API_PREFIX,
        seeded = settings.seed_demo_data,
        "admin api listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
