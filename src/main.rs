mod config;
mod contact;
mod content_loader;
mod error;
mod hot_reload;
mod layout;
mod markdown;
mod models;
mod routes;
mod slug;
mod state;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::{net::TcpListener, sync::broadcast};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::SiteConfig;
use crate::content_loader::load_content;
use crate::hot_reload::start_content_watcher;
use crate::routes::build_router;
use crate::state::{AppState, RouterState};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = SiteConfig::load()?;
    info!(
        content_dir = %config.content_dir.display(),
        development = config.is_development,
        "Loaded site configuration"
    );

    let content = load_content(&config)
        .await
        .context("Failed to load initial content files")?;
    let port = config.port;
    let is_development = config.is_development;
    let state = Arc::new(AppState::new(config, content));

    let (tx, _rx) = broadcast::channel(1);
    if is_development {
        info!("Hot reload enabled. Check logs for file change events.");
        start_content_watcher(tx.clone(), state.clone());
    }

    let app = build_router(RouterState {
        app_state: state,
        broadcaster: tx,
    })
    .context("Failed to register the default layout")?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "listening");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
