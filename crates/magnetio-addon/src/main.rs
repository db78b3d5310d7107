//! Magnetio addon server
//!
//! Serves the multi-source torrent pipeline over the media-player addon
//! protocol. Configuration comes from the environment: `OMDB_API_KEY`
//! for the metadata service and `PORT` for the listen port.

mod manifest;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use magnetio_core::{ScraperConfig, TorrentScraper};

use routes::{create_router, AppState};

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let api_key = std::env::var("OMDB_API_KEY").unwrap_or_else(|_| {
        warn!("OMDB_API_KEY not set, metadata lookups will fail");
        String::new()
    });

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let scraper = TorrentScraper::new(ScraperConfig::new(api_key))?;
    let state = AppState {
        scraper: Arc::new(scraper),
    };

    let app = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Addon running on port {}", port);
    info!("Add to player: http://localhost:{}/manifest.json", port);

    axum::serve(listener, app).await?;
    Ok(())
}
