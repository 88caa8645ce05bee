use anyhow::{Context, Result};
use std::path::Path;
use tracing_subscriber::EnvFilter;

mod constants;
mod error;
mod feed;
mod html_template;
mod legend;
mod marker;
mod pipeline;
mod scale;
mod server;
mod settings;
mod utils;

use pipeline::{build_http_client, load_quake_map};
use server::{start_server, AppState};
use settings::Settings;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("quakemap=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    tracing::info!("QuakeMap v{} starting", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load().context("Failed to load settings")?;
    tracing::info!("config file: {}", Settings::config_path().display());

    let http_client = build_http_client(&settings).context("Failed to build HTTP client")?;

    // fetch -> bounds -> scales -> markers -> legends, once, before serving
    let map = load_quake_map(&http_client, &settings)
        .await
        .with_context(|| format!("Failed to load earthquake feed from {}", settings.feed_url))?;

    if let Some(ref export_dir) = settings.export_dir {
        html_template::export_static(&map, &settings, Path::new(export_dir))
            .with_context(|| format!("Failed to export map to {}", export_dir))?;
    }

    let app_state = AppState::new(settings, http_client, map);
    start_server(app_state).await?;

    Ok(())
}
