use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod handlers;
pub mod state;

pub use self::state::AppState;
use handlers::{
    get_earthquakes, get_legends, get_map, get_settings, index_html, refresh_map, script_js,
    style_css,
};

// Create the main application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_html))
        .route("/style.css", get(style_css))
        .route("/script.js", get(script_js))
        .route("/api/earthquakes", get(get_earthquakes))
        .route("/api/legends", get(get_legends))
        .route("/api/map", get(get_map))
        .route("/api/refresh", post(refresh_map))
        .route("/api/settings", get(get_settings))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState) -> Result<()> {
    let port = state.settings.port;
    let auto_open = state.settings.auto_open_browser;
    let app = create_app(state);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;

    let url = format!("http://{}", addr);
    tracing::info!("HTTP server started at {}", url);
    tracing::info!("API endpoints:");
    tracing::info!("   - GET  /api/earthquakes - circle markers for every event");
    tracing::info!("   - GET  /api/legends     - depth and magnitude legends");
    tracing::info!("   - GET  /api/map         - full rendered map data");
    tracing::info!("   - POST /api/refresh     - fetch the feed again");

    if auto_open {
        if let Err(e) = crate::utils::open_browser(&url) {
            tracing::warn!("could not open browser: {}", e);
        }
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested, stopping server");
}
