use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse, Json, Response},
};
use serde_json::json;

use crate::error::QuakeMapError;
use crate::html_template::{render_map_page, static_asset};
use crate::legend::LegendPanels;
use crate::marker::CircleMarker;
use crate::pipeline::{load_quake_map, QuakeMap};
use crate::settings::Settings;

use super::state::AppState;

pub async fn index_html(State(state): State<AppState>) -> Result<Html<String>, QuakeMapError> {
    let map = state.snapshot();
    Ok(Html(render_map_page(&map, &state.settings)?))
}

fn serve_asset(name: &str) -> Result<Response, QuakeMapError> {
    let (content_type, content) = static_asset(name)?;
    Ok(([(header::CONTENT_TYPE, content_type)], content).into_response())
}

pub async fn style_css() -> Result<Response, QuakeMapError> {
    serve_asset("style.css")
}

pub async fn script_js() -> Result<Response, QuakeMapError> {
    serve_asset("script.js")
}

// HTTP API Handlers
pub async fn get_earthquakes(State(state): State<AppState>) -> Json<Vec<CircleMarker>> {
    Json(state.snapshot().markers)
}

pub async fn get_legends(State(state): State<AppState>) -> Json<LegendPanels> {
    Json(state.snapshot().legends)
}

pub async fn get_map(State(state): State<AppState>) -> Json<QuakeMap> {
    Json(state.snapshot())
}

pub async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
    Json((*state.settings).clone())
}

/// Runs the whole pipeline again. The previous map stays published if the fetch fails.
pub async fn refresh_map(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, QuakeMapError> {
    tracing::info!("refresh requested");
    let map = load_quake_map(&state.http_client, &state.settings).await?;

    let count = map.markers.len();
    let generated_at = map.generated_at;
    state.publish(map);

    Ok(Json(json!({
        "status": "success",
        "count": count,
        "generated_at": generated_at,
    })))
}
