use rust_embed::RustEmbed;
use serde_json::json;
use std::path::Path;

use crate::constants::{TILE_ATTRIBUTION, TILE_URL};
use crate::error::QuakeMapError;
use crate::pipeline::QuakeMap;
use crate::settings::Settings;

#[derive(RustEmbed)]
#[folder = "frontend/"]
pub struct Asset;

const DATA_PLACEHOLDER: &str = "<!-- MAP_DATA_PLACEHOLDER -->";

/// Static files the page loads next to index.html
pub const STATIC_ASSETS: &[(&str, &str)] = &[
    ("style.css", "text/css"),
    ("script.js", "application/javascript"),
];

/// One of `STATIC_ASSETS` with its content type
pub fn static_asset(name: &str) -> Result<(&'static str, Vec<u8>), QuakeMapError> {
    let content_type = STATIC_ASSETS
        .iter()
        .find(|(asset_name, _)| *asset_name == name)
        .map(|(_, content_type)| *content_type)
        .ok_or_else(|| QuakeMapError::Template(format!("{} is not a static asset", name)))?;
    Ok((content_type, asset(name)?))
}

pub fn asset(name: &str) -> Result<Vec<u8>, QuakeMapError> {
    Asset::get(name)
        .map(|file| file.data.into_owned())
        .ok_or_else(|| QuakeMapError::Template(format!("missing embedded asset {}", name)))
}

/// The map page with the rendered markers and legends inlined as JSON
pub fn render_map_page(map: &QuakeMap, settings: &Settings) -> Result<String, QuakeMapError> {
    let template = String::from_utf8(asset("index.html")?)
        .map_err(|e| QuakeMapError::Template(format!("index.html is not UTF-8: {}", e)))?;

    let view = json!({
        "center": [settings.center_lat, settings.center_lng],
        "zoom": settings.zoom,
        "tileUrl": TILE_URL,
        "attribution": TILE_ATTRIBUTION,
    });
    let data = serde_json::to_string(map)
        .map_err(|e| QuakeMapError::Template(format!("failed to encode map data: {}", e)))?;

    let script = format!(
        "<script>\nwindow.QUAKE_VIEW = {};\nwindow.QUAKE_MAP = {};\n</script>",
        escape_script(&view.to_string()),
        escape_script(&data)
    );

    Ok(template.replace(DATA_PLACEHOLDER, &script))
}

// Popups carry markup, so a literal "</script>" inside the JSON must not end the block
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/")
}

/// Writes index.html plus its assets into `dir` as a standalone site
pub fn export_static(map: &QuakeMap, settings: &Settings, dir: &Path) -> Result<(), QuakeMapError> {
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join("index.html"), render_map_page(map, settings)?)?;
    for (name, _) in STATIC_ASSETS {
        std::fs::write(dir.join(name), asset(name)?)?;
    }

    tracing::info!("exported map with {} markers to {}", map.markers.len(), dir.display());
    Ok(())
}
