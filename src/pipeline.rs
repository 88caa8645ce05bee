use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use std::time::{Duration, Instant};

use crate::error::QuakeMapError;
use crate::feed::{fetch_events, QuakeEvent};
use crate::legend::LegendPanels;
use crate::marker::{render_markers, CircleMarker};
use crate::scale::{FeedBounds, Scales};
use crate::settings::Settings;

/// Everything the browser needs to draw one fetch of the feed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuakeMap {
    pub generated_at: DateTime<Utc>,
    pub bounds: FeedBounds,
    pub scales: Scales,
    pub markers: Vec<CircleMarker>,
    pub legends: LegendPanels,
}

impl QuakeMap {
    /// Bounds over the full set first, then scales, markers and legends
    pub fn build(events: &[QuakeEvent]) -> Self {
        let bounds = FeedBounds::from_events(events);
        let scales = Scales::from_bounds(&bounds);
        let markers = render_markers(events, &scales);
        let legends = LegendPanels::build(&scales);

        Self {
            generated_at: Utc::now(),
            bounds,
            scales,
            markers,
            legends,
        }
    }
}

pub fn build_http_client(settings: &Settings) -> Result<Client, QuakeMapError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// fetch → bounds → scales → markers → legends
pub async fn load_quake_map(client: &Client, settings: &Settings) -> Result<QuakeMap, QuakeMapError> {
    let start = Instant::now();

    let events = fetch_events(client, &settings.feed_url, settings.record_policy()).await?;
    let map = QuakeMap::build(&events);

    tracing::info!(
        "rendered {} markers in {:?}",
        map.markers.len(),
        start.elapsed()
    );
    Ok(map)
}
