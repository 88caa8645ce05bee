use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::QuakeMapError;

// Wire format of the USGS GeoJSON summary feed. Only the fields we render are decoded.
// Features stay untyped here so one bad feature is a record error, not a feed error.
#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub id: Option<String>,
    pub properties: FeatureProperties,
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub struct FeatureProperties {
    pub mag: Option<f64>,
    /// Event time, epoch milliseconds
    pub time: Option<i64>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub felt: Option<u32>,
    #[serde(default)]
    pub alert: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    /// [longitude, latitude, depth]
    pub coordinates: Vec<f64>,
}

/// PAGER alert level attached to significant events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertLevel {
    Green,
    Yellow,
    Orange,
    Red,
    Other(String),
}

impl From<String> for AlertLevel {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "green" => AlertLevel::Green,
            "yellow" => AlertLevel::Yellow,
            "orange" => AlertLevel::Orange,
            "red" => AlertLevel::Red,
            _ => AlertLevel::Other(value),
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertLevel::Green => f.write_str("green"),
            AlertLevel::Yellow => f.write_str("yellow"),
            AlertLevel::Orange => f.write_str("orange"),
            AlertLevel::Red => f.write_str("red"),
            AlertLevel::Other(level) => f.write_str(level),
        }
    }
}

impl Serialize for AlertLevel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One earthquake, as rendered on the map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuakeEvent {
    pub id: Option<String>,
    pub magnitude: f64,
    pub longitude: f64,
    pub latitude: f64,
    /// Hypocentre depth in km
    pub depth: f64,
    pub time: DateTime<Utc>,
    pub place: String,
    pub url: Option<String>,
    pub felt: Option<u32>,
    pub alert: Option<AlertLevel>,
}

/// What to do with a feature that lacks a required field or carries a mistyped one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordPolicy {
    /// First invalid record aborts the whole load
    #[default]
    Strict,
    /// Invalid records are logged and dropped
    Skip,
}

impl TryFrom<(usize, Feature)> for QuakeEvent {
    type Error = QuakeMapError;

    fn try_from((index, feature): (usize, Feature)) -> Result<Self, Self::Error> {
        let Feature { id, properties, geometry } = feature;
        let invalid = |reason: &str| QuakeMapError::InvalidRecord {
            index,
            id: id.clone(),
            reason: reason.to_string(),
        };

        let magnitude = properties.mag.ok_or_else(|| invalid("missing magnitude"))?;
        let millis = properties.time.ok_or_else(|| invalid("missing time"))?;
        let time = Utc
            .timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| invalid("time out of range"))?;

        let (longitude, latitude, depth) = match geometry.coordinates[..] {
            [lon, lat, depth, ..] => (lon, lat, depth),
            _ => return Err(invalid("coordinates must be [lon, lat, depth]")),
        };

        Ok(QuakeEvent {
            id,
            magnitude,
            longitude,
            latitude,
            depth,
            time,
            place: properties.place.unwrap_or_default(),
            url: properties.url,
            felt: properties.felt,
            alert: properties.alert.map(AlertLevel::from),
        })
    }
}

fn decode_feature(index: usize, value: serde_json::Value) -> Result<QuakeEvent, QuakeMapError> {
    let id = value.get("id").and_then(|id| id.as_str()).map(str::to_string);
    let feature: Feature =
        serde_json::from_value(value).map_err(|e| QuakeMapError::InvalidRecord {
            index,
            id,
            reason: e.to_string(),
        })?;
    QuakeEvent::try_from((index, feature))
}

/// Decodes a feed body into events, applying `policy` to invalid records
pub fn parse_feed(body: &str, policy: RecordPolicy) -> Result<Vec<QuakeEvent>, QuakeMapError> {
    let collection: FeatureCollection = serde_json::from_str(body)?;
    let total = collection.features.len();

    let mut events = Vec::with_capacity(total);
    for (index, value) in collection.features.into_iter().enumerate() {
        match decode_feature(index, value) {
            Ok(event) => events.push(event),
            Err(err) if policy == RecordPolicy::Skip => {
                tracing::warn!("skipping record: {}", err);
            }
            Err(err) => return Err(err),
        }
    }

    if events.len() < total {
        tracing::warn!("dropped {} of {} features", total - events.len(), total);
    }

    Ok(events)
}

/// Performs the single GET against the feed. No retry: failures go straight back to the caller.
pub async fn fetch_events(
    client: &Client,
    url: &str,
    policy: RecordPolicy,
) -> Result<Vec<QuakeEvent>, QuakeMapError> {
    tracing::info!("fetching earthquake feed from {}", url);

    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let events = parse_feed(&body, policy)?;
    tracing::info!("decoded {} earthquake events", events.len());
    Ok(events)
}
