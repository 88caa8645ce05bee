use serde::Serialize;
use std::fmt::Write;

use crate::constants::{MARKER_FILL_OPACITY, MARKER_OUTLINE_COLOR, MARKER_OUTLINE_WEIGHT};
use crate::feed::QuakeEvent;
use crate::scale::{Color, Scales};

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Leaflet `circleMarker` options plus its popup, one per earthquake
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleMarker {
    pub lat: f64,
    pub lng: f64,
    pub radius: f64,
    pub fill_color: Color,
    pub fill_opacity: f64,
    pub color: &'static str,
    pub weight: f64,
    pub popup: String,
}

impl CircleMarker {
    pub fn from_event(event: &QuakeEvent, scales: &Scales) -> Self {
        Self {
            lat: event.latitude,
            lng: event.longitude,
            radius: scales.radius(event.magnitude),
            fill_color: scales.color(event.depth),
            fill_opacity: MARKER_FILL_OPACITY,
            color: MARKER_OUTLINE_COLOR,
            weight: MARKER_OUTLINE_WEIGHT,
            popup: popup_html(event),
        }
    }
}

/// Second pass: one marker per event, in feed order
pub fn render_markers(events: &[QuakeEvent], scales: &Scales) -> Vec<CircleMarker> {
    events
        .iter()
        .map(|event| CircleMarker::from_event(event, scales))
        .collect()
}

/// Popup body for one earthquake. Depth, felt reports and alert level appear only when set.
pub fn popup_html(event: &QuakeEvent) -> String {
    let mut html = String::from("<h3>Earthquake Information</h3>\n<ul>\n");

    // Writing into a String cannot fail
    let _ = writeln!(html, "<li><strong>Magnitude:</strong> {}</li>", event.magnitude);
    let _ = writeln!(
        html,
        "<li><strong>Location:</strong> {}</li>",
        escape_html(&event.place)
    );
    let _ = writeln!(
        html,
        "<li><strong>Time:</strong> {}</li>",
        event.time.format(TIME_FORMAT)
    );
    if event.depth != 0.0 {
        let _ = writeln!(html, "<li><strong>Depth:</strong> {} km</li>", event.depth);
    }
    if let Some(felt) = event.felt.filter(|&felt| felt > 0) {
        let _ = writeln!(html, "<li><strong>Felt Reports:</strong> {}</li>", felt);
    }
    if let Some(alert) = &event.alert {
        let _ = writeln!(
            html,
            "<li><strong>Alert Level:</strong> {}</li>",
            escape_html(&alert.to_string())
        );
    }
    html.push_str("</ul>\n");

    if let Some(url) = &event.url {
        let _ = writeln!(
            html,
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">More Information</a>",
            escape_html(url)
        );
    }

    html
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
