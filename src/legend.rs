use serde::Serialize;
use std::fmt::Write;

use crate::constants::{DEPTH_LEGEND_BOUNDARIES, MAGNITUDE_LEGEND_SAMPLES};
use crate::scale::{Color, Scales};

/// Corner of the map a legend control is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPosition {
    BottomRight,
    BottomLeft,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepthBucket {
    pub lower: f64,
    pub upper: Option<f64>,
    pub color: Color,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepthLegend {
    pub position: LegendPosition,
    pub buckets: Vec<DepthBucket>,
}

impl DepthLegend {
    /// Each bucket is coloured with the depth scale one km past its lower boundary
    pub fn build(scales: &Scales) -> Self {
        let buckets = DEPTH_LEGEND_BOUNDARIES
            .iter()
            .enumerate()
            .map(|(i, &lower)| {
                let upper = DEPTH_LEGEND_BOUNDARIES.get(i + 1).copied();
                let label = match upper {
                    Some(upper) => format!("{}\u{2013}{}", lower, upper),
                    None => format!("{}+", lower),
                };
                DepthBucket {
                    lower,
                    upper,
                    color: scales.color(lower + 1.0),
                    label,
                }
            })
            .collect();

        Self {
            position: LegendPosition::BottomRight,
            buckets,
        }
    }

    pub fn to_html(&self) -> String {
        let mut html = String::from("<div class=\"legend-title\">Depth</div>");
        for bucket in &self.buckets {
            let _ = write!(
                html,
                "<i style=\"background:{}\"></i> {}",
                bucket.color, bucket.label
            );
            if bucket.upper.is_some() {
                html.push_str("<br>");
            }
        }
        html
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MagnitudeSample {
    pub magnitude: f64,
    pub radius: f64,
    pub diameter: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MagnitudeLegend {
    pub position: LegendPosition,
    pub samples: Vec<MagnitudeSample>,
}

impl MagnitudeLegend {
    pub fn build(scales: &Scales) -> Self {
        let samples = MAGNITUDE_LEGEND_SAMPLES
            .iter()
            .map(|&magnitude| {
                let radius = scales.radius(magnitude);
                MagnitudeSample {
                    magnitude,
                    radius,
                    diameter: 2.0 * radius,
                }
            })
            .collect();

        Self {
            position: LegendPosition::BottomLeft,
            samples,
        }
    }

    pub fn to_html(&self) -> String {
        let mut html = String::from("<div class=\"legend-title\">Magnitude</div>");
        for sample in &self.samples {
            let _ = write!(
                html,
                "<div class=\"legend-circle\" style=\"width: {d}px; height: {d}px; border-radius: 50%; border: 2px solid #000;\">\
                 <span class=\"legend-label\">{m}</span></div> ",
                d = sample.diameter,
                m = sample.magnitude
            );
        }
        html
    }
}

/// Both legend panels with their markup, as handed to the browser
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendPanels {
    pub depth: DepthLegend,
    pub depth_html: String,
    pub magnitude: MagnitudeLegend,
    pub magnitude_html: String,
}

impl LegendPanels {
    pub fn build(scales: &Scales) -> Self {
        let depth = DepthLegend::build(scales);
        let magnitude = MagnitudeLegend::build(scales);
        Self {
            depth_html: depth.to_html(),
            magnitude_html: magnitude.to_html(),
            depth,
            magnitude,
        }
    }
}
