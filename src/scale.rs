use palette::{named, Mix, Srgb};
use serde::{Serialize, Serializer};
use std::fmt;

use crate::constants::{
    DEPTH_FLOOR_KM, FALLBACK_MAX_DEPTH_KM, FALLBACK_MAX_MAGNITUDE, MAX_RADIUS, MIN_RADIUS,
};
use crate::feed::QuakeEvent;

/// Observed extrema of one feed fetch. `None` means the feed was empty.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FeedBounds {
    pub count: usize,
    pub max_magnitude: Option<f64>,
    pub max_depth: Option<f64>,
    pub min_depth: Option<f64>,
}

impl FeedBounds {
    /// First pass over the events; must run before any marker is drawn
    pub fn from_events(events: &[QuakeEvent]) -> Self {
        events.iter().fold(FeedBounds::default(), |bounds, event| FeedBounds {
            count: bounds.count + 1,
            max_magnitude: max_of(bounds.max_magnitude, event.magnitude),
            max_depth: max_of(bounds.max_depth, event.depth),
            min_depth: min_of(bounds.min_depth, event.depth),
        })
    }
}

fn max_of(current: Option<f64>, value: f64) -> Option<f64> {
    if !value.is_finite() {
        return current;
    }
    Some(current.map_or(value, |c| c.max(value)))
}

fn min_of(current: Option<f64>, value: f64) -> Option<f64> {
    if !value.is_finite() {
        return current;
    }
    Some(current.map_or(value, |c| c.min(value)))
}

/// Linear map from a numeric domain onto a numeric range, clamped to the range
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    #[cfg(test)]
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (r0, r1) = self.range;
        let t = normalize(self.domain.0, self.domain.1, value);
        r0 + (r1 - r0) * t
    }
}

/// 0..1 position of `value` in `[d0, d1]`. A zero-width (or unusable) domain collapses to 0.5.
fn normalize(d0: f64, d1: f64, value: f64) -> f64 {
    let width = d1 - d0;
    if !width.is_finite() || width <= 0.0 {
        return 0.5;
    }
    if !value.is_finite() {
        return 0.0;
    }
    ((value - d0) / width).clamp(0.0, 1.0)
}

/// An sRGB colour, rendered as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub Srgb<u8>);

impl Color {
    pub fn red(&self) -> u8 {
        self.0.red
    }

    pub fn green(&self) -> u8 {
        self.0.green
    }

    pub fn blue(&self) -> u8 {
        self.0.blue
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red(), self.green(), self.blue())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Log-transformed domain mapped onto a two-colour gradient.
/// Inputs at or below the domain floor (including zero and negatives) take the start colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogColorScale {
    domain: (f64, f64),
    start: Srgb<f32>,
    end: Srgb<f32>,
}

impl LogColorScale {
    pub fn new(domain: (f64, f64), start: Srgb<u8>, end: Srgb<u8>) -> Self {
        Self {
            domain,
            start: start.into_format(),
            end: end.into_format(),
        }
    }

    #[cfg(test)]
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn apply(&self, value: f64) -> Color {
        let (d0, d1) = self.domain;
        let t = if value.is_finite() {
            let clamped = value.max(d0);
            normalize(d0.ln(), d1.ln(), clamped.ln())
        } else {
            normalize(d0.ln(), d1.ln(), f64::NAN)
        };
        let mixed = self.start.mix(self.end, t as f32);
        Color(mixed.into_format())
    }
}

impl Serialize for LogColorScale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("LogColorScale", 3)?;
        state.serialize_field("domain", &self.domain)?;
        state.serialize_field("start", &Color(self.start.into_format()))?;
        state.serialize_field("end", &Color(self.end.into_format()))?;
        state.end()
    }
}

/// The two transfer functions shared by the marker renderer and both legends
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scales {
    pub magnitude: LinearScale,
    pub depth: LogColorScale,
}

impl Scales {
    pub fn from_bounds(bounds: &FeedBounds) -> Self {
        let max_magnitude = bounds.max_magnitude.unwrap_or(FALLBACK_MAX_MAGNITUDE).max(0.0);
        let max_depth = bounds
            .max_depth
            .unwrap_or(FALLBACK_MAX_DEPTH_KM)
            .max(DEPTH_FLOOR_KM);

        tracing::info!("max magnitude: {}, max depth: {} km", max_magnitude, max_depth);

        Self {
            magnitude: LinearScale::new((0.0, max_magnitude), (MIN_RADIUS, MAX_RADIUS)),
            depth: LogColorScale::new((DEPTH_FLOOR_KM, max_depth), named::YELLOW, named::RED),
        }
    }

    pub fn radius(&self, magnitude: f64) -> f64 {
        self.magnitude.apply(magnitude)
    }

    pub fn color(&self, depth: f64) -> Color {
        self.depth.apply(depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use float_cmp::assert_approx_eq;

    fn event(magnitude: f64, depth: f64) -> QuakeEvent {
        QuakeEvent {
            id: None,
            magnitude,
            longitude: 0.0,
            latitude: 0.0,
            depth,
            time: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
            place: String::new(),
            url: None,
            felt: None,
            alert: None,
        }
    }

    #[test]
    fn bounds_track_extrema() {
        let events = vec![event(2.5, 12.0), event(6.1, 640.0), event(-0.4, -1.2)];
        let bounds = FeedBounds::from_events(&events);
        assert_eq!(bounds.count, 3);
        assert_eq!(bounds.max_magnitude, Some(6.1));
        assert_eq!(bounds.max_depth, Some(640.0));
        assert_eq!(bounds.min_depth, Some(-1.2));
    }

    #[test]
    fn empty_feed_uses_fallback_bounds() {
        let bounds = FeedBounds::from_events(&[]);
        assert_eq!(bounds.max_magnitude, None);
        assert_eq!(bounds.max_depth, None);

        let scales = Scales::from_bounds(&bounds);
        assert_eq!(scales.magnitude.domain(), (0.0, FALLBACK_MAX_MAGNITUDE));
        assert_eq!(scales.depth.domain(), (DEPTH_FLOOR_KM, FALLBACK_MAX_DEPTH_KM));
        assert!(scales.radius(4.0).is_finite());
        assert_eq!(scales.color(10.0).red(), 255);
    }

    #[test]
    fn magnitude_scale_is_linear_over_domain() {
        let scale = LinearScale::new((0.0, 8.0), (MIN_RADIUS, MAX_RADIUS));
        assert_approx_eq!(f64, scale.apply(0.0), 5.0);
        assert_approx_eq!(f64, scale.apply(4.0), 15.0);
        assert_approx_eq!(f64, scale.apply(8.0), 25.0);
        assert_approx_eq!(f64, scale.apply(2.0), 10.0);
    }

    #[test]
    fn magnitude_scale_stays_in_range_and_is_monotonic() {
        let scales = Scales::from_bounds(&FeedBounds::from_events(&[event(7.2, 10.0)]));
        let mut previous = f64::MIN;
        for step in -20..=100 {
            let radius = scales.radius(step as f64 * 0.1);
            assert!((MIN_RADIUS..=MAX_RADIUS).contains(&radius), "radius {radius}");
            assert!(radius >= previous);
            previous = radius;
        }
        assert_approx_eq!(f64, scales.radius(-1.5), MIN_RADIUS);
    }

    #[test]
    fn zero_width_magnitude_domain_collapses_to_midpoint() {
        let scales = Scales::from_bounds(&FeedBounds::from_events(&[event(0.0, 5.0)]));
        assert_approx_eq!(f64, scales.radius(0.0), 15.0);
        assert_approx_eq!(f64, scales.radius(3.0), 15.0);

        let all_negative = Scales::from_bounds(&FeedBounds::from_events(&[event(-0.8, 5.0)]));
        assert_approx_eq!(f64, all_negative.radius(-0.8), 15.0);
    }

    #[test]
    fn depth_scale_runs_yellow_to_red() {
        let scales = Scales::from_bounds(&FeedBounds::from_events(&[event(3.0, 100.0)]));
        assert_eq!(scales.color(DEPTH_FLOOR_KM).to_string(), "#ffff00");
        assert_eq!(scales.color(100.0).to_string(), "#ff0000");

        // log midpoint of [0.1, 100] is sqrt(10)
        let mid = scales.color(10f64.sqrt());
        assert_eq!(mid.red(), 255);
        assert!((127..=128).contains(&mid.green()), "green {}", mid.green());
        assert_eq!(mid.blue(), 0);
    }

    #[test]
    fn depth_scale_is_monotonic() {
        let scales = Scales::from_bounds(&FeedBounds::from_events(&[event(3.0, 650.0)]));
        let mut previous_green = u8::MAX;
        for depth in [0.2, 1.0, 5.0, 10.0, 33.0, 70.0, 150.0, 400.0, 650.0] {
            let color = scales.color(depth);
            assert_eq!(color.red(), 255);
            assert_eq!(color.blue(), 0);
            assert!(color.green() <= previous_green);
            previous_green = color.green();
        }
    }

    #[test]
    fn depth_at_or_below_floor_clamps() {
        let scales = Scales::from_bounds(&FeedBounds::from_events(&[event(3.0, 300.0)]));
        assert_eq!(scales.color(0.0).to_string(), "#ffff00");
        assert_eq!(scales.color(-3.5).to_string(), "#ffff00");
        assert_eq!(scales.color(f64::NAN).to_string(), "#ffff00");
        assert_eq!(scales.color(5000.0).to_string(), "#ff0000");
    }

    #[test]
    fn shallow_feed_degenerates_depth_scale() {
        let scales = Scales::from_bounds(&FeedBounds::from_events(&[event(1.0, 0.0)]));
        assert_eq!(scales.depth.domain(), (DEPTH_FLOOR_KM, DEPTH_FLOOR_KM));
        let color = scales.color(0.0);
        assert_eq!(color.red(), 255);
        assert!((127..=128).contains(&color.green()));
    }

    #[test]
    fn color_serializes_as_hex() {
        let json = serde_json::to_string(&Color(Srgb::new(255, 128, 0))).unwrap();
        assert_eq!(json, "\"#ff8000\"");
    }
}
