// Feed configuration
pub const DEFAULT_FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_week.geojson";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Port configuration
pub const DEFAULT_PORT: u16 = 3001;

// Initial map view
pub const DEFAULT_CENTER: (f64, f64) = (38.0, -118.0);
pub const DEFAULT_ZOOM: u8 = 4;
pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

// Magnitude -> radius (pixels)
pub const MIN_RADIUS: f64 = 5.0;
pub const MAX_RADIUS: f64 = 25.0;

// Depth -> colour. Log scale floor keeps log(0) out of reach.
pub const DEPTH_FLOOR_KM: f64 = 0.1;

// Used when the feed is empty so no scale is built from infinite bounds
pub const FALLBACK_MAX_MAGNITUDE: f64 = 10.0;
pub const FALLBACK_MAX_DEPTH_KM: f64 = 700.0;

// Marker outline
pub const MARKER_OUTLINE_COLOR: &str = "white";
pub const MARKER_OUTLINE_WEIGHT: f64 = 0.2;
pub const MARKER_FILL_OPACITY: f64 = 0.8;

// Legends
pub const DEPTH_LEGEND_BOUNDARIES: [f64; 6] = [0.0, 10.0, 30.0, 50.0, 70.0, 90.0];
pub const MAGNITUDE_LEGEND_SAMPLES: [f64; 2] = [1.0, 5.0];
