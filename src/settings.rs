use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_CENTER, DEFAULT_FEED_URL, DEFAULT_PORT, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_ZOOM,
};
use crate::feed::RecordPolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub feed_url: String,
    pub port: u16,
    #[serde(default)]
    pub auto_open_browser: bool,
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: u8,
    #[serde(default)]
    pub skip_invalid_records: bool,
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub export_dir: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            port: DEFAULT_PORT,
            auto_open_browser: false,
            center_lat: DEFAULT_CENTER.0,
            center_lng: DEFAULT_CENTER.1,
            zoom: DEFAULT_ZOOM,
            skip_invalid_records: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            export_dir: None,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Reads the config file. When none exists yet, a commented default one is written in its place.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let settings = Settings::default();
            if let Err(e) = settings.save_to(config_path) {
                tracing::warn!("could not write default config {}: {}", config_path.display(), e);
            }
            return Ok(settings);
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        Ok(Self::parse(&content))
    }

    /// Parses `key = value` lines. Unknown keys are ignored, unparsable values keep the default.
    pub fn parse(content: &str) -> Self {
        let mut settings = Settings::default();
        let mut config_map = HashMap::new();

        for line in content.lines() {
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                config_map.insert(key.trim().to_string(), value.trim().trim_matches('"').to_string());
            }
        }

        if let Some(feed_url) = config_map.get("feed_url") {
            if !feed_url.is_empty() {
                settings.feed_url = feed_url.clone();
            }
        }
        if let Some(export_dir) = config_map.get("export_dir") {
            if !export_dir.is_empty() {
                settings.export_dir = Some(export_dir.clone());
            }
        }
        parse_into(&config_map, "port", &mut settings.port);
        parse_into(&config_map, "auto_open_browser", &mut settings.auto_open_browser);
        parse_into(&config_map, "center_lat", &mut settings.center_lat);
        parse_into(&config_map, "center_lng", &mut settings.center_lng);
        parse_into(&config_map, "zoom", &mut settings.zoom);
        parse_into(&config_map, "skip_invalid_records", &mut settings.skip_invalid_records);
        parse_into(&config_map, "request_timeout_secs", &mut settings.request_timeout_secs);

        settings
    }

    pub fn to_ini(&self) -> String {
        let mut content = String::new();
        content.push_str("# QuakeMap Configuration File\n");
        content.push_str(&format!("feed_url = \"{}\"\n", self.feed_url));
        content.push_str(&format!("port = {}\n", self.port));
        content.push_str(&format!("auto_open_browser = {}\n", self.auto_open_browser));
        content.push_str(&format!("center_lat = {}\n", self.center_lat));
        content.push_str(&format!("center_lng = {}\n", self.center_lng));
        content.push_str(&format!("zoom = {}\n", self.zoom));
        content.push_str(&format!("skip_invalid_records = {}\n", self.skip_invalid_records));
        content.push_str(&format!("request_timeout_secs = {}\n", self.request_timeout_secs));
        if let Some(ref export_dir) = self.export_dir {
            content.push_str(&format!("export_dir = \"{}\"\n", export_dir));
        }
        content
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Creating config directory")?;
        }
        std::fs::write(config_path, self.to_ini()).context("Failed to write to config file")?;
        Ok(())
    }

    pub fn record_policy(&self) -> RecordPolicy {
        if self.skip_invalid_records {
            RecordPolicy::Skip
        } else {
            RecordPolicy::Strict
        }
    }

    pub fn config_path() -> PathBuf {
        let mut path = std::env::current_exe()
            .unwrap_or_default()
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        if path.ends_with("target/debug") || path.ends_with("target/release") {
            path.pop();
            path.pop();
        }
        path.push("quakemap.ini");
        path
    }
}

fn parse_into<T: std::str::FromStr>(map: &HashMap<String, String>, key: &str, target: &mut T) {
    if let Some(parsed) = map.get(key).and_then(|raw| raw.parse::<T>().ok()) {
        *target = parsed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        assert_eq!(Settings::parse(""), Settings::default());
        assert_eq!(Settings::parse("# only a comment\n\n"), Settings::default());
    }

    #[test]
    fn parses_known_keys() {
        let settings = Settings::parse(
            "# QuakeMap\n\
             feed_url = \"https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_day.geojson\"\n\
             port = 8088\n\
             zoom = 6\n\
             center_lat = 61.2\n\
             center_lng = -150.5\n\
             skip_invalid_records = true\n\
             export_dir = \"site\"\n",
        );
        assert!(settings.feed_url.ends_with("all_day.geojson"));
        assert_eq!(settings.port, 8088);
        assert_eq!(settings.zoom, 6);
        assert_eq!(settings.center_lat, 61.2);
        assert_eq!(settings.center_lng, -150.5);
        assert_eq!(settings.record_policy(), RecordPolicy::Skip);
        assert_eq!(settings.export_dir.as_deref(), Some("site"));
    }

    #[test]
    fn bad_values_keep_defaults() {
        let settings = Settings::parse("port = eighty\nzoom = 300\nrequest_timeout_secs = -1\n");
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.zoom, DEFAULT_ZOOM);
        assert_eq!(settings.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(settings.record_policy(), RecordPolicy::Strict);
    }

    #[test]
    fn ini_round_trip() {
        let settings = Settings {
            port: 4000,
            auto_open_browser: true,
            export_dir: Some("/tmp/quakes".to_string()),
            ..Settings::default()
        };
        assert_eq!(Settings::parse(&settings.to_ini()), settings);
    }

    #[test]
    fn missing_file_loads_defaults_and_writes_them() {
        let dir = std::env::temp_dir().join(format!("quakemap-config-{}", std::process::id()));
        let path = dir.join("quakemap.ini");
        let _ = std::fs::remove_dir_all(&dir);

        assert_eq!(Settings::load_from(&path).unwrap(), Settings::default());
        assert!(path.exists());

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# QuakeMap Configuration File"));
        assert_eq!(Settings::load_from(&path).unwrap(), Settings::default());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = std::env::temp_dir().join(format!("quakemap-save-{}", std::process::id()));
        let path = dir.join("quakemap.ini");
        let settings = Settings {
            port: 5050,
            skip_invalid_records: true,
            ..Settings::default()
        };

        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
