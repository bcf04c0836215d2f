// Extractor configuration
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Planet basemap tiles, keyed by map id and API key
pub const PLANET_URL_TEMPLATE: &str =
    "https://tiles.planet.com/basemaps/v1/planet-tiles/{map_id}/gmap/{z}/{x}/{y}.png?api_key={api_key}";

/// Settings shared by the extractor and the tile downloader. Built once and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Side length of every source tile, in pixels
    pub tile_size: u32,
    /// Tile URL with `{z}`, `{x}` and `{y}` placeholders
    pub url_template: String,
    /// Minimum pause between two tile requests
    pub request_delay_ms: u64,
    pub user_agent: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            tile_size: 256,
            url_template: String::new(),
            request_delay_ms: 200,
            user_agent: concat!("tilechip/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ExtractorConfig {
    /// Configuration for a Planet basemap
    pub fn planet(map_id: &str, api_key: &str) -> Self {
        Self {
            url_template: PLANET_URL_TEMPLATE
                .replace("{map_id}", map_id)
                .replace("{api_key}", api_key),
            ..Self::default()
        }
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planet_template() {
        let config = ExtractorConfig::planet("global_monthly_2020_01_mosaic", "KEY");
        assert_eq!(
            config.url_template,
            "https://tiles.planet.com/basemaps/v1/planet-tiles/global_monthly_2020_01_mosaic/gmap/{z}/{x}/{y}.png?api_key=KEY"
        );
        assert_eq!(config.tile_size, 256);
        assert_eq!(config.request_delay(), Duration::from_millis(200));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: ExtractorConfig =
            serde_json::from_str(r#"{"url_template": "http://localhost/{z}/{x}/{y}.png", "tile_size": 512}"#)
                .unwrap();
        assert_eq!(config.tile_size, 512);
        assert_eq!(config.request_delay_ms, 200);
        assert!(config.user_agent.starts_with("tilechip/"));
    }
}
