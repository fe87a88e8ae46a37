use serde::{Deserialize, Serialize};

use crate::models::LatLng;
use crate::normalize::WeightPolicy;

/// Initial map centre (Maharashtra).
pub const DEFAULT_CENTER: LatLng = LatLng::new(19.7515, 75.7139);
pub const DEFAULT_ZOOM: u8 = 6;

/// Keyed raster tile template. `{z}`, `{x}`, `{y}` and `{key}` are substituted per tile.
pub const DEFAULT_TILE_URL_TEMPLATE: &str =
    "https://maps.geoapify.com/v1/tile/osm-bright/{z}/{x}/{y}.png?apiKey={key}";

/// Settings the server publishes at `/config.json` for the frontend to start with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    pub aggregate_url: String,
    pub detail_url: String,
    pub tile_url_template: String,
    pub map_api_key: String,
    pub initial_center: LatLng,
    pub initial_zoom: u8,
    #[serde(default)]
    pub weight_policy: WeightPolicy,
}

impl RuntimeConfig {
    pub fn tile_url(&self, zoom: u8, x: u32, y: u32) -> String {
        self.tile_url_template
            .replace("{z}", &zoom.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
            .replace("{key}", &self.map_api_key)
    }
}
