use std::path::PathBuf;

use heatmap_shared::config::{
    RuntimeConfig, DEFAULT_CENTER, DEFAULT_TILE_URL_TEMPLATE, DEFAULT_ZOOM,
};
use heatmap_shared::normalize::WeightPolicy;
use heatmap_shared::projection::{MAX_ZOOM, MIN_ZOOM};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub assets_dir: PathBuf,
    pub dist_dir: PathBuf,
    pub runtime: RuntimeConfig,
}

/// Load server configuration from the process environment, after reading `.env` if present.
pub fn load_server_config() -> Result<ServerConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_server_config(|key| std::env::var(key))
}

/// Build configuration from an env-var lookup, so tests can feed a plain map.
pub fn build_server_config<F>(lookup: F) -> Result<ServerConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        match lookup(var) {
            Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            _ => Err(ConfigError::MissingEnvVar(var.to_string())),
        }
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let port = or_default("PORT", "3000")
        .parse::<u16>()
        .map_err(|e| invalid("PORT", e.to_string()))?;

    let initial_zoom = or_default("INITIAL_ZOOM", &DEFAULT_ZOOM.to_string())
        .parse::<u8>()
        .map_err(|e| invalid("INITIAL_ZOOM", e.to_string()))?;
    if !(MIN_ZOOM..=MAX_ZOOM).contains(&initial_zoom) {
        return Err(invalid(
            "INITIAL_ZOOM",
            format!("{initial_zoom} is outside {MIN_ZOOM}..={MAX_ZOOM}"),
        ));
    }

    let weight_policy = or_default("WEIGHT_POLICY", "raw-count")
        .parse::<WeightPolicy>()
        .map_err(|e| invalid("WEIGHT_POLICY", e))?;

    let runtime = RuntimeConfig {
        aggregate_url: require("AGGREGATE_URL")?,
        detail_url: require("DETAIL_URL")?,
        tile_url_template: or_default("TILE_URL_TEMPLATE", DEFAULT_TILE_URL_TEMPLATE),
        map_api_key: require("MAP_API_KEY")?,
        initial_center: DEFAULT_CENTER,
        initial_zoom,
        weight_policy,
    };

    Ok(ServerConfig {
        port,
        assets_dir: PathBuf::from(or_default("ASSETS_DIR", "assets")),
        dist_dir: PathBuf::from(or_default("DIST_DIR", "dist")),
        runtime,
    })
}
