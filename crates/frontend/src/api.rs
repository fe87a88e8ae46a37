use heatmap_shared::agent::AgentRecord;
use heatmap_shared::config::RuntimeConfig;
use heatmap_shared::detail::parse_detail_response;
use heatmap_shared::error::{decode_body, ApiError};
use heatmap_shared::models::{BoundsQuery, DetailQuery};
use serde::Serialize;
use serde_json::Value;

/// Build the runtime config URL from the page origin.
pub fn config_url(origin: &str) -> String {
    format!("{}/config.json", origin.trim_end_matches('/'))
}

fn page_origin() -> Result<String, ApiError> {
    web_sys::window()
        .ok_or_else(|| ApiError::Transport("no window".to_string()))?
        .location()
        .origin()
        .map_err(|_| ApiError::Transport("page origin unavailable".to_string()))
}

/// Turn a status code and raw body into JSON, treating non-2xx and empty bodies as failures.
pub fn interpret_response(status: u16, body: &str) -> Result<Value, ApiError> {
    if !(200..300).contains(&status) {
        return Err(ApiError::Status(status));
    }
    decode_body(body)
}

async fn post_json<B: Serialize>(url: &str, body: &B) -> Result<Value, ApiError> {
    let resp = reqwest::Client::new()
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = resp.status().as_u16();
    let text = resp
        .text()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    interpret_response(status, &text)
}

/// POST the viewport bounds and return the raw aggregate body for normalization.
pub async fn fetch_aggregate(url: &str, query: &BoundsQuery) -> Result<Value, ApiError> {
    post_json(url, query).await
}

/// POST a locality's coordinates and return its agent roster.
pub async fn fetch_locality_detail(
    url: &str,
    query: &DetailQuery,
) -> Result<Vec<AgentRecord>, ApiError> {
    let body = post_json(url, query).await?;
    parse_detail_response(&body)
}

pub async fn fetch_runtime_config() -> Result<RuntimeConfig, ApiError> {
    let url = config_url(&page_origin()?);
    let resp = reqwest::get(&url)
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = resp.status().as_u16();
    let text = resp
        .text()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    let value = interpret_response(status, &text)?;
    serde_json::from_value(value).map_err(|e| ApiError::Shape(e.to_string()))
}
