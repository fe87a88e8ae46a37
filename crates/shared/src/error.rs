use thiserror::Error;

/// Failure of a call to the aggregate or detail backend.
///
/// Every variant ends up as "no data" on screen; the distinction only feeds the logs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("response body is not valid JSON: {0}")]
    Decode(String),

    #[error("response has unexpected shape: {0}")]
    Shape(String),

    #[error("backend reported status \"{0}\"")]
    Rejected(String),
}

/// Parse a raw response body. An empty body is a decode failure, not an empty result.
pub fn decode_body(text: &str) -> Result<serde_json::Value, ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::Decode("empty body".to_string()));
    }
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}
