use serde::{Deserialize, Serialize};

/// Model label used when the strict path fails
pub const ERROR_MODEL: &str = "error";

/// Model label used for gateway-synthesized fallback answers
pub const FALLBACK_MODEL: &str = "gateway-fallback";

/// Answer to a query, either relayed from upstream or built by the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub response: String,
    #[serde(default)]
    pub tokens_used: u32,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
}

impl QueryResponse {
    pub fn new(response: impl Into<String>, tokens_used: u32, model: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            tokens_used,
            model: model.into(),
            processing_time: None,
        }
    }

    /// Degraded answer returned alongside a 500 on the strict path
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self::new(format!("Error: {}", message), 0, ERROR_MODEL)
    }
}

/// Static service metadata for the status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub service: String,
    pub version: String,
    pub status: String,
    /// Unix epoch milliseconds
    pub timestamp: i64,
}

/// Health check including the upstream dependency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub dependencies: DependencyHealth,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyHealth {
    pub upstream: String,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
