use crate::config::UpstreamSettings;
use crate::models::{QueryRequest, QueryResponse, FALLBACK_MODEL};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Ways a forwarded query can fail
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("{service} service is not available")]
    UpstreamUnavailable {
        service: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid request to {service} service: {status}")]
    UpstreamRejected {
        service: String,
        status: StatusCode,
        body: String,
    },

    #[error("{service} service internal error: {status}")]
    UpstreamFailure {
        service: String,
        status: StatusCode,
        body: String,
    },

    #[error("Unexpected error processing query: {0}")]
    UnknownForwardingError(String),
}

impl ForwardError {
    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardError::UpstreamUnavailable { .. } => "upstream_unavailable",
            ForwardError::UpstreamRejected { .. } => "upstream_rejected",
            ForwardError::UpstreamFailure { .. } => "upstream_failure",
            ForwardError::UnknownForwardingError(_) => "unknown",
        }
    }

    fn from_transport(service: &str, err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() || err.is_body() {
            ForwardError::UpstreamUnavailable {
                service: service.to_string(),
                source: err,
            }
        } else {
            ForwardError::UnknownForwardingError(err.to_string())
        }
    }
}

/// Client for the downstream query-processing service
///
/// Holds the only connection pool to the upstream. `reqwest::Client` is
/// internally reference counted, so a single instance serves every
/// concurrent request.
pub struct ForwardingService {
    base_url: String,
    name: String,
    client: Client,
}

impl ForwardingService {
    /// Create a new forwarding service from upstream settings
    pub fn new(settings: &UpstreamSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .build()?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            name: settings.name.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Forward to `<base>/query`, surfacing every failure
    pub async fn forward_strict(
        &self,
        request: &QueryRequest,
    ) -> Result<QueryResponse, ForwardError> {
        tracing::info!("Processing query with {} service: {}", self.name, self.base_url);

        let response = self.post_query("/query", request).await?;

        tracing::info!("Successfully received response from {} service", self.name);
        Ok(response)
    }

    /// Forward to `<base>/query/mock`, substituting a fallback on any failure
    pub async fn forward_lenient(&self, request: &QueryRequest) -> QueryResponse {
        tracing::info!("Processing mock query with {} service", self.name);

        match self.post_query("/query/mock", request).await {
            Ok(response) => {
                tracing::info!("Successfully received mock response from {} service", self.name);
                response
            }
            Err(e) => {
                tracing::warn!(
                    "{} mock call failed ({}), using fallback: {}",
                    self.name,
                    e.kind(),
                    e
                );
                fallback_response(request, &self.name)
            }
        }
    }

    /// Probe `<base>/health` once
    pub async fn probe_health(&self) -> bool {
        let url = format!("{}/health", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Upstream health probe failed: {}", e);
                false
            }
        }
    }

    async fn post_query(
        &self,
        path: &str,
        request: &QueryRequest,
    ) -> Result<QueryResponse, ForwardError> {
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!("Calling {} service at: {}", self.name, url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Connection error to {} service: {}", self.name, e);
                ForwardError::from_transport(&self.name, e)
            })?;

        let status = response.status();

        if status.is_client_error() || status.is_server_error() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            let service = self.name.clone();

            if status.is_client_error() {
                tracing::error!("Client error from {} service: {} - {}", self.name, status, body);
                return Err(ForwardError::UpstreamRejected { service, status, body });
            }

            tracing::error!("Server error from {} service: {} - {}", self.name, status, body);
            return Err(ForwardError::UpstreamFailure { service, status, body });
        }

        if !status.is_success() {
            tracing::error!("Unexpected status from {} service: {}", self.name, status);
            return Err(ForwardError::UnknownForwardingError(format!(
                "unexpected upstream status {}",
                status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ForwardError::from_transport(&self.name, e))?;

        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!("Invalid response from {} service: {}", self.name, e);
            ForwardError::UnknownForwardingError(format!("invalid upstream response: {}", e))
        })
    }
}

/// Gateway-made answer used when the mock upstream cannot be reached
///
/// The token count is the number of whitespace-separated words in the
/// prompt, not a real tokenizer count.
pub fn fallback_response(request: &QueryRequest, upstream_name: &str) -> QueryResponse {
    QueryResponse::new(
        format!(
            "[FALLBACK] Gateway mock response for: '{}'. {} service is not available.",
            request.prompt, upstream_name
        ),
        request.prompt.split_whitespace().count() as u32,
        FALLBACK_MODEL,
    )
}
