use crate::models::{
    DependencyHealth, DetailedHealthResponse, ErrorResponse, QueryRequest, QueryResponse,
    StatusResponse,
};
use crate::services::ForwardingService;
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use tracing::Instrument;
use validator::Validate;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub forwarding: Arc<ForwardingService>,
    pub service_name: String,
}

/// Configure all gateway routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/query", web::post().to(query))
        .route("/query/mock", web::post().to(query_mock))
        .route("/health", web::get().to(health))
        .route("/health/detailed", web::get().to(health_detailed))
        .route("/status", web::get().to(status));
}

fn reject_invalid(req: &QueryRequest) -> Option<HttpResponse> {
    let errors = req.validate().err()?;
    tracing::info!("Validation failed for query request: {}", errors);
    Some(HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    }))
}

/// Query endpoint
///
/// POST /api/genia/query
///
/// Returns the upstream answer, or a 500 whose body is still a
/// `QueryResponse` with model `"error"`.
async fn query(state: web::Data<AppState>, req: web::Json<QueryRequest>) -> impl Responder {
    if let Some(rejection) = reject_invalid(&req) {
        return rejection;
    }

    let span = tracing::info_span!("query", request_id = %uuid::Uuid::new_v4());

    async move {
        tracing::info!("Received query request: {}", req.prompt);

        match state.forwarding.forward_strict(&req).await {
            Ok(response) => {
                tracing::info!("Query processed successfully");
                HttpResponse::Ok().json(response)
            }
            Err(e) => {
                tracing::error!(kind = e.kind(), "Error processing query: {}", e);
                HttpResponse::InternalServerError().json(QueryResponse::error(&e))
            }
        }
    }
    .instrument(span)
    .await
}

/// Mock query endpoint
///
/// POST /api/genia/query/mock
///
/// Always 200: the forwarding service substitutes a fallback answer
/// when the upstream mock is unavailable.
async fn query_mock(state: web::Data<AppState>, req: web::Json<QueryRequest>) -> impl Responder {
    if let Some(rejection) = reject_invalid(&req) {
        return rejection;
    }

    let span = tracing::info_span!("query_mock", request_id = %uuid::Uuid::new_v4());

    async move {
        tracing::info!("Received mock query request: {}", req.prompt);
        let response = state.forwarding.forward_lenient(&req).await;
        tracing::info!("Mock query processed (model: {})", response.model);
        HttpResponse::Ok().json(response)
    }
    .instrument(span)
    .await
}

/// Liveness check, independent of the upstream
async fn health() -> impl Responder {
    tracing::debug!("Health check requested");
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Gateway is healthy")
}

/// Health check including the upstream dependency
async fn health_detailed(state: web::Data<AppState>) -> impl Responder {
    let upstream_healthy = state.forwarding.probe_health().await;

    let status = if upstream_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(DetailedHealthResponse {
        status: status.to_string(),
        service: state.service_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        dependencies: DependencyHealth {
            upstream: if upstream_healthy { "healthy" } else { "unhealthy" }.to_string(),
        },
    })
}

/// Service metadata
async fn status(state: web::Data<AppState>) -> impl Responder {
    tracing::debug!("Status check requested");
    HttpResponse::Ok().json(StatusResponse {
        service: state.service_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
        timestamp: chrono::Utc::now().timestamp_millis(),
    })
}
