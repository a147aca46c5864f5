// Forwarding service tests against a mocked upstream

use genia_gateway::config::UpstreamSettings;
use genia_gateway::models::{QueryRequest, QueryResponse, FALLBACK_MODEL};
use genia_gateway::services::{fallback_response, ForwardError, ForwardingService};
use reqwest::StatusCode;
use tokio::net::TcpListener;

const UNREACHABLE_UPSTREAM: &str = "http://127.0.0.1:1";

fn service(base_url: &str) -> ForwardingService {
    ForwardingService::new(&UpstreamSettings::new(base_url)).unwrap()
}

fn request(prompt: &str) -> QueryRequest {
    QueryRequest::new(prompt)
        .with_parameter("max_tokens", 150)
        .with_parameter("temperature", 0.7)
}

/// Upstream that accepts connections and never answers, with a 1s client timeout
async fn silent_upstream() -> ForwardingService {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let mut settings = UpstreamSettings::new(format!("http://{}", addr));
    settings.timeout_secs = 1;
    ForwardingService::new(&settings).unwrap()
}

#[tokio::test]
async fn test_strict_passes_response_through_unchanged() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/query")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"response":"La IA","tokens_used":42,"model":"genia-api","processing_time":0.5}"#,
        )
        .create_async()
        .await;

    let response = service(&server.url())
        .forward_strict(&request("Que es la IA?"))
        .await
        .unwrap();

    let mut expected = QueryResponse::new("La IA", 42, "genia-api");
    expected.processing_time = Some(0.5);
    assert_eq!(response, expected);
}

#[tokio::test]
async fn test_strict_unreachable_is_unavailable() {
    let err = service(UNREACHABLE_UPSTREAM)
        .forward_strict(&request("hi"))
        .await
        .unwrap_err();

    assert!(matches!(err, ForwardError::UpstreamUnavailable { .. }), "got {:?}", err);
    assert_eq!(err.to_string(), "Python service is not available");
}

#[tokio::test]
async fn test_strict_timeout_is_unavailable() {
    let err = silent_upstream()
        .await
        .forward_strict(&request("hi"))
        .await
        .unwrap_err();

    assert!(matches!(err, ForwardError::UpstreamUnavailable { .. }), "got {:?}", err);
    assert_eq!(err.kind(), "upstream_unavailable");
}

#[tokio::test]
async fn test_lenient_timeout_falls_back() {
    let response = silent_upstream()
        .await
        .forward_lenient(&request("slow upstream"))
        .await;

    assert_eq!(response.model, FALLBACK_MODEL);
    assert_eq!(response.tokens_used, 2);
}

#[tokio::test]
async fn test_strict_client_error_is_rejected() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/query")
        .with_status(422)
        .with_body(r#"{"detail":"prompt too long"}"#)
        .create_async()
        .await;

    let err = service(&server.url()).forward_strict(&request("hi")).await.unwrap_err();
    match err {
        ForwardError::UpstreamRejected { status, body, .. } => {
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert!(body.contains("prompt too long"));
        }
        other => panic!("expected UpstreamRejected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_strict_server_error_is_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/query")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let err = service(&server.url()).forward_strict(&request("hi")).await.unwrap_err();
    match err {
        ForwardError::UpstreamFailure { status, body, .. } => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, "boom");
        }
        other => panic!("expected UpstreamFailure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_strict_not_modified_is_unknown() {
    let mut server = mockito::Server::new_async().await;
    server.mock("POST", "/query").with_status(304).create_async().await;

    let err = service(&server.url()).forward_strict(&request("hi")).await.unwrap_err();
    assert!(matches!(err, ForwardError::UnknownForwardingError(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_strict_unparseable_body_is_unknown() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/query")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"text":"missing response field"}"#)
        .create_async()
        .await;

    let err = service(&server.url()).forward_strict(&request("hi")).await.unwrap_err();
    assert!(matches!(err, ForwardError::UnknownForwardingError(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_strict_negative_tokens_is_unknown() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/query")
        .with_status(200)
        .with_body(r#"{"response":"x","tokens_used":-3,"model":"genia-api"}"#)
        .create_async()
        .await;

    let err = service(&server.url()).forward_strict(&request("hi")).await.unwrap_err();
    assert!(matches!(err, ForwardError::UnknownForwardingError(_)));
}

#[tokio::test]
async fn test_lenient_never_fails() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/query/mock")
        .with_status(500)
        .create_async()
        .await;

    for base in [server.url(), UNREACHABLE_UPSTREAM.to_string()] {
        let response = service(&base).forward_lenient(&request("hello world")).await;
        assert_eq!(response.model, FALLBACK_MODEL);
        assert_eq!(response.tokens_used, 2);
        assert!(response
            .response
            .starts_with("[FALLBACK] Gateway mock response for: 'hello world'."));
    }
}

#[tokio::test]
async fn test_lenient_uses_mock_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let strict = server.mock("POST", "/query").expect(0).create_async().await;
    let mock = server
        .mock("POST", "/query/mock")
        .with_status(200)
        .with_body(r#"{"response":"[MOCK] ok","tokens_used":1,"model":"mock-genia"}"#)
        .create_async()
        .await;

    let response = service(&server.url()).forward_lenient(&request("ok")).await;

    assert_eq!(response.model, "mock-genia");
    mock.assert_async().await;
    strict.assert_async().await;
}

#[test]
fn test_fallback_uses_configured_name() {
    let response = fallback_response(&QueryRequest::new("a b c d"), "GenIA");
    assert_eq!(response.tokens_used, 4);
    assert!(response.response.ends_with("GenIA service is not available."));
}
