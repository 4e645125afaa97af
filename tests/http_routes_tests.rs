mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use common::{completion_with_content, gateway_for, request_count};
use nutri_gateway::server::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app_for(server: &MockServer) -> Router {
    let (gateway, _) = gateway_for(server);
    router(AppState::new(gateway))
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn mount_status(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_analyze_meal_returns_ingredient_array() {
    let server = MockServer::start().await;
    mount_status(
        &server,
        200,
        completion_with_content(
            r#"{"ingredients": [{"name":"2 huevos","quantity":120,"calories":155,"protein":12.5,"carbs":1.1,"fat":10.6}]}"#,
        ),
    )
    .await;

    let (status, body) = post_json(app_for(&server), "/analyze-meal", json!({"description": "huevos"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{"name":"2 huevos","quantity":120.0,"calories":155.0,"protein":12.5,"carbs":1.1,"fat":10.6}])
    );
}

#[tokio::test]
async fn test_analyze_meal_rejects_blank_description() {
    let server = MockServer::start().await;

    for payload in [json!({"description": "   "}), json!({})] {
        let (status, body) = post_json(app_for(&server), "/analyze-meal", payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_analyze_meal_without_ingredients_is_bad_request() {
    let server = MockServer::start().await;
    mount_status(&server, 200, completion_with_content(r#"{"ingredients": []}"#)).await;

    let (status, body) = post_json(app_for(&server), "/analyze-meal", json!({"description": "nada"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_analyze_meal_parse_failure_is_server_error() {
    let server = MockServer::start().await;
    mount_status(&server, 200, completion_with_content("{not json")).await;

    let (status, body) = post_json(app_for(&server), "/analyze-meal", json!({"description": "sopa"})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_chatgpt_relays_upstream_body() {
    let server = MockServer::start().await;
    let upstream = completion_with_content("Hola");
    mount_status(&server, 200, upstream.clone()).await;

    let (status, body) = post_json(
        app_for(&server),
        "/chatgpt",
        json!({"messages": [{"role": "user", "content": "Hola"}]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, upstream);
}

#[tokio::test]
async fn test_chatgpt_requires_messages() {
    let server = MockServer::start().await;

    for payload in [json!({}), json!({"messages": []})] {
        let (status, body) = post_json(app_for(&server), "/chatgpt", payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_chatgpt_rate_limit_is_reported_as_429() {
    let server = MockServer::start().await;
    mount_status(&server, 429, json!({"error": {"message": "Rate limit reached"}})).await;

    let (status, body) = post_json(
        app_for(&server),
        "/chatgpt",
        json!({"messages": [{"role": "user", "content": "Hola"}]}),
    )
    .await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["type"], "rate_limit");
    assert!(body["error"].is_string());
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn test_chatgpt_upstream_error_carries_details() {
    let server = MockServer::start().await;
    mount_status(&server, 401, json!({"error": {"message": "Incorrect API key"}})).await;

    let (status, body) = post_json(
        app_for(&server),
        "/chatgpt",
        json!({"messages": [{"role": "user", "content": "Hola"}]}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["details"].as_str().unwrap().contains("Incorrect API key"));
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_health_reports_healthy() {
    let server = MockServer::start().await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let response = app_for(&server).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
}
