//! The axum collaborator maps routing outcomes to status codes.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use trie_router::http::build_router;

use common::app_provider;

fn app() -> Router {
    build_router(app_provider().matcher().unwrap())
}

async fn send(method: &str, host: &str, uri: &str) -> (StatusCode, Option<String>, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, host)
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    let status = response.status();
    let allow = response
        .headers()
        .get(header::ALLOW)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, allow, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_resolved_route_is_described() {
    let (status, _, body) = send("GET", "localhost", "/users/12?expand=posts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "users.show");
    assert_eq!(body["handler"], "UserController@show");
    assert_eq!(body["variables"]["id"], 12);
    assert_eq!(body["metadata"]["auth"], true);
}

#[tokio::test]
async fn test_host_variables_from_host_header() {
    let (status, _, body) = send("GET", "acme.example.com", "/dashboard/settings").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["variables"]["tenant"], "acme");
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let (status, allow, body) = send("GET", "localhost", "/nothing/here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(allow.is_none());
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_host_mismatch_is_404() {
    let (status, _, _) = send("GET", "localhost", "/dashboard").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wrong_method_is_405_with_allow() {
    let (status, allow, _) = send("PATCH", "localhost", "/users").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(allow.as_deref(), Some("GET, POST"));
}

#[tokio::test]
async fn test_escaped_path_values_reach_handlers_decoded() {
    let (status, _, body) = send("GET", "localhost", "/tags/two%20words%3F").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "tags.show");
    assert_eq!(body["variables"]["tag"], "two words?");
}
