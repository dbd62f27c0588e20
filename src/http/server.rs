//! HTTP server setup.
//!
//! # Responsibilities
//! - Create Axum Router with a single catch-all handler
//! - Wire up middleware (tracing)
//! - Bind server to listener with graceful shutdown
//! - Map routing outcomes to HTTP responses

use std::collections::BTreeMap;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::routing::{MatchError, ParamValue, RouteMatch, RouteMatcher};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub matcher: RouteMatcher,
}

/// Response body for a resolved request.
#[derive(Debug, Serialize)]
pub struct ResolvedRoute {
    pub name: Option<String>,
    pub handler: String,
    pub methods: Vec<String>,
    pub variables: BTreeMap<String, ParamValue>,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl From<&RouteMatch<'_>> for ResolvedRoute {
    fn from(found: &RouteMatch<'_>) -> Self {
        let descriptor = &found.route.descriptor;
        Self {
            name: descriptor.name.clone(),
            handler: descriptor.handler.to_string(),
            methods: descriptor.methods.iter().cloned().collect(),
            variables: found.variables.clone(),
            metadata: descriptor.metadata.clone(),
        }
    }
}

/// HTTP server that resolves every request against the routing table.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(matcher: RouteMatcher) -> Self {
        Self {
            router: build_router(matcher),
        }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(matcher: RouteMatcher) -> Router {
    Router::new()
        .route("/", any(dispatch))
        .route("/{*path}", any(dispatch))
        .with_state(AppState { matcher })
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| request.uri().host())
        .unwrap_or_default();
    let method = request.method().as_str();
    let path = request.uri().path();

    match state.matcher.match_request(host, method, path) {
        Ok(found) => {
            tracing::debug!(
                route = found.name().unwrap_or("-"),
                handler = %found.handler(),
                "Request resolved"
            );
            (StatusCode::OK, Json(ResolvedRoute::from(&found))).into_response()
        }
        Err(miss) => {
            tracing::debug!(host, method, path, miss = %miss, "Request not routed");
            miss_response(&miss)
        }
    }
}

fn miss_response(miss: &MatchError) -> Response {
    let status = match miss {
        MatchError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
        MatchError::NoRouteFound | MatchError::HostMismatch => StatusCode::NOT_FOUND,
    };
    let body = Json(serde_json::json!({ "error": miss.to_string() }));
    let mut response = (status, body).into_response();

    if let Some(allow) = miss.allow_header() {
        match HeaderValue::from_str(&allow) {
            Ok(value) => {
                response.headers_mut().insert(header::ALLOW, value);
            }
            Err(e) => tracing::warn!(error = %e, allow, "Unrepresentable Allow header"),
        }
    }
    response
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
