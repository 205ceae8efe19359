mod resolve;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use prodimg_resolver::Resolver;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id;

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
    /// Used when a request omits `site`.
    pub default_site: Arc<str>,
    /// `cache-control` value for resolved (200) and unresolved (404) answers.
    pub cache_control: HeaderValue,
}

impl AppState {
    #[must_use]
    pub fn new(resolver: Resolver, default_site: &str, cache_max_age_secs: u64) -> Self {
        Self {
            resolver: Arc::new(resolver),
            default_site: Arc::from(default_site),
            cache_control: HeaderValue::from_str(&format!(
                "public, max-age={cache_max_age_secs}"
            ))
            .unwrap_or_else(|_| HeaderValue::from_static("no-store")),
        }
    }
}

/// Error body: `{"error": "..."}`. The code only selects the status.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub code: &'static str,
    pub error: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

impl ApiError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            error: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.code {
            "bad_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
        .expose_headers([HeaderName::from_static("x-request-id")])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/resolve", get(resolve::resolve_product))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthData { status: "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use prodimg_core::ResolverSettings;
    use tower::ServiceExt;

    pub(super) fn offline_state() -> AppState {
        let settings = ResolverSettings {
            search_url: "http://127.0.0.1:9/html/".to_string(),
            request_timeout_secs: 1,
            ..ResolverSettings::default()
        };
        AppState::new(
            Resolver::new(&settings).expect("resolver"),
            "bringo.ma",
            604_800,
        )
    }

    #[test]
    fn api_error_bad_request_maps_to_400() {
        let response = ApiError::new("bad_request", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_unknown_code_maps_to_internal_error() {
        let response = ApiError::new("boom", "unexpected").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn app_state_formats_cache_control() {
        let state = offline_state();
        assert_eq!(state.cache_control, "public, max-age=604800");
        assert_eq!(&*state.default_site, "bringo.ma");
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let response = build_app(offline_state())
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        assert_eq!(json["status"].as_str(), Some("ok"));
    }
}
