use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use prodimg_resolver::{ResolutionRequest, ResolverError};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, AppState};

/// `debug` is a presence flag: `?debug` and `?debug=anything` both enable it.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ResolveQuery {
    pub site: Option<String>,
    pub subcode: Option<String>,
    pub ean: Option<String>,
    pub name: Option<String>,
    pub debug: Option<String>,
}

pub(super) async fn resolve_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ResolveQuery>,
) -> Response {
    let site = query
        .site
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(&state.default_site);

    let request = ResolutionRequest::new(
        site,
        query.subcode.as_deref(),
        query.ean.as_deref(),
        query.name.as_deref(),
        query.debug.is_some(),
    );

    tracing::info!(
        request_id = %req_id.0,
        site = %request.site,
        subcode = ?request.subcode,
        ean = ?request.ean,
        name = ?request.name,
        "resolve request"
    );

    match state.resolver.resolve(&request).await {
        Ok(outcome) => {
            let status = if outcome.is_match() {
                StatusCode::OK
            } else {
                StatusCode::NOT_FOUND
            };
            let body = outcome.into_body(request.debug);
            (
                status,
                [(header::CACHE_CONTROL, state.cache_control.clone())],
                Json(body),
            )
                .into_response()
        }
        Err(ResolverError::MissingIdentifier) => ApiError::new(
            "bad_request",
            "at least one of subcode, ean or name is required",
        )
        .into_response(),
        Err(e) => {
            tracing::error!(request_id = %req_id.0, error = %e, "resolution failed");
            ApiError::new("internal_error", "resolution failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use prodimg_core::ResolverSettings;
    use prodimg_resolver::Resolver;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::super::tests::offline_state;
    use super::super::{build_app, AppState};
    use super::*;

    fn mock_state(server: &MockServer) -> AppState {
        let settings = ResolverSettings {
            search_url: format!("{}/html/", server.uri()),
            user_agent: "prodimg-test/0.1".to_string(),
            request_timeout_secs: 5,
            ..ResolverSettings::default()
        };
        AppState::new(Resolver::new(&settings).expect("resolver"), "127.0.0.1", 604_800)
    }

    fn serp(hrefs: &[String]) -> String {
        hrefs
            .iter()
            .map(|h| format!(r#"<a class="result__a" href="{h}">r</a>"#))
            .collect()
    }

    async fn get_json(
        app: axum::Router,
        uri: &str,
    ) -> (StatusCode, axum::http::HeaderMap, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header("origin", "https://shop.example")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&body).expect("json parse");
        (status, headers, json)
    }

    #[tokio::test]
    async fn missing_identifiers_returns_400() {
        let (status, _, json) =
            get_json(build_app(offline_state()), "/api/v1/resolve?site=bringo.ma&debug").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().is_some_and(|m| !m.is_empty()));
    }

    #[tokio::test]
    async fn blank_identifiers_count_as_missing() {
        let (status, _, _) = get_json(
            build_app(offline_state()),
            "/api/v1/resolve?subcode=&ean=%20&name=",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn subcode_match_returns_200_with_headers() {
        let server = MockServer::start().await;
        let uri = server.uri();

        Mock::given(method("GET"))
            .and(path("/html/"))
            .and(query_param("q", "site:127.0.0.1 694062"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(serp(&[format!("{uri}/p/123")])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/p/123"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<meta property="og:image" content="/img/x.jpg"><li>Numéro du produit: 694062</li>"#,
            ))
            .mount(&server)
            .await;

        let (status, headers, json) =
            get_json(build_app(mock_state(&server)), "/api/v1/resolve?subcode=694062").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["matchedBy"].as_str(), Some("subcode/ean"));
        assert_eq!(json["score"].as_f64(), Some(1.0));
        assert_eq!(json["imageUrl"].as_str(), Some(format!("{uri}/img/x.jpg").as_str()));
        assert_eq!(json["productUrl"].as_str(), Some(format!("{uri}/p/123").as_str()));
        assert!(json.get("tried").is_none(), "trace only in debug mode");

        assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "public, max-age=604800");
        assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
        assert!(headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/json")));
    }

    #[tokio::test]
    async fn debug_flag_includes_trace_on_success() {
        let server = MockServer::start().await;
        let uri = server.uri();

        Mock::given(method("GET"))
            .and(path("/html/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(serp(&[format!("{uri}/p/1")])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/p/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<img class="product-photo" src="https://cdn.example.com/1.jpg"> 694062"#,
            ))
            .mount(&server)
            .await;

        let (status, _, json) = get_json(
            build_app(mock_state(&server)),
            "/api/v1/resolve?subcode=694062&debug",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let tried = json["tried"].as_array().expect("tried array");
        assert_eq!(tried.len(), 1);
        assert_eq!(tried[0]["strategy"].as_str(), Some("subcode"));
        assert_eq!(tried[0]["httpOk"].as_bool(), Some(true));
        assert_eq!(tried[0]["matched"].as_bool(), Some(true));
    }

    #[tokio::test]
    async fn ean_miss_returns_404_with_trace() {
        let server = MockServer::start().await;
        let uri = server.uri();

        Mock::given(method("GET"))
            .and(path("/html/"))
            .and(query_param("q", "site:127.0.0.1 3616479540274"))
            .respond_with(ResponseTemplate::new(200).set_body_string(serp(&[
                format!("{uri}/p/1"),
                "https://elsewhere.example/p/1".to_string(),
                format!("{uri}/p/2"),
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/p/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>nothing</p>"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/p/2"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let (status, headers, json) = get_json(
            build_app(mock_state(&server)),
            "/api/v1/resolve?ean=3616479540274",
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["imageUrl"].is_null());
        assert!(json["productUrl"].is_null());
        assert!(json["matchedBy"].is_null());
        assert_eq!(json["score"].as_f64(), Some(0.0));
        let tried = json["tried"].as_array().expect("tried array");
        assert_eq!(tried.len(), 2);
        assert!(tried
            .iter()
            .all(|t| !t["url"].as_str().unwrap_or_default().contains("elsewhere")));
        assert_eq!(tried[1]["outcome"].as_str(), Some("fetch_failed"));
        assert!(headers.contains_key(header::CACHE_CONTROL));
    }

    #[tokio::test]
    async fn name_match_reports_rounded_score() {
        let server = MockServer::start().await;
        let uri = server.uri();

        Mock::given(method("GET"))
            .and(path("/html/"))
            .and(query_param("q", "site:127.0.0.1 Salon Bas Lanka"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(serp(&[format!("{uri}/p/lanka")])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/p/lanka"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<title>Salon Bas Lanka Gris Anthracite 3 Places</title>
                   <meta property="og:image" content="https://cdn.example.com/lanka.jpg">"#,
            ))
            .mount(&server)
            .await;

        let (status, _, json) = get_json(
            build_app(mock_state(&server)),
            "/api/v1/resolve?name=Salon%20Bas%20Lanka",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["matchedBy"].as_str(), Some("name"));
        assert_eq!(json["score"].as_f64(), Some(0.65));
        assert_eq!(
            json["imageUrl"].as_str(),
            Some("https://cdn.example.com/lanka.jpg")
        );
    }
}
