mod analyze;
mod chat;
mod isochrone;
mod location;
mod validate;

use std::{sync::Arc, time::Duration};

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use hotspot_chat::CompletionClient;
use hotspot_core::{AppConfig, ScoringWeights};
use hotspot_places::{LatLongClient, OverpassClient, PlacesError};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

pub const SERVICE_NAME: &str = "Hotspot IQ API";
pub const SERVICE_VERSION: &str = "1.0.0";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub weights: Arc<ScoringWeights>,
    pub overpass: Arc<OverpassClient>,
    pub latlong: Arc<LatLongClient>,
    pub chat: Option<Arc<CompletionClient>>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_places_error(request_id: String, error: &PlacesError) -> ApiError {
    tracing::error!(error = %error, "upstream place provider failed");
    ApiError::new(request_id, "upstream_error", "place provider request failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

fn limited_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/analyze", post(analyze::analyze))
        .route("/api/recommended-spots", post(analyze::recommended_spots))
        .route("/api/isochrone", post(isochrone::isochrone))
        .route("/api/validate", post(validate::validate))
        .route("/api/chat", post(chat::chat))
        .route("/api/poi", get(location::points_of_interest))
        .route("/api/autocomplete", get(location::autocomplete))
        .route("/api/geocode", get(location::geocode))
        .route("/api/reverse-geocode", get(location::reverse_geocode))
        .route("/api/digipin", get(location::digipin))
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        )))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new()
        .route("/api/health", get(health))
        .route("/", get(root));

    Router::new()
        .merge(public_routes)
        .merge(limited_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData {
            status: "healthy",
            service: SERVICE_NAME,
            version: SERVICE_VERSION,
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

async fn root(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    Json(ApiResponse {
        data: json!({
            "name": SERVICE_NAME,
            "description": "Hyper-Local Location Intelligence for Smarter Business Expansion",
            "version": SERVICE_VERSION,
            "endpoints": {
                "health": "/api/health",
                "autocomplete": "/api/autocomplete?query={search_term}",
                "analyze": "POST /api/analyze",
                "recommended_spots": "POST /api/recommended-spots",
                "isochrone": "POST /api/isochrone",
                "validate": "POST /api/validate",
                "digipin": "/api/digipin?lat={lat}&lng={lng}",
                "chat": "POST /api/chat",
            },
        }),
        meta: ResponseMeta::new(req_id.0),
    })
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let config = hotspot_core::load_app_config_from_env().expect("default config");
        let overpass =
            OverpassClient::new(config.http_timeout_secs, config.road_check_timeout_secs, 0, 0)
                .expect("client");
        let latlong = LatLongClient::new(
            "",
            hotspot_places::latlong::DEFAULT_BASE_URL,
            config.http_timeout_secs,
            0,
            0,
        )
        .expect("client");
        AppState {
            config: Arc::new(config),
            weights: Arc::new(ScoringWeights::default()),
            overpass: Arc::new(overpass),
            latlong: Arc::new(latlong),
            chat: None,
        }
    }

    fn test_app() -> Router {
        build_app(test_state(), default_rate_limit_state())
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_upstream_error_maps_to_bad_gateway() {
        let response = ApiError::new("req-1", "upstream_error", "provider down").into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn health_reports_service_identity() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let parsed: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(parsed["data"]["status"], "healthy");
        assert_eq!(parsed["data"]["service"], "Hotspot IQ API");
        assert!(parsed["meta"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn root_lists_endpoints() {
        let response = test_app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let parsed: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(parsed["data"]["endpoints"]["analyze"], "POST /api/analyze");
    }

    #[tokio::test]
    async fn request_id_header_is_propagated() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header("x-request-id", "fixed-id")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(
            response.headers().get("x-request-id").map(|v| v.to_str().ok()),
            Some(Some("fixed-id"))
        );
    }

    fn state_with(overpass_endpoints: Vec<String>, latlong_base: &str) -> AppState {
        let config = hotspot_core::load_app_config_from_env().expect("default config");
        let overpass = OverpassClient::with_endpoints(10, 5, 0, 0, overpass_endpoints).expect("client");
        let latlong = LatLongClient::new("test-key", latlong_base, 10, 0, 0).expect("client");
        AppState {
            config: Arc::new(config),
            weights: Arc::new(ScoringWeights::default()),
            overpass: Arc::new(overpass),
            latlong: Arc::new(latlong),
            chat: None,
        }
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn analyze_rejects_missing_coordinates() {
        let response = test_app()
            .oneshot(post_json(
                "/api/analyze",
                serde_json::json!({ "business_type": "cafe" }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let parsed = body_json(response).await;
        assert_eq!(parsed["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn chat_rejects_empty_message() {
        let response = test_app()
            .oneshot(post_json("/api/chat", serde_json::json!({ "message": "" })))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn isochrone_rejects_out_of_range_distance() {
        let response = test_app()
            .oneshot(post_json(
                "/api/isochrone",
                serde_json::json!({ "lat": 12.97, "lng": 77.59, "distance_km": 90.0 }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let parsed = body_json(response).await;
        assert_eq!(parsed["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn isochrone_falls_back_to_circle_when_provider_is_down() {
        // Unreachable provider; the endpoint still answers with the
        // deterministic circle polygon.
        let app = build_app(
            state_with(vec!["http://127.0.0.1:1".to_owned()], "http://127.0.0.1:1"),
            default_rate_limit_state(),
        );

        let response = app
            .oneshot(post_json(
                "/api/isochrone",
                serde_json::json!({ "lat": 12.97, "lng": 77.59, "distance_km": 2.0 }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let parsed = body_json(response).await;
        assert_eq!(parsed["data"]["properties"]["is_fallback"], true);
        let ring = parsed["data"]["geometry"]["coordinates"][0]
            .as_array()
            .expect("ring");
        assert_eq!(ring.len(), 37);
    }

    #[tokio::test]
    async fn validate_rejects_a_point_in_water() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "elements": [{
                    "type": "way",
                    "id": 1,
                    "center": { "lat": 12.97, "lon": 77.59 },
                    "tags": { "natural": "water", "water": "lake" }
                }]
            })))
            .mount(&server)
            .await;

        let app = build_app(
            state_with(
                vec![format!("{}/api/interpreter", server.uri())],
                "http://127.0.0.1:1",
            ),
            default_rate_limit_state(),
        );

        let response = app
            .oneshot(post_json(
                "/api/validate",
                serde_json::json!({ "lat": 12.97, "lng": 77.59 }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let parsed = body_json(response).await;
        assert_eq!(parsed["data"]["valid"], false);
        assert_eq!(parsed["data"]["is_water"], true);
        assert_eq!(parsed["data"]["water_type"], "lake");
    }

    #[tokio::test]
    async fn digipin_route_is_deterministic() {
        let app = test_app();
        let mut codes = Vec::new();
        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .uri("/api/digipin?lat=12.9716&lng=77.5946")
                        .body(Body::empty())
                        .expect("request"),
                )
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::OK);
            let parsed = body_json(response).await;
            codes.push(parsed["data"]["digipin"].as_str().expect("code").to_owned());
        }
        assert_eq!(codes[0], codes[1]);
        assert!(codes[0].starts_with("KA-"));
    }

    #[tokio::test]
    async fn rate_limit_rejects_after_window_is_full() {
        let app = build_app(
            test_state(),
            RateLimitState::new(1, Duration::from_secs(60)),
        );

        let first = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/digipin?lat=12.97&lng=77.59")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(first.status(), StatusCode::OK);

        let second = app
            .oneshot(
                Request::builder()
                    .uri("/api/digipin?lat=12.97&lng=77.59")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
