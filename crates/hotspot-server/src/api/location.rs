use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use hotspot_places::{generate_digipin, AddressInfo, Digipin, GeocodeResult, Suggestion};
use hotspot_scoring::Poi;

use crate::middleware::RequestId;

use super::{map_places_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct AutocompleteQuery {
    #[serde(default)]
    query: String,
    limit: Option<usize>,
    lat: Option<f64>,
    lng: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(super) struct AutocompleteData {
    suggestions: Vec<Suggestion>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GeocodeQuery {
    #[serde(default)]
    address: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct PointQuery {
    lat: Option<f64>,
    lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PoiQuery {
    lat: Option<f64>,
    lng: Option<f64>,
    #[serde(default)]
    category: String,
}

#[derive(Debug, Serialize)]
pub(super) struct PoiData {
    category: String,
    count: usize,
    pois: Vec<Poi>,
}

fn require_point(req_id: &str, lat: Option<f64>, lng: Option<f64>) -> Result<(f64, f64), ApiError> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => Ok((lat, lng)),
        _ => Err(ApiError::new(
            req_id,
            "validation_error",
            "lat and lng parameters are required",
        )),
    }
}

pub(super) async fn autocomplete(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<AutocompleteQuery>,
) -> Result<Json<ApiResponse<AutocompleteData>>, ApiError> {
    let bias = match (query.lat, query.lng) {
        (Some(lat), Some(lng)) => Some((lat, lng)),
        _ => None,
    };

    let suggestions = state
        .latlong
        .autocomplete(&query.query, bias, query.limit.unwrap_or(10))
        .await
        .map_err(|e| map_places_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: AutocompleteData { suggestions },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn geocode(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<GeocodeQuery>,
) -> Result<Json<ApiResponse<GeocodeResult>>, ApiError> {
    if query.address.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "address parameter is required",
        ));
    }

    let result = state.latlong.geocode(&query.address).await.map_err(|e| {
        tracing::warn!(address = %query.address, error = %e, "geocode failed");
        ApiError::new(req_id.0.clone(), "not_found", "could not geocode address")
    })?;

    Ok(Json(ApiResponse {
        data: result,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn reverse_geocode(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PointQuery>,
) -> Result<Json<ApiResponse<AddressInfo>>, ApiError> {
    let (lat, lng) = require_point(&req_id.0, query.lat, query.lng)?;

    let info = state
        .latlong
        .reverse_geocode(lat, lng)
        .await
        .map_err(|e| map_places_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: info,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn digipin(
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PointQuery>,
) -> Result<Json<ApiResponse<Digipin>>, ApiError> {
    let (lat, lng) = require_point(&req_id.0, query.lat, query.lng)?;

    Ok(Json(ApiResponse {
        data: generate_digipin(lat, lng),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn points_of_interest(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PoiQuery>,
) -> Result<Json<ApiResponse<PoiData>>, ApiError> {
    let (lat, lng) = require_point(&req_id.0, query.lat, query.lng)?;
    if query.category.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "category is required",
        ));
    }

    let pois = state
        .latlong
        .points_of_interest(lat, lng, &query.category)
        .await
        .map_err(|e| map_places_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: PoiData {
            category: query.category,
            count: pois.len(),
            pois,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
