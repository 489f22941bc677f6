use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use hotspot_places::{validate_location, validation::DEFAULT_ROAD_ACCESS_M, ValidationReport};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ValidateRequest {
    lat: Option<f64>,
    lng: Option<f64>,
    max_road_distance_m: Option<f64>,
}

pub(super) async fn validate(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ValidateRequest>,
) -> Result<Json<ApiResponse<ValidationReport>>, ApiError> {
    let (Some(lat), Some(lng)) = (body.lat, body.lng) else {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "lat and lng are required",
        ));
    };

    let max_road_distance_m = body.max_road_distance_m.unwrap_or(DEFAULT_ROAD_ACCESS_M);
    let report = validate_location(&state.overpass, lat, lng, max_road_distance_m).await;

    Ok(Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    }))
}
