use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::Value;

use hotspot_places::fallback_isochrone;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

/// Assumed travel speeds in km/h for the legacy time-based request shape.
const SPEED_KMH: &[(&str, f64)] = &[("walk", 5.0), ("bike", 15.0), ("car", 30.0)];
const DEFAULT_SPEED_KMH: f64 = 15.0;

#[derive(Debug, Deserialize)]
pub(super) struct IsochroneRequest {
    lat: Option<f64>,
    lng: Option<f64>,
    distance_km: Option<f64>,
    mode: Option<String>,
    time_minutes: Option<f64>,
}

fn resolve_distance_km(body: &IsochroneRequest) -> f64 {
    if let Some(distance_km) = body.distance_km {
        return distance_km;
    }
    let mode = body.mode.as_deref().unwrap_or("bike");
    let time_minutes = body.time_minutes.unwrap_or(15.0);
    let speed = SPEED_KMH
        .iter()
        .find(|(name, _)| *name == mode)
        .map_or(DEFAULT_SPEED_KMH, |(_, speed)| *speed);
    (speed * time_minutes) / 60.0
}

pub(super) async fn isochrone(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<IsochroneRequest>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let (Some(lat), Some(lng)) = (body.lat, body.lng) else {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "lat and lng are required",
        ));
    };

    let distance_km = resolve_distance_km(&body);
    if !(0.1..=50.0).contains(&distance_km) {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "distance_km must be between 0.1 and 50",
        ));
    }

    let feature = match state.latlong.isochrone(lat, lng, distance_km).await {
        Ok(feature) => feature,
        Err(err) => {
            tracing::warn!(lat, lng, distance_km, error = %err, "isochrone fetch failed, using circle fallback");
            fallback_isochrone(lat, lng, distance_km)
        }
    };

    Ok(Json(ApiResponse {
        data: feature,
        meta: ResponseMeta::new(req_id.0),
    }))
}
