use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use hotspot_chat::{answer_question, ChatAnswer};
use hotspot_scoring::{analyze_location, CompetitorsBundle, LandmarksBundle};

use crate::middleware::RequestId;

use super::analyze::footfall_level;
use super::{ApiError, ApiResponse, AppState, ResponseMeta};

/// Proximity filters folded into the chat context landmarks.
const CHAT_CONTEXT_FILTERS: &[&str] = &[
    "near_metro",
    "near_bus",
    "near_school",
    "near_college",
    "near_hospital",
    "near_mall",
    "near_office",
];

#[derive(Debug, Deserialize, Default)]
pub(super) struct ChatContext {
    lat: Option<f64>,
    lng: Option<f64>,
    business_type: Option<String>,
    analysis_data: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatRequest {
    #[serde(default)]
    message: String,
    #[serde(default)]
    context: ChatContext,
}

/// Builds a fresh analysis payload for the prompt when the caller supplied
/// coordinates but no pre-fetched analysis.
async fn fresh_analysis(state: &AppState, lat: f64, lng: f64, business_type: &str) -> Value {
    let address = match state.latlong.reverse_geocode(lat, lng).await {
        Ok(info) => json!(info),
        Err(err) => {
            tracing::warn!(lat, lng, error = %err, "reverse geocode failed for chat context");
            json!({ "formatted_address": format!("{lat}, {lng}") })
        }
    };

    let competitor_pois = state
        .latlong
        .competitors(lat, lng, business_type)
        .await
        .unwrap_or_else(|err| {
            tracing::warn!(lat, lng, error = %err, "competitor fetch failed for chat context");
            Vec::new()
        });
    let landmark_pois = state
        .latlong
        .landmarks_by_filters(lat, lng, CHAT_CONTEXT_FILTERS)
        .await
        .unwrap_or_else(|err| {
            tracing::warn!(lat, lng, error = %err, "landmark fetch failed for chat context");
            Vec::new()
        });

    let landmarks = LandmarksBundle::from_pois(landmark_pois);
    let competitors = CompetitorsBundle::from_pois(competitor_pois);
    let result = analyze_location(
        &landmarks,
        &competitors,
        &state.weights,
        state.config.default_radius_m,
    );

    json!({
        "lat": lat,
        "lng": lng,
        "address": address,
        "business_type": business_type,
        "opportunity_score": result.opportunity_score,
        "interpretation": result.interpretation,
        "footfall_proxy": footfall_level(result.breakdown.footfall_proxy),
        "competitors": result.competitors,
        "landmarks": { "by_category": result.landmarks_summary },
    })
}

pub(super) async fn chat(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatAnswer>>, ApiError> {
    if body.message.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "message is required",
        ));
    }

    let business_type = body.context.business_type.as_deref().unwrap_or("other");
    let analysis_data = match (body.context.analysis_data, body.context.lat, body.context.lng) {
        (Some(data), _, _) => Some(data),
        (None, Some(lat), Some(lng)) => {
            Some(fresh_analysis(&state, lat, lng, business_type).await)
        }
        _ => None,
    };

    let answer = answer_question(
        state.chat.as_deref(),
        &body.message,
        analysis_data.as_ref(),
    )
    .await;

    Ok(Json(ApiResponse {
        data: answer,
        meta: ResponseMeta::new(req_id.0),
    }))
}
