use std::collections::BTreeMap;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use hotspot_core::categories::detect_landmark_category;
use hotspot_places::{generate_digipin, parse_landmarks_from_text, AddressInfo};
use hotspot_scoring::{
    analyze_location, find_recommended_spots, haversine_distance, Breakdown, CompetitorsBundle,
    Coordinate, Interpretation, LandmarksBundle, Poi, RecommendedSpot, SpotParams,
};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

/// Business types without an OSM tag mapping query Overpass under their own
/// name through the generic amenity fallback.
const OSM_CATEGORY_MAP: &[(&str, &str)] = &[
    ("cafe", "cafe"),
    ("restaurant", "restaurant"),
    ("gym", "gym"),
    ("pharmacy", "pharmacy"),
    ("salon", "salon"),
    ("retail", "retail"),
    ("grocery", "supermarket"),
];

fn osm_category(business_type: &str) -> &str {
    OSM_CATEGORY_MAP
        .iter()
        .find(|(bt, _)| *bt == business_type)
        .map_or(business_type, |(_, category)| category)
}

fn default_business_type() -> String {
    "other".to_owned()
}

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    lat: Option<f64>,
    lng: Option<f64>,
    #[serde(default = "default_business_type")]
    business_type: String,
    #[serde(default)]
    filters: Vec<String>,
    #[serde(default)]
    is_major: bool,
    radius: Option<f64>,
    #[serde(default)]
    include_spots: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct RecommendedSpotsRequest {
    lat: Option<f64>,
    lng: Option<f64>,
    #[serde(default = "default_business_type")]
    business_type: String,
    radius: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(super) struct LocationInfo {
    lat: f64,
    lng: f64,
    address: AddressInfo,
    digipin: String,
}

#[derive(Debug, Serialize)]
pub(super) struct CompetitorItem {
    name: String,
    category: String,
    lat: f64,
    lng: f64,
    distance: u32,
    is_competitor: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct LandmarkItem {
    name: String,
    category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lng: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    distance: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_competitor: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(super) struct CompetitorsOut {
    count: usize,
    nearby: Vec<CompetitorItem>,
}

#[derive(Debug, Serialize)]
pub(super) struct LandmarksOut {
    total: usize,
    by_category: BTreeMap<String, usize>,
    list: Vec<LandmarkItem>,
}

#[derive(Debug, Serialize)]
pub(super) struct AnalyzeData {
    location: LocationInfo,
    business_type: String,
    filters_applied: Vec<String>,
    opportunity_score: u32,
    interpretation: Interpretation,
    breakdown: Breakdown,
    competitors: CompetitorsOut,
    landmarks: LandmarksOut,
    footfall_proxy: &'static str,
    recommendation: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    recommended_spots: Option<Vec<RecommendedSpot>>,
}

#[derive(Debug, Serialize)]
pub(super) struct SpotsData {
    center: Center,
    radius_m: f64,
    business_type: String,
    count: usize,
    spots: Vec<RecommendedSpot>,
}

#[derive(Debug, Serialize)]
pub(super) struct Center {
    lat: f64,
    lng: f64,
}

/// Everything `POST /api/analyze` assembles before scoring. Each provider
/// call degrades independently, so a flaky upstream thins the data instead
/// of failing the request.
struct AssembledInputs {
    address: AddressInfo,
    landmark_items: Vec<LandmarkItem>,
    landmark_pois: Vec<Poi>,
    competitor_items: Vec<CompetitorItem>,
    competitor_pois: Vec<Poi>,
}

pub(super) fn footfall_level(footfall_proxy: f64) -> &'static str {
    if footfall_proxy > 60.0 {
        "high"
    } else if footfall_proxy > 30.0 {
        "medium"
    } else {
        "low"
    }
}

async fn assemble_inputs(
    state: &AppState,
    lat: f64,
    lng: f64,
    business_type: &str,
    radius_m: f64,
) -> AssembledInputs {
    let address = match state.latlong.reverse_geocode(lat, lng).await {
        Ok(info) => info,
        Err(err) => {
            tracing::warn!(lat, lng, error = %err, "reverse geocode failed, using coordinate address");
            AddressInfo {
                formatted_address: format!("{lat}, {lng}"),
                area_name: format!("{lat:.4}, {lng:.4}"),
                pincode: String::new(),
                landmark: String::new(),
            }
        }
    };

    // Landmark mentions parsed out of the reverse-geocode text carry a
    // distance but no coordinates; the landmarks API is the reverse. Merge
    // both, deduplicated case-insensitively by name, re-detecting the
    // category from the name so the two sources agree.
    let parsed = parse_landmarks_from_text(&address.landmark, business_type);

    let api_landmarks = match state.latlong.landmarks(lat, lng).await {
        Ok(pois) => pois,
        Err(err) => {
            tracing::warn!(lat, lng, error = %err, "landmarks fetch failed, continuing without");
            Vec::new()
        }
    };

    let mut seen_names: Vec<String> = Vec::new();
    let mut landmark_items = Vec::new();
    let mut landmark_pois = Vec::new();

    for lm in parsed {
        let key = lm.name.to_lowercase();
        if seen_names.contains(&key) {
            continue;
        }
        seen_names.push(key);
        let category = detect_landmark_category(&lm.name);
        landmark_items.push(LandmarkItem {
            name: lm.name.clone(),
            category: category.to_owned(),
            lat: None,
            lng: None,
            distance: Some(lm.distance_m),
            is_competitor: Some(lm.is_competitor),
        });
        // Parsed mentions have no coordinates; pin them to the query point
        // so the scorers can still count them.
        landmark_pois.push(Poi {
            name: lm.name,
            lat,
            lng,
            category: category.to_owned(),
        });
    }

    for poi in api_landmarks {
        let key = poi.name.to_lowercase();
        if seen_names.contains(&key) {
            continue;
        }
        seen_names.push(key);
        let category = detect_landmark_category(&poi.name);
        landmark_items.push(LandmarkItem {
            name: poi.name.clone(),
            category: category.to_owned(),
            lat: Some(poi.lat),
            lng: Some(poi.lng),
            distance: None,
            is_competitor: None,
        });
        landmark_pois.push(Poi {
            category: category.to_owned(),
            ..poi
        });
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let radius = radius_m.max(0.0).round() as u32;
    let osm = match state
        .overpass
        .fetch_competitors(lat, lng, radius, osm_category(business_type))
        .await
    {
        Ok(pois) => pois,
        Err(err) => {
            tracing::warn!(lat, lng, error = %err, "competitor fetch failed, continuing without");
            Vec::new()
        }
    };

    let center = Coordinate::new(lat, lng);
    let mut competitor_items: Vec<CompetitorItem> = osm
        .iter()
        .map(|comp| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let distance =
                haversine_distance(center, Coordinate::new(comp.lat, comp.lng)).round() as u32;
            CompetitorItem {
                name: comp.name.clone(),
                category: business_type.to_owned(),
                lat: comp.lat,
                lng: comp.lng,
                distance,
                is_competitor: true,
            }
        })
        .collect();
    competitor_items.sort_by_key(|item| item.distance);

    AssembledInputs {
        address,
        landmark_items,
        landmark_pois,
        competitor_items,
        competitor_pois: osm,
    }
}

pub(super) async fn analyze(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<AnalyzeData>>, ApiError> {
    let (Some(lat), Some(lng)) = (body.lat, body.lng) else {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "lat and lng are required",
        ));
    };
    if body.business_type.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "business_type is required",
        ));
    }

    // Major commercial areas get a wider default search radius.
    let default_radius = if body.is_major { 2500.0 } else { 1000.0 };
    let radius_m = body.radius.unwrap_or(default_radius);

    let inputs = assemble_inputs(&state, lat, lng, &body.business_type, radius_m).await;
    let digipin = generate_digipin(lat, lng);

    let landmarks = LandmarksBundle::from_pois(inputs.landmark_pois.clone());
    let competitors = CompetitorsBundle::from_pois(inputs.competitor_pois.clone());
    let result = analyze_location(&landmarks, &competitors, &state.weights, radius_m);

    let recommended_spots = if body.include_spots {
        Some(
            find_recommended_spots(
                Coordinate::new(lat, lng),
                radius_m,
                &inputs.competitor_pois,
                &inputs.landmark_pois,
                &SpotParams::default(),
                &*state.overpass,
            )
            .await,
        )
    } else {
        None
    };

    let total_landmarks = inputs.landmark_items.len();
    let data = AnalyzeData {
        location: LocationInfo {
            lat,
            lng,
            address: inputs.address,
            digipin: digipin.digipin,
        },
        business_type: body.business_type,
        filters_applied: body.filters,
        opportunity_score: result.opportunity_score,
        interpretation: result.interpretation,
        footfall_proxy: footfall_level(result.breakdown.footfall_proxy),
        recommendation: result.interpretation.recommendation,
        breakdown: result.breakdown,
        competitors: CompetitorsOut {
            count: inputs.competitor_items.len(),
            nearby: inputs.competitor_items.into_iter().take(20).collect(),
        },
        landmarks: LandmarksOut {
            total: total_landmarks,
            by_category: BTreeMap::from([("nearby".to_owned(), total_landmarks)]),
            list: inputs.landmark_items,
        },
        recommended_spots,
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn recommended_spots(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<RecommendedSpotsRequest>,
) -> Result<Json<ApiResponse<SpotsData>>, ApiError> {
    let (Some(lat), Some(lng)) = (body.lat, body.lng) else {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "lat and lng are required",
        ));
    };

    let radius_m = body.radius.unwrap_or(state.config.default_radius_m);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let radius = radius_m.max(0.0).round() as u32;

    let competitors = match state
        .overpass
        .fetch_competitors(lat, lng, radius, osm_category(&body.business_type))
        .await
    {
        Ok(pois) => pois,
        Err(err) => {
            tracing::warn!(lat, lng, error = %err, "competitor fetch failed, searching without");
            Vec::new()
        }
    };
    let landmarks = match state.overpass.fetch_landmarks(lat, lng, radius).await {
        Ok(pois) => pois,
        Err(err) => {
            tracing::warn!(lat, lng, error = %err, "landmark fetch failed, searching without");
            Vec::new()
        }
    };

    let spots = find_recommended_spots(
        Coordinate::new(lat, lng),
        radius_m,
        &competitors,
        &landmarks,
        &SpotParams::default(),
        &*state.overpass,
    )
    .await;

    let data = SpotsData {
        center: Center { lat, lng },
        radius_m,
        business_type: body.business_type,
        count: spots.len(),
        spots,
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn osm_category_maps_grocery_to_supermarket() {
        assert_eq!(osm_category("grocery"), "supermarket");
        assert_eq!(osm_category("cafe"), "cafe");
        assert_eq!(osm_category("bookstore"), "bookstore");
    }

    #[test]
    fn footfall_level_bands() {
        assert_eq!(footfall_level(75.0), "high");
        assert_eq!(footfall_level(60.0), "medium");
        assert_eq!(footfall_level(45.0), "medium");
        assert_eq!(footfall_level(30.0), "low");
        assert_eq!(footfall_level(0.0), "low");
    }
}
