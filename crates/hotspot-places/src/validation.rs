//! Location viability gates run before scoring.
//!
//! Two checks: the point must not sit in a water body, and it must be
//! reachable by road. Provider outages degrade to a pass so that a flaky
//! mirror never blocks an analysis; the spot search applies the opposite
//! policy through its own road probe.

use serde::Serialize;

use crate::overpass::OverpassClient;

/// Default maximum distance to the nearest road, in metres.
pub const DEFAULT_ROAD_ACCESS_M: f64 = 100.0;

/// Outcome of the pre-analysis viability checks.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// `true` when every check passed (or could not be completed).
    pub valid: bool,
    pub is_water: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_type: Option<String>,
    pub road_accessible: bool,
    pub message: String,
}

impl ValidationReport {
    fn water_failure(water_type: String) -> Self {
        let message =
            format!("Location is in {water_type}. No business can be established here.");
        Self {
            valid: false,
            is_water: true,
            water_type: Some(water_type),
            road_accessible: false,
            message,
        }
    }

    fn road_failure(max_distance_m: f64) -> Self {
        Self {
            valid: false,
            is_water: false,
            water_type: None,
            road_accessible: false,
            message: format!(
                "Location is not accessible by road. No road within {max_distance_m:.0}m."
            ),
        }
    }

    fn pass() -> Self {
        Self {
            valid: true,
            is_water: false,
            water_type: None,
            road_accessible: true,
            message: "Location is viable for business establishment".to_owned(),
        }
    }
}

/// Runs the water-body and roadway-access gates for a point.
///
/// Checks run in order and short-circuit: a point in water is rejected
/// without a road query. A check whose provider calls all fail is treated
/// as passed, with a warning logged.
pub async fn validate_location(
    overpass: &OverpassClient,
    lat: f64,
    lng: f64,
    max_road_distance_m: f64,
) -> ValidationReport {
    match overpass.water_feature_at(lat, lng).await {
        Ok(Some(water_type)) => return ValidationReport::water_failure(water_type),
        Ok(None) => {}
        Err(err) => {
            tracing::warn!(lat, lng, error = %err, "water check unavailable, treating as land");
        }
    }

    match overpass.road_within(lat, lng, max_road_distance_m).await {
        Ok(false) => return ValidationReport::road_failure(max_road_distance_m),
        Ok(true) => {}
        Err(err) => {
            tracing::warn!(lat, lng, error = %err, "road check unavailable, treating as accessible");
        }
    }

    ValidationReport::pass()
}
