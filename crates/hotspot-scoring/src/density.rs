//! Competitor density: rivals per square kilometer of the search circle.

use std::f64::consts::PI;

use crate::types::CompetitorsBundle;

/// Area floor in km² preventing division blow-up for degenerate radii.
const MIN_AREA_SQ_KM: f64 = 0.1;

/// Competitor density in competitors per km², always `>= 0`.
#[must_use]
pub fn competitor_density(competitors: &CompetitorsBundle, radius_m: f64) -> f64 {
    let area_sq_km = PI * (radius_m / 1000.0).powi(2);
    competitors.count as f64 / area_sq_km.max(MIN_AREA_SQ_KM)
}
