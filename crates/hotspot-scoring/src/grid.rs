//! Spatial grid scoring infrastructure.
//!
//! Partitions the search radius into a uniform lat/lng lattice and scores
//! each in-circle cell from the competitors and landmarks around it. A grid
//! sweep is a cheap, deterministic stand-in for continuous spatial
//! optimization.

use crate::geo::{haversine_distance, Coordinate};
use crate::keywords::{tier_weight, GRID_FOOTFALL_DEFAULT, GRID_FOOTFALL_TIERS};
use crate::types::{GridCell, Poi};

/// Meters per degree of latitude in the local equirectangular approximation.
const METERS_PER_LAT_DEGREE: f64 = 111_000.0;

/// Competitors within this distance of a cell count against it.
const COMPETITOR_RADIUS_M: f64 = 300.0;

/// Landmarks within this distance of a cell feed its footfall score.
const LANDMARK_RADIUS_M: f64 = 500.0;

/// Score penalty per nearby competitor.
const COMPETITION_PENALTY: f64 = 15.0;

/// Isolation beyond this distance from the nearest competitor earns a bonus.
const ISOLATION_THRESHOLD_M: f64 = 200.0;

/// Cap on the isolation bonus.
const ISOLATION_BONUS_CAP: f64 = 30.0;

/// Landmark names retained per cell for display.
const MAX_LANDMARK_NAMES: usize = 5;

/// Default grid resolution for generic area scoring.
pub const DEFAULT_GRID_SIZE: usize = 10;

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Score a `grid_size x grid_size` lattice spanning `[-radius, +radius]`
/// around `center`, keeping only cells inside the inscribed circle.
///
/// Returned cells are sorted by `opportunity_score`, highest first.
#[must_use]
pub fn grid_scores(
    center: Coordinate,
    radius_m: f64,
    competitors: &[Poi],
    landmarks: &[Poi],
    grid_size: usize,
) -> Vec<GridCell> {
    let lat_offset_per_m = 1.0 / METERS_PER_LAT_DEGREE;
    let lng_offset_per_m = 1.0 / (METERS_PER_LAT_DEGREE * center.lat.to_radians().cos());

    let cell_size_m = (2.0 * radius_m) / grid_size as f64;
    let half = grid_size as f64 / 2.0;

    let mut cells = Vec::new();

    for row in 0..grid_size {
        for col in 0..grid_size {
            let cell = Coordinate {
                lat: center.lat + (row as f64 - half + 0.5) * cell_size_m * lat_offset_per_m,
                lng: center.lng + (col as f64 - half + 0.5) * cell_size_m * lng_offset_per_m,
            };

            // Keep the inscribed circle, not the bounding square.
            if haversine_distance(center, cell) > radius_m {
                continue;
            }

            let mut nearby_competitors = 0;
            let mut min_competitor_dist = f64::INFINITY;
            for competitor in competitors {
                let dist = haversine_distance(cell, Coordinate::new(competitor.lat, competitor.lng));
                if dist < COMPETITOR_RADIUS_M {
                    nearby_competitors += 1;
                }
                if dist < min_competitor_dist {
                    min_competitor_dist = dist;
                }
            }

            let mut nearby_landmark_names = Vec::new();
            let mut footfall_score = 0.0;
            for landmark in landmarks {
                let dist = haversine_distance(cell, Coordinate::new(landmark.lat, landmark.lng));
                if dist < LANDMARK_RADIUS_M {
                    nearby_landmark_names.push(landmark.name.clone());
                    // Linear falloff to 0 at the landmark radius.
                    let proximity_bonus = ((LANDMARK_RADIUS_M - dist) / LANDMARK_RADIUS_M).max(0.0);
                    let name = landmark.name.to_lowercase();
                    let category = landmark.category.to_lowercase();
                    let weight = tier_weight(
                        &[&name, &category],
                        GRID_FOOTFALL_TIERS,
                        GRID_FOOTFALL_DEFAULT,
                    );
                    footfall_score += weight * proximity_bonus;
                }
            }

            let competition_penalty = nearby_competitors as f64 * COMPETITION_PENALTY;

            let distance_bonus = if min_competitor_dist > ISOLATION_THRESHOLD_M {
                ((min_competitor_dist - ISOLATION_THRESHOLD_M) / 10.0).min(ISOLATION_BONUS_CAP)
            } else {
                0.0
            };

            let opportunity = (footfall_score + distance_bonus - competition_penalty).max(0.0);

            let nearby_landmarks = nearby_landmark_names.len();
            nearby_landmark_names.truncate(MAX_LANDMARK_NAMES);

            cells.push(GridCell {
                lat: cell.lat,
                lng: cell.lng,
                opportunity_score: round_to(opportunity, 1),
                nearby_competitors,
                min_competitor_distance: min_competitor_dist
                    .is_finite()
                    .then(|| min_competitor_dist.round()),
                nearby_landmarks,
                footfall_score: round_to(footfall_score, 1),
                landmark_names: nearby_landmark_names,
            });
        }
    }

    cells.sort_by(|a, b| {
        b.opportunity_score
            .partial_cmp(&a.opportunity_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: Coordinate = Coordinate {
        lat: 12.9716,
        lng: 77.5946,
    };

    fn poi(name: &str, lat: f64, lng: f64) -> Poi {
        Poi {
            name: name.to_string(),
            lat,
            lng,
            category: String::new(),
        }
    }

    #[test]
    fn all_cells_lie_inside_the_radius() {
        let cells = grid_scores(CENTER, 1000.0, &[], &[], 12);
        assert!(!cells.is_empty());
        for cell in &cells {
            let dist = haversine_distance(CENTER, Coordinate::new(cell.lat, cell.lng));
            assert!(dist <= 1000.0 + 1e-6, "cell at {dist}m");
        }
        // The inscribed circle drops the corners of the 12x12 square.
        assert!(cells.len() < 144);
    }

    #[test]
    fn no_competitors_earns_full_isolation_bonus() {
        let cells = grid_scores(CENTER, 1000.0, &[], &[], 10);
        for cell in &cells {
            // No competition anywhere: each cell gets the capped bonus.
            assert_eq!(cell.opportunity_score, 30.0);
            assert_eq!(cell.nearby_competitors, 0);
            assert!(cell.min_competitor_distance.is_none());
            assert_eq!(cell.nearby_landmarks, 0);
        }
    }

    #[test]
    fn cells_sorted_descending_by_score() {
        let landmarks = vec![poi("MG Road Metro", 12.9750, 77.5960)];
        let cells = grid_scores(CENTER, 1000.0, &[], &landmarks, 12);
        for pair in cells.windows(2) {
            assert!(pair[0].opportunity_score >= pair[1].opportunity_score);
        }
        assert!(cells[0].opportunity_score > 0.0);
    }

    #[test]
    fn nearby_competitor_penalizes_and_tracks_min_distance() {
        let competitors = vec![poi("Rival Cafe", CENTER.lat, CENTER.lng)];
        let cells = grid_scores(CENTER, 1000.0, &competitors, &[], 12);
        let near_center = cells
            .iter()
            .min_by(|a, b| {
                let da = haversine_distance(CENTER, Coordinate::new(a.lat, a.lng));
                let db = haversine_distance(CENTER, Coordinate::new(b.lat, b.lng));
                da.partial_cmp(&db).unwrap()
            })
            .unwrap();
        assert_eq!(near_center.nearby_competitors, 1);
        assert!(near_center.min_competitor_distance.unwrap() < 300.0);
        assert_eq!(near_center.opportunity_score, 0.0);
    }

    #[test]
    fn isolation_bonus_caps_at_thirty() {
        // One remote competitor: every cell is far beyond the threshold.
        let competitors = vec![poi("Distant Rival", 13.5, 78.0)];
        let cells = grid_scores(CENTER, 1000.0, &competitors, &[], 10);
        for cell in &cells {
            assert!(cell.opportunity_score <= 30.0);
            assert!(cell.opportunity_score > 0.0);
        }
    }

    #[test]
    fn landmark_names_capped_at_five() {
        let landmarks: Vec<Poi> = (0..9)
            .map(|i| poi(&format!("Spot {i}"), CENTER.lat, CENTER.lng))
            .collect();
        let cells = grid_scores(CENTER, 1000.0, &[], &landmarks, 12);
        let near_center = cells
            .iter()
            .find(|c| c.nearby_landmarks == 9)
            .expect("some cell should see all nine landmarks");
        assert_eq!(near_center.landmark_names.len(), 5);
    }

    #[test]
    fn metro_landmark_outscores_generic_landmark() {
        let metro = grid_scores(
            CENTER,
            1000.0,
            &[],
            &[poi("Indiranagar Metro Station", CENTER.lat, CENTER.lng)],
            10,
        );
        let generic = grid_scores(
            CENTER,
            1000.0,
            &[],
            &[poi("Plain Corner", CENTER.lat, CENTER.lng)],
            10,
        );
        assert!(metro[0].footfall_score > generic[0].footfall_score);
    }
}
