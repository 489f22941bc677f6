//! Recommended-spot selection: greedy pass over pre-sorted grid cells with a
//! spacing constraint and a budgeted external road-proximity filter.

use async_trait::async_trait;

use crate::geo::{haversine_distance, Coordinate};
use crate::grid::grid_scores;
use crate::types::{GridCell, Poi, Rating, RecommendedSpot};

/// External capability answering "does this point have road access within
/// `max_distance_m`?".
///
/// Implementations must be conservative: any transport failure (timeout,
/// non-200, malformed payload) maps to `false`, never an error. An
/// unreachable road service degrades to zero recommended spots.
#[async_trait]
pub trait RoadProbe {
    async fn is_near_road(&self, lat: f64, lng: f64, max_distance_m: f64) -> bool;
}

/// Selection parameters. The road-check budget is the backpressure mechanism
/// against a rate-limited, per-call-costly upstream: exhausting it ends the
/// search early with fewer spots, which is a normal outcome, not an error.
#[derive(Debug, Clone)]
pub struct SpotParams {
    pub max_spots: usize,
    pub min_spacing_m: f64,
    pub road_proximity_m: f64,
    pub max_road_checks: usize,
    pub grid_size: usize,
}

impl Default for SpotParams {
    fn default() -> Self {
        Self {
            max_spots: 5,
            min_spacing_m: 300.0,
            road_proximity_m: 300.0,
            max_road_checks: 50,
            // Higher resolution than the generic grid for spot-finding.
            grid_size: 12,
        }
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

fn build_reasons(cell: &GridCell) -> Vec<String> {
    let mut reasons = Vec::new();

    match cell.min_competitor_distance {
        Some(dist) if dist > 300.0 => {
            reasons.push(format!(
                "Low competition - nearest competitor {dist:.0}m away"
            ));
        }
        _ if cell.nearby_competitors == 0 => {
            reasons.push("No direct competitors in this zone".to_string());
        }
        _ if cell.nearby_competitors <= 2 => {
            reasons.push(format!(
                "Low competition density ({} nearby)",
                cell.nearby_competitors
            ));
        }
        _ => {}
    }

    if cell.footfall_score >= 30.0 {
        reasons.push("High footfall area".to_string());
    } else if cell.footfall_score >= 15.0 {
        reasons.push("Good footfall potential".to_string());
    }

    if cell.nearby_landmarks >= 3 {
        reasons.push(format!(
            "Near key landmarks ({} within 500m)",
            cell.nearby_landmarks
        ));
    }

    if !cell.landmark_names.is_empty() {
        let top: Vec<&str> = cell
            .landmark_names
            .iter()
            .take(3)
            .map(String::as_str)
            .collect();
        reasons.push(format!("Near: {}", top.join(", ")));
    }

    reasons.push("Good road accessibility".to_string());

    if reasons.is_empty() {
        reasons.push("Balanced location with growth potential".to_string());
    }

    reasons
}

/// Find the best spots for a new business inside the search radius.
///
/// Grid cells are visited in descending score order; a candidate is rejected
/// when it sits within `min_spacing_m` of an already-accepted spot or when
/// the road probe denies it. Checks run sequentially in score order, so for
/// a fixed probe the result is deterministic. Returns at most
/// `params.max_spots` spots ranked `1..=N`.
pub async fn find_recommended_spots<P: RoadProbe + Sync>(
    center: Coordinate,
    radius_m: f64,
    competitors: &[Poi],
    landmarks: &[Poi],
    params: &SpotParams,
    probe: &P,
) -> Vec<RecommendedSpot> {
    let cells = grid_scores(center, radius_m, competitors, landmarks, params.grid_size);
    select_spots(&cells, params, probe).await
}

/// Selection pass over already-scored cells, separated from the grid sweep so
/// tests can feed synthetic cells.
pub async fn select_spots<P: RoadProbe + Sync>(
    cells: &[GridCell],
    params: &SpotParams,
    probe: &P,
) -> Vec<RecommendedSpot> {
    let mut recommended: Vec<RecommendedSpot> = Vec::new();
    let mut road_checks = 0usize;
    let mut skipped_no_road = 0usize;

    for cell in cells {
        if recommended.len() >= params.max_spots {
            break;
        }
        if road_checks >= params.max_road_checks {
            tracing::warn!(
                checked = road_checks,
                skipped_no_road,
                "road-check budget exhausted, returning {} spot(s)",
                recommended.len()
            );
            break;
        }

        let cell_point = Coordinate::new(cell.lat, cell.lng);
        let too_close = recommended.iter().any(|spot| {
            haversine_distance(cell_point, Coordinate::new(spot.lat, spot.lng))
                < params.min_spacing_m
        });
        if too_close {
            continue;
        }

        let near_road = probe
            .is_near_road(cell.lat, cell.lng, params.road_proximity_m)
            .await;
        road_checks += 1;

        if !near_road {
            skipped_no_road += 1;
            tracing::debug!(
                lat = cell.lat,
                lng = cell.lng,
                "skipped candidate, no road within {}m",
                params.road_proximity_m
            );
            continue;
        }

        let rating = Rating::from_score(cell.opportunity_score);
        recommended.push(RecommendedSpot {
            lat: round_to(cell.lat, 6),
            lng: round_to(cell.lng, 6),
            score: cell.opportunity_score,
            rating,
            rating_color: rating.color(),
            reasons: build_reasons(cell),
            nearby_competitors: cell.nearby_competitors,
            nearby_landmarks: cell.nearby_landmarks,
            min_competitor_distance: cell.min_competitor_distance,
            rank: 0,
        });
    }

    for (i, spot) in recommended.iter_mut().enumerate() {
        spot.rank = i + 1;
    }

    recommended
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysNear;

    #[async_trait]
    impl RoadProbe for AlwaysNear {
        async fn is_near_road(&self, _lat: f64, _lng: f64, _max_distance_m: f64) -> bool {
            true
        }
    }

    struct NeverNear;

    #[async_trait]
    impl RoadProbe for NeverNear {
        async fn is_near_road(&self, _lat: f64, _lng: f64, _max_distance_m: f64) -> bool {
            false
        }
    }

    /// Counts probe invocations to verify the budget.
    struct CountingProbe {
        calls: std::sync::atomic::AtomicUsize,
        answer: bool,
    }

    impl CountingProbe {
        fn new(answer: bool) -> Self {
            Self {
                calls: std::sync::atomic::AtomicUsize::new(0),
                answer,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(std::sync::atomic::Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RoadProbe for CountingProbe {
        async fn is_near_road(&self, _lat: f64, _lng: f64, _max_distance_m: f64) -> bool {
            self.calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.answer
        }
    }

    const CENTER: Coordinate = Coordinate {
        lat: 12.9716,
        lng: 77.5946,
    };

    fn landmark(name: &str, lat: f64, lng: f64) -> Poi {
        Poi {
            name: name.to_string(),
            lat,
            lng,
            category: String::new(),
        }
    }

    #[tokio::test]
    async fn returns_at_most_max_spots_with_contiguous_ranks() {
        let landmarks = vec![landmark("MG Road Metro", 12.9750, 77.5960)];
        let spots = find_recommended_spots(
            CENTER,
            1000.0,
            &[],
            &landmarks,
            &SpotParams::default(),
            &AlwaysNear,
        )
        .await;

        assert!(!spots.is_empty());
        assert!(spots.len() <= 5);
        for (i, spot) in spots.iter().enumerate() {
            assert_eq!(spot.rank, i + 1);
            assert!(!spot.reasons.is_empty());
        }
    }

    #[tokio::test]
    async fn accepted_spots_respect_min_spacing() {
        let spots = find_recommended_spots(
            CENTER,
            1000.0,
            &[],
            &[],
            &SpotParams::default(),
            &AlwaysNear,
        )
        .await;

        for (i, a) in spots.iter().enumerate() {
            for b in &spots[i + 1..] {
                let dist = haversine_distance(
                    Coordinate::new(a.lat, a.lng),
                    Coordinate::new(b.lat, b.lng),
                );
                // Half-meter tolerance for the 6-decimal coordinate rounding.
                assert!(dist >= 299.5, "spots only {dist}m apart");
            }
        }
    }

    #[tokio::test]
    async fn all_roadless_yields_empty_result() {
        let spots = find_recommended_spots(
            CENTER,
            1000.0,
            &[],
            &[],
            &SpotParams::default(),
            &NeverNear,
        )
        .await;
        assert!(spots.is_empty());
    }

    #[tokio::test]
    async fn road_check_budget_bounds_probe_calls() {
        let probe = CountingProbe::new(false);
        let params = SpotParams {
            max_road_checks: 7,
            ..SpotParams::default()
        };
        let spots = find_recommended_spots(CENTER, 1000.0, &[], &[], &params, &probe).await;
        assert!(spots.is_empty());
        assert_eq!(probe.calls(), 7);
    }

    #[tokio::test]
    async fn selection_is_deterministic_for_fixed_probe() {
        let landmarks = vec![
            landmark("Forum Mall", 12.9740, 77.5930),
            landmark("City Hospital", 12.9690, 77.5970),
        ];
        let first = find_recommended_spots(
            CENTER,
            1000.0,
            &[],
            &landmarks,
            &SpotParams::default(),
            &AlwaysNear,
        )
        .await;
        let second = find_recommended_spots(
            CENTER,
            1000.0,
            &[],
            &landmarks,
            &SpotParams::default(),
            &AlwaysNear,
        )
        .await;

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!((a.lat, a.lng, a.rank), (b.lat, b.lng, b.rank));
            assert_eq!(a.score, b.score);
        }
    }

    #[tokio::test]
    async fn spots_arrive_in_descending_score_order() {
        let landmarks = vec![landmark("Central Metro Station", 12.9720, 77.5950)];
        let spots = find_recommended_spots(
            CENTER,
            1500.0,
            &[],
            &landmarks,
            &SpotParams::default(),
            &AlwaysNear,
        )
        .await;
        for pair in spots.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    fn scored_cell(lat: f64, lng: f64, score: f64) -> GridCell {
        GridCell {
            lat,
            lng,
            opportunity_score: score,
            nearby_competitors: 0,
            min_competitor_distance: None,
            nearby_landmarks: 0,
            footfall_score: 0.0,
            landmark_names: Vec::new(),
        }
    }

    #[tokio::test]
    async fn spacing_rejection_happens_before_the_road_probe() {
        let probe = CountingProbe::new(true);
        // Second cell sits ~110m north of the first, inside the 300m spacing.
        let cells = vec![
            scored_cell(12.9716, 77.5946, 80.0),
            scored_cell(12.9726, 77.5946, 70.0),
            scored_cell(12.9816, 77.5946, 60.0),
        ];
        let spots = select_spots(&cells, &SpotParams::default(), &probe).await;

        assert_eq!(spots.len(), 2);
        assert_eq!((spots[0].rank, spots[1].rank), (1, 2));
        assert!((spots[1].lat - 12.9816).abs() < 1e-6);
        // The crowded cell never reaches the probe, so only two checks spend
        // budget.
        assert_eq!(probe.calls(), 2);
    }

    #[test]
    fn reasons_mention_isolation_when_competitors_are_far() {
        let cell = GridCell {
            lat: 12.97,
            lng: 77.59,
            opportunity_score: 42.0,
            nearby_competitors: 0,
            min_competitor_distance: Some(612.0),
            nearby_landmarks: 1,
            footfall_score: 12.0,
            landmark_names: vec!["Forum Mall".to_string()],
        };
        let reasons = build_reasons(&cell);
        assert_eq!(
            reasons[0],
            "Low competition - nearest competitor 612m away"
        );
        assert!(reasons.contains(&"Near: Forum Mall".to_string()));
        assert_eq!(reasons.last().unwrap(), "Good road accessibility");
    }

    #[test]
    fn reasons_for_moderate_competition_and_footfall() {
        let cell = GridCell {
            lat: 12.97,
            lng: 77.59,
            opportunity_score: 20.0,
            nearby_competitors: 2,
            min_competitor_distance: Some(150.0),
            nearby_landmarks: 4,
            footfall_score: 31.0,
            landmark_names: vec![
                "A".to_string(),
                "B".to_string(),
                "C".to_string(),
                "D".to_string(),
            ],
        };
        let reasons = build_reasons(&cell);
        assert!(reasons.contains(&"Low competition density (2 nearby)".to_string()));
        assert!(reasons.contains(&"High footfall area".to_string()));
        assert!(reasons.contains(&"Near key landmarks (4 within 500m)".to_string()));
        // Only the top three names are listed.
        assert!(reasons.contains(&"Near: A, B, C".to_string()));
    }
}
